//! Gameplay commands. Each names the entity it acts on, so a command whose
//! target vanished earlier in the drain is skipped by the world.

use delve_component::EntityId;
use delve_world::{Command, CommandKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attack {
    pub attacker: EntityId,
    pub defender: EntityId,
}

impl Command for Attack {
    const KIND: CommandKind = CommandKind::new("attack");

    fn target(&self) -> Option<EntityId> {
        Some(self.defender)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickUp {
    pub actor: EntityId,
    pub item: EntityId,
}

impl Command for PickUp {
    const KIND: CommandKind = CommandKind::new("pick_up");

    fn target(&self) -> Option<EntityId> {
        Some(self.item)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropItem {
    pub actor: EntityId,
    pub item: EntityId,
}

impl Command for DropItem {
    const KIND: CommandKind = CommandKind::new("drop");

    fn target(&self) -> Option<EntityId> {
        Some(self.actor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Equip {
    pub actor: EntityId,
    pub item: EntityId,
}

impl Command for Equip {
    const KIND: CommandKind = CommandKind::new("equip");

    fn target(&self) -> Option<EntityId> {
        Some(self.item)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UseItem {
    pub actor: EntityId,
    pub item: EntityId,
}

impl Command for UseItem {
    const KIND: CommandKind = CommandKind::new("use_item");

    fn target(&self) -> Option<EntityId> {
        Some(self.item)
    }
}
