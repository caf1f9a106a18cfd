//! Gameplay events. Published by the game systems, delivered after the
//! scheduler pass.

use delve_component::EntityId;
use delve_world::{Event, EventKind};
use serde::Serialize;

use crate::components::{Direction, Position};

/// An entity stepped from one cell to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntityMoved {
    pub entity: EntityId,
    pub from: Position,
    pub to: Position,
}

impl Event for EntityMoved {
    const KIND: EventKind = EventKind::new("entity_moved");
}

/// An entity tried to step through a wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoveBlocked {
    pub entity: EntityId,
    pub at: Position,
    pub direction: Direction,
}

impl Event for MoveBlocked {
    const KIND: EventKind = EventKind::new("move_blocked");
}

/// A mover ended up in the same cell as another entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntitiesCollided {
    pub mover: EntityId,
    pub occupant: EntityId,
    pub at: Position,
}

impl Event for EntitiesCollided {
    const KIND: EventKind = EventKind::new("entities_collided");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CombatDamage {
    pub attacker: EntityId,
    pub defender: EntityId,
    pub amount: i32,
    /// Defender health after the hit.
    pub remaining: i32,
}

impl Event for CombatDamage {
    const KIND: EventKind = EventKind::new("combat_damage");
}

/// A defender's health reached zero. The entity is removed by a queued
/// command, so `name` carries what it was called.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombatDeath {
    pub entity: EntityId,
    pub killer: EntityId,
    pub name: String,
}

impl Event for CombatDeath {
    const KIND: EventKind = EventKind::new("combat_death");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ItemPickedUp {
    pub actor: EntityId,
    pub item: EntityId,
}

impl Event for ItemPickedUp {
    const KIND: EventKind = EventKind::new("item_picked_up");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ItemDropped {
    pub actor: EntityId,
    pub item: EntityId,
    pub at: Position,
}

impl Event for ItemDropped {
    const KIND: EventKind = EventKind::new("item_dropped");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ItemEquipped {
    pub actor: EntityId,
    pub item: EntityId,
}

impl Event for ItemEquipped {
    const KIND: EventKind = EventKind::new("item_equipped");
}

/// A consumable was used up. The item entity is removed, so `name` carries
/// what it was called.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemConsumed {
    pub actor: EntityId,
    pub item: EntityId,
    pub name: String,
    pub healed: i32,
}

impl Event for ItemConsumed {
    const KIND: EventKind = EventKind::new("item_consumed");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InventoryFull {
    pub actor: EntityId,
    pub item: EntityId,
}

impl Event for InventoryFull {
    const KIND: EventKind = EventKind::new("inventory_full");
}

/// An entity stepped onto stairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StairsReached {
    pub entity: EntityId,
    pub depth: u32,
}

impl Event for StairsReached {
    const KIND: EventKind = EventKind::new("stairs_reached");
}

/// Every gameplay event kind, for observers that want all of them.
pub const ALL_KINDS: [EventKind; 11] = [
    EntityMoved::KIND,
    MoveBlocked::KIND,
    EntitiesCollided::KIND,
    CombatDamage::KIND,
    CombatDeath::KIND,
    ItemPickedUp::KIND,
    ItemDropped::KIND,
    ItemEquipped::KIND,
    ItemConsumed::KIND,
    InventoryFull::KIND,
    StairsReached::KIND,
];
