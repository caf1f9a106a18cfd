//! Test helpers shared by the game system tests.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;
use delve_world::{EventRecord, System, World};

use crate::events::{
    ALL_KINDS, CombatDamage, CombatDeath, EntitiesCollided, EntityMoved, InventoryFull,
    ItemConsumed, ItemDropped, ItemEquipped, ItemPickedUp, MoveBlocked, StairsReached,
};

/// A delivered gameplay event, copied out of its record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Seen {
    Moved(EntityMoved),
    Blocked(MoveBlocked),
    Collided(EntitiesCollided),
    Damage(CombatDamage),
    Death(CombatDeath),
    PickedUp(ItemPickedUp),
    Dropped(ItemDropped),
    Equipped(ItemEquipped),
    Consumed(ItemConsumed),
    Full(InventoryFull),
    Stairs(StairsReached),
}

impl Seen {
    fn from_record(event: &EventRecord) -> Option<Self> {
        if let Some(e) = event.downcast::<EntityMoved>() {
            return Some(Self::Moved(*e));
        }
        if let Some(e) = event.downcast::<MoveBlocked>() {
            return Some(Self::Blocked(*e));
        }
        if let Some(e) = event.downcast::<EntitiesCollided>() {
            return Some(Self::Collided(*e));
        }
        if let Some(e) = event.downcast::<CombatDamage>() {
            return Some(Self::Damage(*e));
        }
        if let Some(e) = event.downcast::<CombatDeath>() {
            return Some(Self::Death(e.clone()));
        }
        if let Some(e) = event.downcast::<ItemPickedUp>() {
            return Some(Self::PickedUp(*e));
        }
        if let Some(e) = event.downcast::<ItemDropped>() {
            return Some(Self::Dropped(*e));
        }
        if let Some(e) = event.downcast::<ItemEquipped>() {
            return Some(Self::Equipped(*e));
        }
        if let Some(e) = event.downcast::<ItemConsumed>() {
            return Some(Self::Consumed(e.clone()));
        }
        if let Some(e) = event.downcast::<InventoryFull>() {
            return Some(Self::Full(*e));
        }
        event.downcast::<StairsReached>().map(|e| Self::Stairs(*e))
    }
}

pub(crate) type SeenLog = Rc<RefCell<Vec<Seen>>>;

struct Recorder(SeenLog);

impl System for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    fn on_event(&mut self, _world: &mut World, event: &EventRecord) -> Result<()> {
        if let Some(seen) = Seen::from_record(event) {
            self.0.borrow_mut().push(seen);
        }
        Ok(())
    }
}

/// Register a system that records every gameplay event in delivery order.
pub(crate) fn record_events(world: &mut World) -> SeenLog {
    let log = SeenLog::default();
    let recorder = world.add_system(Recorder(Rc::clone(&log)), i32::MAX);
    for kind in ALL_KINDS {
        world.subscribe(kind, recorder);
    }
    log
}
