//! Turns gameplay events into the lines shown under the map.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use anyhow::Result;
use delve_game::components::{Name, tags};
use delve_game::describe;
use delve_game::events::{
    ALL_KINDS, CombatDamage, CombatDeath, InventoryFull, ItemConsumed, ItemDropped, ItemEquipped,
    ItemPickedUp, MoveBlocked, StairsReached,
};
use delve_world::{Component, EntityId, EventRecord, System, SystemId, World};

/// Shared queue of pending message lines. The log system writes into it;
/// the turn loop drains it after each step.
#[derive(Debug, Clone, Default)]
pub struct MessageBuffer(Rc<RefCell<VecDeque<String>>>);

impl MessageBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, line: impl Into<String>) {
        self.0.borrow_mut().push_back(line.into());
    }

    /// Take every pending line, oldest first.
    pub fn drain(&self) -> Vec<String> {
        self.0.borrow_mut().drain(..).collect()
    }
}

/// Formats gameplay events into a [`MessageBuffer`].
///
/// Names are cached once per step, so an entity removed by a command
/// earlier in the drain is still reported by name.
pub struct MessageLog {
    buffer: MessageBuffer,
    names: HashMap<EntityId, String>,
}

impl MessageLog {
    #[must_use]
    pub fn new(buffer: MessageBuffer) -> Self {
        Self {
            buffer,
            names: HashMap::new(),
        }
    }

    /// Register the log and subscribe it to every gameplay event.
    pub fn install(world: &mut World, buffer: MessageBuffer, priority: i32) -> SystemId {
        let id = world.add_system(Self::new(buffer), priority);
        for kind in ALL_KINDS {
            world.subscribe(kind, id);
        }
        id
    }

    fn name(&self, world: &World, id: EntityId) -> String {
        match self.names.get(&id) {
            Some(name) => name.clone(),
            None => describe(world, id),
        }
    }

    fn format(&self, world: &World, event: &EventRecord) -> Option<String> {
        if let Some(e) = event.downcast::<MoveBlocked>() {
            // Monsters bumping into walls is noise.
            return world
                .has_tag(e.entity, &tags::PLAYER)
                .then(|| format!("{} bumped into a wall", self.name(world, e.entity)));
        }
        if let Some(e) = event.downcast::<CombatDamage>() {
            return Some(format!(
                "{} hit {} for {} ({} left)",
                self.name(world, e.attacker),
                self.name(world, e.defender),
                e.amount,
                e.remaining.max(0)
            ));
        }
        if let Some(e) = event.downcast::<CombatDeath>() {
            return Some(format!("{} died", e.name));
        }
        if let Some(e) = event.downcast::<ItemPickedUp>() {
            return Some(format!(
                "{} picked up the {}",
                self.name(world, e.actor),
                self.name(world, e.item)
            ));
        }
        if let Some(e) = event.downcast::<ItemDropped>() {
            return Some(format!(
                "{} dropped the {}",
                self.name(world, e.actor),
                self.name(world, e.item)
            ));
        }
        if let Some(e) = event.downcast::<ItemEquipped>() {
            return Some(format!(
                "{} equipped the {}",
                self.name(world, e.actor),
                self.name(world, e.item)
            ));
        }
        if let Some(e) = event.downcast::<ItemConsumed>() {
            return Some(format!(
                "{} used the {} and recovered {}",
                self.name(world, e.actor),
                e.name,
                e.healed
            ));
        }
        if let Some(e) = event.downcast::<InventoryFull>() {
            return Some(format!(
                "{} can't carry the {}",
                self.name(world, e.actor),
                self.name(world, e.item)
            ));
        }
        if let Some(e) = event.downcast::<StairsReached>() {
            return Some(format!(
                "{} found the stairs down to depth {}",
                self.name(world, e.entity),
                e.depth
            ));
        }
        None
    }
}

impl System for MessageLog {
    fn name(&self) -> &str {
        "message_log"
    }

    fn update(&mut self, world: &mut World, _dt: f64) -> Result<()> {
        let kinds = [Name::component_type_id()];
        self.names = world
            .query_iter(&kinds)
            .filter_map(|entity| entity.get::<Name>().map(|name| (entity.id(), name.0.clone())))
            .collect();
        Ok(())
    }

    fn on_event(&mut self, world: &mut World, event: &EventRecord) -> Result<()> {
        if let Some(line) = self.format(world, event) {
            self.buffer.push(line);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use delve_game::components::{Direction, Health, Input, Position};
    use delve_game::{Maze, StandardEncounters, install, spawn};

    use super::*;

    #[test]
    fn test_buffer_drains_in_order() {
        let buffer = MessageBuffer::new();
        buffer.push("one");
        buffer.push("two");
        assert_eq!(buffer.drain(), vec!["one", "two"]);
        assert!(buffer.drain().is_empty());
    }

    #[test]
    fn test_fight_messages_name_the_dead() {
        let mut world = World::new();
        world.set_level(Maze::open(1, 2));
        install(&mut world, StandardEncounters);
        let buffer = MessageBuffer::new();
        MessageLog::install(&mut world, buffer.clone(), 100);

        let hero = spawn::player(&mut world, Position::new(0, 0));
        let goblin = spawn::goblin(&mut world, Position::new(0, 1));
        world.add_component(goblin, Health::full(1));
        if let Some(input) = world.get_component_mut::<Input>(hero) {
            input.intent = Some(Direction::East);
        }

        world.update(1.0).unwrap();
        let lines = buffer.drain();
        assert_eq!(
            lines,
            vec![
                "goblin hit you for 1 (19 left)",
                "you hit goblin for 3 (0 left)",
                "goblin died",
            ]
        );
    }

    #[test]
    fn test_player_bump_is_reported() {
        let mut world = World::new();
        world.set_level(Maze::open(1, 1));
        install(&mut world, StandardEncounters);
        let buffer = MessageBuffer::new();
        MessageLog::install(&mut world, buffer.clone(), 100);
        let hero = spawn::player(&mut world, Position::new(0, 0));
        if let Some(input) = world.get_component_mut::<Input>(hero) {
            input.intent = Some(Direction::North);
        }

        world.update(1.0).unwrap();
        assert_eq!(buffer.drain(), vec!["you bumped into a wall"]);
    }
}
