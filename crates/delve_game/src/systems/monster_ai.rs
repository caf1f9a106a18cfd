//! Monster behaviour: attack when adjacent, otherwise close in on a player
//! that is in sight.

use std::collections::HashSet;

use anyhow::Result;
use delve_component::EntityId;
use delve_world::{Component, QueryDescriptor, System, World};
use tracing::trace;

use crate::commands::Attack;
use crate::components::{Direction, Health, Input, Position, Visibility, tags};
use crate::level::Maze;

#[derive(Debug)]
pub struct MonsterAiSystem {
    query: QueryDescriptor,
}

impl MonsterAiSystem {
    #[must_use]
    pub fn new() -> Self {
        Self {
            query: QueryDescriptor::new()
                .tagged(tags::MONSTER)
                .with::<Position>()
                .with::<Health>(),
        }
    }
}

impl Default for MonsterAiSystem {
    fn default() -> Self {
        Self::new()
    }
}

fn can_step(world: &World, from: Position, direction: Direction) -> bool {
    world
        .current_level::<Maze>()
        .is_none_or(|maze| maze.is_linked(from, direction))
}

impl System for MonsterAiSystem {
    fn name(&self) -> &str {
        "monster_ai"
    }

    fn interests(&self) -> QueryDescriptor {
        self.query.clone()
    }

    fn update(&mut self, world: &mut World, _dt: f64) -> Result<()> {
        let Some(player) = world.tagged(&tags::PLAYER).first().copied() else {
            return Ok(());
        };
        let Some(&target) = world.get_component::<Position>(player) else {
            return Ok(());
        };

        let health_kinds = [Position::component_type_id(), Health::component_type_id()];
        let mut occupied: HashSet<Position> = world
            .query_iter(&health_kinds)
            .filter_map(|entity| entity.get::<Position>().copied())
            .collect();

        for monster in world.query_with(&self.query) {
            let Some(&at) = world.get_component::<Position>(monster) else {
                continue;
            };
            if world.get_component::<Health>(monster).is_some_and(Health::is_dead) {
                continue;
            }

            if let Some(direction) = at.direction_to(target)
                && can_step(world, at, direction)
            {
                trace!(%monster, %player, "monster attacks");
                world.queue_command(Attack {
                    attacker: monster,
                    defender: player,
                });
                continue;
            }

            let Some(direction) = approach(world, monster, at, target, &occupied) else {
                continue;
            };
            if let Some(input) = world.get_component_mut::<Input>(monster) {
                input.intent = Some(direction);
                occupied.remove(&at);
                occupied.insert(at.step(direction));
                trace!(%monster, %direction, "monster approaches");
            }
        }
        Ok(())
    }
}

/// A step that brings `monster` strictly closer to `target`, if the target
/// is within its sight radius and such a step is free.
fn approach(
    world: &World,
    monster: EntityId,
    at: Position,
    target: Position,
    occupied: &HashSet<Position>,
) -> Option<Direction> {
    let sight = world.get_component::<Visibility>(monster)?.radius;
    if at.reach(target) > sight {
        return None;
    }
    let current = at.distance(target);
    Direction::ALL
        .into_iter()
        .filter(|&direction| can_step(world, at, direction))
        .map(|direction| (direction, at.step(direction)))
        .filter(|(_, next)| !occupied.contains(next) && next.distance(target) < current)
        .min_by_key(|(_, next)| next.distance(target))
        .map(|(direction, _)| direction)
}

#[cfg(test)]
mod tests {
    use delve_world::FnSystem;

    use super::*;
    use crate::components::Movement;

    fn setup(maze: Maze) -> (World, EntityId) {
        let mut world = World::new();
        world.set_level(maze);
        world.add_system(MonsterAiSystem::new(), 0);
        let player = world
            .create_entity()
            .with_tag(tags::PLAYER)
            .with(Position::new(0, 0))
            .with(Health::full(10));
        let player = world.add_entity(player);
        (world, player)
    }

    fn monster(world: &mut World, at: Position, sight: i32) -> EntityId {
        let entity = world
            .create_entity()
            .with_tag(tags::MONSTER)
            .with(at)
            .with(Health::full(3))
            .with(Movement::default())
            .with(Input::default())
            .with(Visibility { radius: sight });
        world.add_entity(entity)
    }

    fn intent(world: &World, id: EntityId) -> Option<Direction> {
        world.get_component::<Input>(id).and_then(|input| input.intent)
    }

    #[test]
    fn test_adjacent_monster_queues_attack() {
        let (mut world, _player) = setup(Maze::open(3, 3));
        let goblin = monster(&mut world, Position::new(0, 1), 5);

        world.add_system(
            FnSystem::new("check", |world: &mut World, _| {
                assert_eq!(world.pending_commands(), 1);
                Ok(())
            }),
            1,
        );
        world.update(1.0).unwrap();
        assert_eq!(intent(&world, goblin), None);
    }

    #[test]
    fn test_wall_between_prevents_attack() {
        let parsed = Maze::parse("@#g").unwrap();
        let (mut world, _player) = setup(parsed.maze);
        let goblin = monster(&mut world, Position::new(0, 2), 5);
        world.add_system(
            FnSystem::new("check", |world: &mut World, _| {
                assert_eq!(world.pending_commands(), 0);
                Ok(())
            }),
            1,
        );
        world.update(1.0).unwrap();
        // Not adjacent either, and no linked step gets closer.
        assert_eq!(intent(&world, goblin), None);
    }

    #[test]
    fn test_monster_in_sight_approaches() {
        let (mut world, _player) = setup(Maze::open(1, 5));
        let goblin = monster(&mut world, Position::new(0, 4), 5);
        world.update(1.0).unwrap();
        assert_eq!(intent(&world, goblin), Some(Direction::West));
    }

    #[test]
    fn test_monster_out_of_sight_waits() {
        let (mut world, _player) = setup(Maze::open(1, 5));
        let goblin = monster(&mut world, Position::new(0, 4), 2);
        world.update(1.0).unwrap();
        assert_eq!(intent(&world, goblin), None);
    }

    #[test]
    fn test_monsters_do_not_pile_into_one_cell() {
        let (mut world, _player) = setup(Maze::open(3, 3));
        let first = monster(&mut world, Position::new(0, 2), 5);
        let second = monster(&mut world, Position::new(1, 2), 5);
        world.update(1.0).unwrap();

        let first_to = intent(&world, first).map(|d| Position::new(0, 2).step(d));
        let second_to = intent(&world, second).map(|d| Position::new(1, 2).step(d));
        assert!(first_to.is_some());
        assert_ne!(first_to, second_to);
    }
}
