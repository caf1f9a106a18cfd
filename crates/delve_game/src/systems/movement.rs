//! Applies movement intents against the level's links.

use anyhow::Result;
use delve_world::{QueryDescriptor, System, World};
use tracing::trace;

use crate::components::{Input, Movement, Position};
use crate::events::{EntityMoved, MoveBlocked};
use crate::level::Maze;

/// Consumes each mover's [`Input`] intent. A step along a maze link moves
/// the entity and publishes [`EntityMoved`]; anything else publishes
/// [`MoveBlocked`]. With no maze installed every step is allowed.
#[derive(Debug)]
pub struct MovementSystem {
    query: QueryDescriptor,
}

impl MovementSystem {
    #[must_use]
    pub fn new() -> Self {
        Self {
            query: QueryDescriptor::new()
                .with::<Position>()
                .with::<Movement>()
                .with::<Input>(),
        }
    }
}

impl Default for MovementSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for MovementSystem {
    fn name(&self) -> &str {
        "movement"
    }

    fn interests(&self) -> QueryDescriptor {
        self.query.clone()
    }

    fn update(&mut self, world: &mut World, _dt: f64) -> Result<()> {
        for id in world.query_with(&self.query) {
            let Some(direction) = world
                .get_component_mut::<Input>(id)
                .and_then(|input| input.intent.take())
            else {
                continue;
            };
            let Some(&from) = world.get_component::<Position>(id) else {
                continue;
            };

            let allowed = world
                .current_level::<Maze>()
                .is_none_or(|maze| maze.is_linked(from, direction));
            if !allowed {
                trace!(entity = %id, %from, %direction, "move blocked");
                world.publish(MoveBlocked {
                    entity: id,
                    at: from,
                    direction,
                });
                continue;
            }

            let to = from.step(direction);
            world.add_component(id, to);
            if let Some(movement) = world.get_component_mut::<Movement>(id) {
                movement.facing = Some(direction);
                movement.steps += 1;
            }
            trace!(entity = %id, %from, %to, "moved");
            world.publish(EntityMoved { entity: id, from, to });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use delve_component::EntityId;

    use super::*;
    use crate::components::Direction;
    use crate::testing::{Seen, SeenLog, record_events};

    fn setup(maze: Option<Maze>) -> (World, SeenLog) {
        let mut world = World::new();
        if let Some(maze) = maze {
            world.set_level(maze);
        }
        world.add_system(MovementSystem::new(), 0);
        let log = record_events(&mut world);
        (world, log)
    }

    fn mover(world: &mut World, at: Position, direction: Direction) -> EntityId {
        let entity = world
            .create_entity()
            .with(at)
            .with(Movement::default())
            .with(Input::toward(direction));
        world.add_entity(entity)
    }

    #[test]
    fn test_linked_step_moves_and_consumes_intent() {
        let (mut world, log) = setup(Some(Maze::open(1, 2)));
        let id = mover(&mut world, Position::new(0, 0), Direction::East);

        world.update(1.0).unwrap();
        assert_eq!(world.get_component::<Position>(id), Some(&Position::new(0, 1)));
        assert_eq!(world.get_component::<Input>(id).and_then(|i| i.intent), None);
        let movement = world.get_component::<Movement>(id).unwrap();
        assert_eq!(movement.facing, Some(Direction::East));
        assert_eq!(movement.steps, 1);
        assert_eq!(
            *log.borrow(),
            vec![Seen::Moved(EntityMoved {
                entity: id,
                from: Position::new(0, 0),
                to: Position::new(0, 1),
            })]
        );

        // The intent was consumed, so nothing moves next step.
        world.update(1.0).unwrap();
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_unlinked_step_is_blocked() {
        let (mut world, log) = setup(Some(Maze::open(1, 2)));
        let id = mover(&mut world, Position::new(0, 0), Direction::North);

        world.update(1.0).unwrap();
        assert_eq!(world.get_component::<Position>(id), Some(&Position::new(0, 0)));
        assert_eq!(
            *log.borrow(),
            vec![Seen::Blocked(MoveBlocked {
                entity: id,
                at: Position::new(0, 0),
                direction: Direction::North,
            })]
        );
    }

    #[test]
    fn test_no_level_is_unconstrained() {
        let (mut world, _log) = setup(None);
        let id = mover(&mut world, Position::new(0, 0), Direction::West);
        world.update(1.0).unwrap();
        assert_eq!(world.get_component::<Position>(id), Some(&Position::new(0, -1)));
    }

    #[test]
    fn test_entities_without_movement_stay_put() {
        let (mut world, log) = setup(Some(Maze::open(2, 2)));
        let entity = world
            .create_entity()
            .with(Position::new(0, 0))
            .with(Input::toward(Direction::South));
        let id = world.add_entity(entity);

        world.update(1.0).unwrap();
        assert_eq!(world.get_component::<Position>(id), Some(&Position::new(0, 0)));
        assert!(log.borrow().is_empty());
    }
}
