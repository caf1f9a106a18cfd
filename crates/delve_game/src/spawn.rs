//! Standard entity archetypes and level loading.

use delve_component::EntityId;
use delve_world::World;
use tracing::info;

use crate::components::{
    Combat, Consumable, Equippable, Health, Input, Inventory, Item, Movement, Name, Position,
    Render, Stairs, Visibility, tags,
};
use crate::level::{LevelError, ParsedLevel, SpawnKind};

pub fn player(world: &mut World, at: Position) -> EntityId {
    let entity = world
        .create_entity()
        .with_tag(tags::PLAYER)
        .with(Name::new("you"))
        .with(at)
        .with(Movement::default())
        .with(Input::default())
        .with(Render::new('@', Render::ACTOR_LAYER))
        .with(Health::full(20))
        .with(Combat::new(3, 1))
        .with(Inventory::with_capacity(5))
        .with(Visibility { radius: 6 });
    world.add_entity(entity)
}

pub fn goblin(world: &mut World, at: Position) -> EntityId {
    let entity = world
        .create_entity()
        .with_tag(tags::MONSTER)
        .with(Name::new("goblin"))
        .with(at)
        .with(Movement::default())
        .with(Input::default())
        .with(Render::new('g', Render::ACTOR_LAYER))
        .with(Health::full(6))
        .with(Combat::new(2, 0))
        .with(Visibility { radius: 5 });
    world.add_entity(entity)
}

pub fn potion(world: &mut World, at: Position) -> EntityId {
    let entity = world
        .create_entity()
        .with_tag(tags::ITEM)
        .with(Item::new("potion"))
        .with(Consumable { heal: 8 })
        .with(at)
        .with(Render::new('!', Render::ITEM_LAYER));
    world.add_entity(entity)
}

pub fn sword(world: &mut World, at: Position) -> EntityId {
    let entity = world
        .create_entity()
        .with_tag(tags::ITEM)
        .with(Item::new("sword"))
        .with(Equippable {
            attack_bonus: 3,
            defense_bonus: 0,
        })
        .with(at)
        .with(Render::new('/', Render::ITEM_LAYER));
    world.add_entity(entity)
}

pub fn stairs(world: &mut World, at: Position, depth: u32) -> EntityId {
    let entity = world
        .create_entity()
        .with_tag(tags::STAIRS)
        .with(Name::new("stairs"))
        .with(Stairs { depth })
        .with(at)
        .with(Render::new('>', Render::FLOOR_LAYER));
    world.add_entity(entity)
}

/// Install a parsed level as the world's current level and spawn its
/// markers. Stairs lead to `depth + 1`. Returns the player.
///
/// # Errors
///
/// [`LevelError::NoPlayer`] if the level has no player marker.
pub fn load(world: &mut World, level: ParsedLevel, depth: u32) -> Result<EntityId, LevelError> {
    let mut player_id = None;
    for spawn in &level.spawns {
        match spawn.kind {
            SpawnKind::Player => player_id = Some(player(world, spawn.at)),
            SpawnKind::Goblin => {
                goblin(world, spawn.at);
            }
            SpawnKind::Potion => {
                potion(world, spawn.at);
            }
            SpawnKind::Sword => {
                sword(world, spawn.at);
            }
            SpawnKind::Stairs => {
                stairs(world, spawn.at, depth + 1);
            }
        }
    }
    let player_id = player_id.ok_or(LevelError::NoPlayer)?;

    info!(
        depth,
        rows = level.maze.rows(),
        cols = level.maze.cols(),
        entities = world.entity_count(),
        "level loaded"
    );
    world.set_level(level.maze);
    Ok(player_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Maze;

    #[test]
    fn test_load_spawns_every_marker() {
        let mut world = World::new();
        let level = Maze::parse("@g!/>").unwrap();
        let hero = load(&mut world, level, 1).unwrap();

        assert_eq!(world.entity_count(), 5);
        assert!(world.has_tag(hero, &tags::PLAYER));
        assert_eq!(world.tagged(&tags::MONSTER).len(), 1);
        assert_eq!(world.tagged(&tags::ITEM).len(), 2);
        let stairs = world.tagged(&tags::STAIRS)[0];
        assert_eq!(world.get_component::<Stairs>(stairs), Some(&Stairs { depth: 2 }));
        assert!(world.current_level::<Maze>().is_some());
    }

    #[test]
    fn test_load_without_player_fails() {
        let mut world = World::new();
        let level = ParsedLevel {
            maze: Maze::open(1, 1),
            spawns: Vec::new(),
        };
        assert_eq!(load(&mut world, level, 1), Err(LevelError::NoPlayer));
        assert!(!world.has_level());
    }
}
