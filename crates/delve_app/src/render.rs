//! Plain-text rendering of the current level.

use delve_game::Maze;
use delve_game::components::{Health, Position, Render, Visibility};
use delve_world::{Component, EntityId, World};

const WALL: char = '#';
const FLOOR: char = '.';

/// Draw the maze and every `[Position, Render]` entity the viewer can see.
/// Higher render layers win when several entities share a cell. Returns an
/// empty string when no maze is installed.
#[must_use]
pub fn render_map(world: &World, viewer: EntityId) -> String {
    let Some(maze) = world.current_level::<Maze>() else {
        return String::new();
    };

    let mut grid: Vec<Vec<(char, Option<u8>)>> = (0..maze.rows())
        .map(|row| {
            (0..maze.cols())
                .map(|col| {
                    let at = Position::new(row as i32, col as i32);
                    let glyph = if maze.is_floor(at) { FLOOR } else { WALL };
                    (glyph, None)
                })
                .collect()
        })
        .collect();

    let eye = world.get_component::<Position>(viewer).copied();
    let sight = world.get_component::<Visibility>(viewer).map(|v| v.radius);
    let kinds = [Position::component_type_id(), Render::component_type_id()];

    for entity in world.query_iter(&kinds) {
        let (Some(&at), Some(render)) = (entity.get::<Position>(), entity.get::<Render>()) else {
            continue;
        };
        if let (Some(eye), Some(sight)) = (eye, sight)
            && entity.id() != viewer
            && eye.reach(at) > sight
        {
            continue;
        }
        let (Ok(row), Ok(col)) = (usize::try_from(at.row), usize::try_from(at.col)) else {
            continue;
        };
        let Some(cell) = grid.get_mut(row).and_then(|cells| cells.get_mut(col)) else {
            continue;
        };
        if cell.1.is_none_or(|layer| render.layer >= layer) {
            *cell = (render.glyph, Some(render.layer));
        }
    }

    let mut out = String::with_capacity(maze.rows() * (maze.cols() + 1));
    for cells in grid {
        out.extend(cells.into_iter().map(|(glyph, _)| glyph));
        out.push('\n');
    }
    out
}

/// One-line status for the viewer.
#[must_use]
pub fn status_line(world: &World, viewer: EntityId, turn: u64) -> String {
    match world.get_component::<Health>(viewer) {
        Some(health) => format!("turn {turn}  hp {}/{}", health.current.max(0), health.max),
        None => format!("turn {turn}"),
    }
}

#[cfg(test)]
mod tests {
    use delve_game::spawn;

    use super::*;

    #[test]
    fn test_render_draws_walls_floor_and_entities() {
        let mut world = World::new();
        let level = Maze::parse("#####\n#@.!#\n#####").unwrap();
        let hero = spawn::load(&mut world, level, 1).unwrap();

        assert_eq!(render_map(&world, hero), "#####\n#@.!#\n#####\n");
    }

    #[test]
    fn test_actors_draw_over_items() {
        let mut world = World::new();
        let level = Maze::parse("@.").unwrap();
        let hero = spawn::load(&mut world, level, 1).unwrap();
        spawn::potion(&mut world, Position::new(0, 1));
        spawn::goblin(&mut world, Position::new(0, 1));
        spawn::potion(&mut world, Position::new(0, 1));

        assert_eq!(render_map(&world, hero), "@g\n");
    }

    #[test]
    fn test_out_of_sight_entities_are_hidden() {
        let mut world = World::new();
        let level = Maze::parse("@.........").unwrap();
        let hero = spawn::load(&mut world, level, 1).unwrap();
        world.add_component(hero, Visibility { radius: 3 });
        spawn::goblin(&mut world, Position::new(0, 2));
        spawn::goblin(&mut world, Position::new(0, 8));

        assert_eq!(render_map(&world, hero), "@.g.......\n");
    }

    #[test]
    fn test_no_level_renders_nothing() {
        let world = World::new();
        assert_eq!(render_map(&world, EntityId::from_raw(1)), "");
    }

    #[test]
    fn test_status_line() {
        let mut world = World::new();
        let hero = spawn::player(&mut world, Position::new(0, 0));
        assert_eq!(status_line(&world, hero, 4), "turn 4  hp 20/20");
        world.remove_entity(hero);
        assert_eq!(status_line(&world, hero, 5), "turn 5");
    }
}
