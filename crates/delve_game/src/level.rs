//! Maze levels.
//!
//! A [`Maze`] is a rectangular grid of cells. Movement between two
//! orthogonally adjacent cells is allowed only when they are *linked*; walls
//! are simply cells with no links. The maze is installed as the world's
//! current level and read by the movement, monster and render code.
//!
//! ## ASCII format
//!
//! ```text
//! #######
//! #@..g>#
//! #.#!#/#
//! #######
//! ```
//!
//! `#` is wall, `.` floor. The spawn markers `@` (player), `g` (goblin),
//! `!` (potion), `/` (sword) and `>` (stairs) are floor cells that also
//! produce a [`Spawn`]. Every pair of adjacent floor cells is linked.

use serde::{Deserialize, Serialize};

use crate::components::{Direction, Position};

/// Errors produced while parsing an ASCII level.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LevelError {
    #[error("level is empty")]
    Empty,

    #[error("line {line}: expected {expected} columns, found {found}")]
    Ragged {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}, column {col}: unknown glyph {glyph:?}")]
    UnknownGlyph { line: usize, col: usize, glyph: char },

    #[error("level has no player start (`@`)")]
    NoPlayer,

    #[error("level has {count} player starts; expected one")]
    MultiplePlayers { count: usize },
}

/// What to spawn at a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnKind {
    Player,
    Goblin,
    Potion,
    Sword,
    Stairs,
}

impl SpawnKind {
    fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '@' => Some(Self::Player),
            'g' => Some(Self::Goblin),
            '!' => Some(Self::Potion),
            '/' => Some(Self::Sword),
            '>' => Some(Self::Stairs),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spawn {
    pub kind: SpawnKind,
    pub at: Position,
}

/// A parsed level: the maze plus the spawn markers found in it, in
/// reading order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLevel {
    pub maze: Maze,
    pub spawns: Vec<Spawn>,
}

/// Grid of cells with explicit links between neighbours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Maze {
    rows: usize,
    cols: usize,
    floor: Vec<bool>,
    links: Vec<u8>,
}

const fn link_bit(direction: Direction) -> u8 {
    match direction {
        Direction::North => 0b0001,
        Direction::South => 0b0010,
        Direction::East => 0b0100,
        Direction::West => 0b1000,
    }
}

impl Maze {
    /// A grid of solid wall.
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            floor: vec![false; rows * cols],
            links: vec![0; rows * cols],
        }
    }

    /// A single open room: every cell is floor and linked to every
    /// in-bounds neighbour.
    #[must_use]
    pub fn open(rows: usize, cols: usize) -> Self {
        let mut maze = Self::new(rows, cols);
        for index in 0..maze.floor.len() {
            maze.floor[index] = true;
        }
        maze.link_adjacent_floor();
        maze
    }

    /// Parse an ASCII level.
    ///
    /// # Errors
    ///
    /// Returns a [`LevelError`] if the text is empty, its lines differ in
    /// width, it contains an unknown glyph, or it does not have exactly one
    /// player start.
    pub fn parse(text: &str) -> Result<ParsedLevel, LevelError> {
        let lines: Vec<&str> = text
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .skip_while(|line| line.trim().is_empty())
            .collect();
        let last = lines
            .iter()
            .rposition(|line| !line.trim().is_empty())
            .ok_or(LevelError::Empty)?;
        let lines = &lines[..=last];

        let cols = lines[0].chars().count();
        let mut maze = Self::new(lines.len(), cols);
        let mut spawns = Vec::new();

        for (row, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != cols {
                return Err(LevelError::Ragged {
                    line: row + 1,
                    expected: cols,
                    found,
                });
            }
            for (col, glyph) in line.chars().enumerate() {
                let at = Position::new(row as i32, col as i32);
                match glyph {
                    '#' => {}
                    '.' => maze.carve(at),
                    other => {
                        let kind = SpawnKind::from_glyph(other).ok_or(LevelError::UnknownGlyph {
                            line: row + 1,
                            col: col + 1,
                            glyph: other,
                        })?;
                        maze.carve(at);
                        spawns.push(Spawn { kind, at });
                    }
                }
            }
        }

        match spawns.iter().filter(|s| s.kind == SpawnKind::Player).count() {
            0 => return Err(LevelError::NoPlayer),
            1 => {}
            count => return Err(LevelError::MultiplePlayers { count }),
        }

        maze.link_adjacent_floor();
        Ok(ParsedLevel { maze, spawns })
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub fn contains(&self, at: Position) -> bool {
        self.index(at).is_some()
    }

    #[must_use]
    pub fn is_floor(&self, at: Position) -> bool {
        self.index(at).is_some_and(|index| self.floor[index])
    }

    /// Turn a wall cell into floor. Does not link it.
    pub fn carve(&mut self, at: Position) {
        if let Some(index) = self.index(at) {
            self.floor[index] = true;
        }
    }

    /// Link `at` with its neighbour in `direction`, both ways. Returns
    /// `false` if either cell is outside the grid.
    pub fn link(&mut self, at: Position, direction: Direction) -> bool {
        let (Some(from), Some(to)) = (self.index(at), self.index(at.step(direction))) else {
            return false;
        };
        self.links[from] |= link_bit(direction);
        self.links[to] |= link_bit(direction.opposite());
        true
    }

    /// Whether a step from `at` in `direction` is allowed.
    #[must_use]
    pub fn is_linked(&self, at: Position, direction: Direction) -> bool {
        self.index(at)
            .is_some_and(|index| self.links[index] & link_bit(direction) != 0)
    }

    /// Directions that can be taken from `at`.
    pub fn exits(&self, at: Position) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL
            .into_iter()
            .filter(move |&direction| self.is_linked(at, direction))
    }

    fn link_adjacent_floor(&mut self) {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let at = Position::new(row as i32, col as i32);
                if !self.is_floor(at) {
                    continue;
                }
                for direction in [Direction::East, Direction::South] {
                    if self.is_floor(at.step(direction)) {
                        self.link(at, direction);
                    }
                }
            }
        }
    }

    fn index(&self, at: Position) -> Option<usize> {
        let row = usize::try_from(at.row).ok()?;
        let col = usize::try_from(at.col).ok()?;
        (row < self.rows && col < self.cols).then_some(row * self.cols + col)
    }
}
