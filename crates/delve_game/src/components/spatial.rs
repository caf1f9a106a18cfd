//! Grid position and movement intent.

use std::fmt;

use delve_component::Component;
use serde::{Deserialize, Serialize};

/// One of the four grid directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Self; 4] = [Self::North, Self::South, Self::East, Self::West];

    /// `(row, col)` offset of one step in this direction. Rows grow southward.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (-1, 0),
            Self::South => (1, 0),
            Self::East => (0, 1),
            Self::West => (0, -1),
        }
    }

    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::South => Self::North,
            Self::East => Self::West,
            Self::West => Self::East,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::North => "north",
            Self::South => "south",
            Self::East => "east",
            Self::West => "west",
        };
        f.write_str(name)
    }
}

/// A cell on the level grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    #[must_use]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// The neighbouring cell in `direction`.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dr, dc) = direction.delta();
        Self {
            row: self.row + dr,
            col: self.col + dc,
        }
    }

    /// Manhattan distance.
    #[must_use]
    pub const fn distance(self, other: Self) -> i32 {
        (self.row - other.row).abs() + (self.col - other.col).abs()
    }

    /// Chebyshev distance, used for sight radius.
    #[must_use]
    pub fn reach(self, other: Self) -> i32 {
        (self.row - other.row).abs().max((self.col - other.col).abs())
    }

    /// The direction of a single orthogonal step from `self` to `other`.
    #[must_use]
    pub fn direction_to(self, other: Self) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|&direction| self.step(direction) == other)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl Component for Position {
    fn type_name() -> &'static str {
        "Position"
    }
}

/// Marks an entity as able to move and records how it last moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Movement {
    pub facing: Option<Direction>,
    /// Successful moves so far.
    pub steps: u32,
}

impl Component for Movement {
    fn type_name() -> &'static str {
        "Movement"
    }
}

/// This turn's movement intent. Consumed by the movement system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Input {
    pub intent: Option<Direction>,
}

impl Input {
    #[must_use]
    pub const fn toward(direction: Direction) -> Self {
        Self {
            intent: Some(direction),
        }
    }
}

impl Component for Input {
    fn type_name() -> &'static str {
        "Input"
    }
}
