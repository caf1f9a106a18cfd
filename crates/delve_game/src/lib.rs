//! # delve_game
//!
//! A small dungeon game built on [`delve_world`]: grid components, ASCII
//! maze levels, gameplay events and commands, and the systems that tie them
//! together. A player's turn flows through the world like this:
//!
//! ```text
//! Input ─▶ Movement ─EntityMoved─▶ Collision ─EntitiesCollided─▶ Encounter
//!                                                                    │
//!          CombatDamage / CombatDeath ◀─ Combat ◀──────── Attack ────┘
//! ```
//!
//! Use [`install`] to register the systems and [`spawn::load`] to populate
//! a world from a parsed [`Maze`].

pub mod commands;
pub mod components;
pub mod events;
pub mod level;
pub mod spawn;
pub mod systems;

#[cfg(test)]
pub(crate) mod testing;

pub use level::{LevelError, Maze, ParsedLevel, Spawn, SpawnKind};
pub use systems::{
    Encounter, EncounterResolver, GameSystems, StandardEncounters, describe, install, priority,
};
