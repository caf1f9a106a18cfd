//! The [`System`] trait: a scheduled unit of behaviour.
//!
//! Systems hold no entity state of their own. All persistent state lives in
//! components or in the world; collaborators a system needs (a message
//! buffer, a choice resolver) are handed to it at construction.

use std::fmt;

use anyhow::Result;
use delve_component::QueryDescriptor;

use crate::command::CommandRecord;
use crate::event::EventRecord;
use crate::world::World;

/// Handle to a system registered with a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SystemId(pub(crate) u64);

impl SystemId {
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "System({})", self.0)
    }
}

/// A unit of behaviour run once per step and, optionally, once per
/// delivered event or command.
///
/// Every hook has a no-op default, so a system implements only the hooks it
/// needs. Returning `Err` from any hook aborts the current step.
pub trait System {
    /// Name used in logs and error reports.
    fn name(&self) -> &str;

    /// The entities this system works on. Advisory; the world never filters
    /// on it, but systems may pass it to [`World::query_with`].
    fn interests(&self) -> QueryDescriptor {
        QueryDescriptor::new()
    }

    /// Called once per step, in ascending priority order.
    fn update(&mut self, world: &mut World, dt: f64) -> Result<()> {
        let _ = (world, dt);
        Ok(())
    }

    /// Called once per delivered event of a kind this system subscribed to.
    fn on_event(&mut self, world: &mut World, event: &EventRecord) -> Result<()> {
        let _ = (world, event);
        Ok(())
    }

    /// Called once per command of a kind this system handles.
    fn on_command(&mut self, world: &mut World, command: &CommandRecord) -> Result<()> {
        let _ = (world, command);
        Ok(())
    }
}

/// Adapts a closure into a [`System`] that only has an `update` hook.
pub struct FnSystem<F> {
    name: String,
    update: F,
}

impl<F> FnSystem<F>
where
    F: FnMut(&mut World, f64) -> Result<()>,
{
    #[must_use]
    pub fn new(name: impl Into<String>, update: F) -> Self {
        Self {
            name: name.into(),
            update,
        }
    }
}

impl<F> System for FnSystem<F>
where
    F: FnMut(&mut World, f64) -> Result<()>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn update(&mut self, world: &mut World, dt: f64) -> Result<()> {
        (self.update)(world, dt)
    }
}

impl<F> fmt::Debug for FnSystem<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSystem").field("name", &self.name).finish()
    }
}
