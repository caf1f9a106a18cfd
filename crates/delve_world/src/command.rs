//! Deferred, ordered side-effect requests.
//!
//! Commands are the sanctioned route for structural mutation (spawning,
//! despawning, moving an item between owners). They are queued during a
//! step and executed in FIFO order against the post-step world, after the
//! event drain. A command may name a target entity; when that entity is
//! gone by the time the command runs, the command is skipped.

use std::any::Any;
use std::collections::{HashMap, VecDeque};
use std::fmt;

use delve_component::{Entity, EntityId};

use crate::payload::Payload;
use crate::system::SystemId;

/// The kind of a command, e.g. `"attack"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandKind(&'static str);

impl CommandKind {
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A request that something should happen.
pub trait Command: Any + fmt::Debug {
    const KIND: CommandKind;

    /// The entity this command acts on. When it no longer exists at
    /// execution time the command is a no-op.
    fn target(&self) -> Option<EntityId> {
        None
    }
}

/// Remove an entity from the world. Executed by the world itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveEntity {
    pub id: EntityId,
}

impl Command for RemoveEntity {
    const KIND: CommandKind = CommandKind::new("remove_entity");

    fn target(&self) -> Option<EntityId> {
        Some(self.id)
    }
}

/// Insert a prebuilt entity into the world. Executed by the world itself.
#[derive(Debug)]
pub struct SpawnEntity(pub Entity);

impl Command for SpawnEntity {
    const KIND: CommandKind = CommandKind::new("spawn_entity");
}

/// A queued command: kind, queue order, optional target, erased payload.
pub struct CommandRecord {
    kind: CommandKind,
    seq: u64,
    target: Option<EntityId>,
    payload: Box<dyn Payload>,
}

impl CommandRecord {
    /// Wrap a typed command.
    #[must_use]
    pub fn new<C: Command>(command: C) -> Self {
        let target = command.target();
        Self::raw(C::KIND, target, command)
    }

    /// Wrap an arbitrary payload under an explicit kind and target.
    #[must_use]
    pub fn raw<P: Any + fmt::Debug>(kind: CommandKind, target: Option<EntityId>, payload: P) -> Self {
        Self {
            kind,
            seq: 0,
            target,
            payload: Box::new(payload),
        }
    }

    #[must_use]
    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    #[must_use]
    pub fn seq(&self) -> u64 {
        self.seq
    }

    #[must_use]
    pub fn target(&self) -> Option<EntityId> {
        self.target
    }

    /// Borrow the payload as `T`, if it is one.
    #[must_use]
    pub fn downcast<T: Any>(&self) -> Option<&T> {
        (*self.payload).as_any().downcast_ref::<T>()
    }

    /// Take the payload by value. Gives the record back if it is not a `T`.
    pub fn into_payload<T: Any>(self) -> Result<T, Self> {
        if self.downcast::<T>().is_none() {
            return Err(self);
        }
        match self.payload.into_any().downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(_) => unreachable!("payload type checked above"),
        }
    }
}

impl fmt::Debug for CommandRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRecord")
            .field("kind", &self.kind)
            .field("seq", &self.seq)
            .field("target", &self.target)
            .field("payload", &self.payload)
            .finish()
    }
}

/// Pending commands plus the kind → handler table.
#[derive(Debug, Default)]
pub struct CommandQueue {
    pending: VecDeque<CommandRecord>,
    handlers: HashMap<CommandKind, SystemId>,
    /// Commands postponed because their handler was already running.
    held: VecDeque<(SystemId, CommandRecord)>,
    queued: u64,
}

impl CommandQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Route a kind to a handler, returning the handler it replaced.
    pub fn set_handler(&mut self, kind: CommandKind, system: SystemId) -> Option<SystemId> {
        self.handlers.insert(kind, system)
    }

    #[must_use]
    pub fn handler(&self, kind: CommandKind) -> Option<SystemId> {
        self.handlers.get(&kind).copied()
    }

    /// Append a command to the queue.
    pub fn queue(&mut self, mut record: CommandRecord) {
        self.queued += 1;
        record.seq = self.queued;
        self.pending.push_back(record);
    }

    /// Pop the oldest queued command.
    pub fn pop(&mut self) -> Option<CommandRecord> {
        self.pending.pop_front()
    }

    pub(crate) fn hold(&mut self, system: SystemId, record: CommandRecord) {
        self.held.push_back((system, record));
    }

    pub(crate) fn take_held(&mut self) -> VecDeque<(SystemId, CommandRecord)> {
        std::mem::take(&mut self.held)
    }

    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    #[must_use]
    pub fn has_held(&self) -> bool {
        !self.held.is_empty()
    }

    /// Total commands queued over the queue's lifetime.
    #[must_use]
    pub fn queued(&self) -> u64 {
        self.queued
    }

    /// Drop every pending and held command. Returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.pending.len() + self.held.len();
        self.pending.clear();
        self.held.clear();
        dropped
    }
}
