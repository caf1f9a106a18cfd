//! Deferred publish/subscribe.
//!
//! [`EventBus`] holds the pending FIFO of published events and the
//! kind → subscriber table. Publishing never calls a subscriber; the world
//! pops events during its drain phase and hands each one to every system
//! subscribed to its kind.

use std::any::Any;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::rc::Rc;

use crate::payload::Payload;
use crate::system::SystemId;

/// The kind of an event, e.g. `"entity_moved"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventKind(&'static str);

impl EventKind {
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A notification that something already happened.
///
/// ```rust
/// use delve_world::{Event, EventKind};
///
/// #[derive(Debug)]
/// struct DoorOpened {
///     cell: (i32, i32),
/// }
///
/// impl Event for DoorOpened {
///     const KIND: EventKind = EventKind::new("door_opened");
/// }
/// ```
pub trait Event: Any + fmt::Debug {
    const KIND: EventKind;
}

/// A published event: its kind, its position in publish order, and its
/// type-erased payload.
pub struct EventRecord {
    kind: EventKind,
    seq: u64,
    payload: Box<dyn Payload>,
}

impl EventRecord {
    /// Wrap a typed event.
    #[must_use]
    pub fn new<E: Event>(event: E) -> Self {
        Self::raw(E::KIND, event)
    }

    /// Wrap an arbitrary payload under an explicit kind.
    #[must_use]
    pub fn raw<P: Any + fmt::Debug>(kind: EventKind, payload: P) -> Self {
        Self {
            kind,
            seq: 0,
            payload: Box::new(payload),
        }
    }

    #[must_use]
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Publish sequence number, starting at 1 for the first event of a world.
    #[must_use]
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Borrow the payload as `T`, if it is one.
    #[must_use]
    pub fn downcast<T: Any>(&self) -> Option<&T> {
        (*self.payload).as_any().downcast_ref::<T>()
    }

    /// Returns `true` if this record carries an `E`.
    #[must_use]
    pub fn is<E: Event>(&self) -> bool {
        self.kind == E::KIND && self.downcast::<E>().is_some()
    }
}

impl fmt::Debug for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRecord")
            .field("kind", &self.kind)
            .field("seq", &self.seq)
            .field("payload", &self.payload)
            .finish()
    }
}

/// Pending events plus the subscription table.
#[derive(Debug, Default)]
pub struct EventBus {
    pending: VecDeque<Rc<EventRecord>>,
    subscribers: HashMap<EventKind, Vec<SystemId>>,
    /// Deliveries postponed because the subscriber was already running.
    held: VecDeque<(SystemId, Rc<EventRecord>)>,
    published: u64,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a system to a kind. Returns `false` if it already was.
    pub fn subscribe(&mut self, kind: EventKind, system: SystemId) -> bool {
        let list = self.subscribers.entry(kind).or_default();
        if list.contains(&system) {
            return false;
        }
        list.push(system);
        true
    }

    /// Remove a subscription. Returns `true` if it existed.
    pub fn unsubscribe(&mut self, kind: EventKind, system: SystemId) -> bool {
        let Some(list) = self.subscribers.get_mut(&kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|s| *s != system);
        before != list.len()
    }

    /// Subscribers of a kind, in subscription order.
    #[must_use]
    pub fn subscribers(&self, kind: EventKind) -> &[SystemId] {
        self.subscribers.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Append an event to the pending queue.
    pub fn publish(&mut self, mut record: EventRecord) {
        self.published += 1;
        record.seq = self.published;
        self.pending.push_back(Rc::new(record));
    }

    /// Pop the oldest pending event.
    pub fn pop(&mut self) -> Option<Rc<EventRecord>> {
        self.pending.pop_front()
    }

    pub(crate) fn hold(&mut self, system: SystemId, record: Rc<EventRecord>) {
        self.held.push_back((system, record));
    }

    pub(crate) fn take_held(&mut self) -> VecDeque<(SystemId, Rc<EventRecord>)> {
        std::mem::take(&mut self.held)
    }

    /// Number of events waiting to be drained.
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

    /// Total events published over the bus's lifetime.
    #[must_use]
    pub fn published(&self) -> u64 {
        self.published
    }

    /// Drop every pending and held event. Returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.pending.len() + self.held.len();
        self.pending.clear();
        self.held.clear();
        dropped
    }
}
