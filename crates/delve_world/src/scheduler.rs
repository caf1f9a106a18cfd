//! System scheduler: priority ordering and system ownership.
//!
//! Systems are kept sorted by ascending priority. A new system is inserted
//! after every system whose priority is less than or equal to its own, so
//! equal priorities run in registration order and nothing is ever re-sorted.
//!
//! While one of a system's hooks runs, the system is checked out of its
//! slot so the hook can receive `&mut World`. The world drives the pass
//! itself (see `World::update`).

use std::fmt;

use delve_component::QueryDescriptor;

use crate::system::{System, SystemId};

/// A registered system and its scheduling metadata.
struct ScheduledSystem {
    id: SystemId,
    name: String,
    priority: i32,
    interests: QueryDescriptor,
    /// `None` while the system is checked out.
    unit: Option<Box<dyn System>>,
}

/// Result of trying to check a system out of its slot.
pub(crate) enum Checkout {
    Ready(Box<dyn System>),
    /// The system is already running further up the call stack.
    Busy,
    Unknown,
}

/// Priority-ordered list of systems.
#[derive(Default)]
pub struct Scheduler {
    systems: Vec<ScheduledSystem>,
    next_id: u64,
}

impl Scheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a system at a priority. Lower priorities run first.
    pub fn add(&mut self, unit: Box<dyn System>, priority: i32) -> SystemId {
        self.next_id += 1;
        let id = SystemId(self.next_id);
        let index = self.systems.partition_point(|s| s.priority <= priority);
        self.systems.insert(
            index,
            ScheduledSystem {
                id,
                name: unit.name().to_string(),
                priority,
                interests: unit.interests(),
                unit: Some(unit),
            },
        );
        id
    }

    /// System ids in execution order.
    #[must_use]
    pub fn order(&self) -> Vec<SystemId> {
        self.systems.iter().map(|s| s.id).collect()
    }

    #[must_use]
    pub fn name(&self, id: SystemId) -> Option<&str> {
        self.slot(id).map(|s| s.name.as_str())
    }

    #[must_use]
    pub fn priority(&self, id: SystemId) -> Option<i32> {
        self.slot(id).map(|s| s.priority)
    }

    #[must_use]
    pub fn interests(&self, id: SystemId) -> Option<&QueryDescriptor> {
        self.slot(id).map(|s| &s.interests)
    }

    #[must_use]
    pub fn contains(&self, id: SystemId) -> bool {
        self.slot(id).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    pub(crate) fn checkout(&mut self, id: SystemId) -> Checkout {
        match self.systems.iter_mut().find(|s| s.id == id) {
            Some(slot) => match slot.unit.take() {
                Some(unit) => Checkout::Ready(unit),
                None => Checkout::Busy,
            },
            None => Checkout::Unknown,
        }
    }

    pub(crate) fn restore(&mut self, id: SystemId, unit: Box<dyn System>) {
        if let Some(slot) = self.systems.iter_mut().find(|s| s.id == id) {
            debug_assert!(slot.unit.is_none(), "system {id} restored twice");
            slot.unit = Some(unit);
        }
    }

    fn slot(&self, id: SystemId) -> Option<&ScheduledSystem> {
        self.systems.iter().find(|s| s.id == id)
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.systems.iter().map(|s| (s.id, s.name.as_str(), s.priority)))
            .finish()
    }
}
