//! Entity identifiers, allocation, and the owned entity record.
//!
//! An [`EntityId`] is a lightweight `u64` identifier. An [`Entity`] pairs an
//! identifier with the components and tags it owns. Entities are only ever
//! referenced by identifier from outside the entity table.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::component::{Component, ComponentTypeId};
use crate::store::ComponentStore;
use crate::tag::{Tag, TagSet};

/// A unique entity identifier.
///
/// Identifiers are allocated by the world and are never reused, so an id
/// held in a queued event or command can only ever name the entity it was
/// created for (or nothing, once that entity is gone).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl EntityId {
    /// The null / invalid entity sentinel.
    pub const INVALID: EntityId = EntityId(0);

    /// Create an identifier from a raw `u64`.
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` identifier.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }

    /// Returns `true` if this is a valid (non-zero) identifier.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Allocates monotonically increasing entity IDs.
///
/// IDs are never recycled within a run. Once `u64::MAX` has been handed out
/// or observed the id space is exhausted and [`allocate`](Self::allocate)
/// returns [`EntityId::INVALID`].
#[derive(Debug)]
pub struct EntityAllocator {
    /// Next id to hand out, or `None` when the id space is exhausted.
    next_id: Option<u64>,
}

impl EntityAllocator {
    /// Creates a new allocator. IDs start at 1 (0 is reserved for [`EntityId::INVALID`]).
    #[must_use]
    pub fn new() -> Self {
        Self { next_id: Some(1) }
    }

    /// Allocates a fresh entity ID, or [`EntityId::INVALID`] when none are left.
    pub fn allocate(&mut self) -> EntityId {
        match self.next_id {
            Some(id) => {
                self.next_id = id.checked_add(1);
                EntityId(id)
            }
            None => EntityId::INVALID,
        }
    }

    /// Ensures every id allocated from now on is greater than `id`.
    ///
    /// Called when an entity built outside the allocator is inserted.
    pub fn observe(&mut self, id: EntityId) {
        if let Some(next) = self.next_id
            && id.0 >= next
        {
            self.next_id = id.0.checked_add(1);
        }
    }

    /// Returns the number of entity ids handed out or observed so far.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.next_id.map_or(u64::MAX, |next| next - 1)
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// An entity: an identifier plus the components and tags it owns.
#[derive(Debug)]
pub struct Entity {
    id: EntityId,
    components: ComponentStore,
    tags: TagSet,
}

impl Entity {
    /// Create an entity with no components and no tags.
    #[must_use]
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            components: ComponentStore::new(),
            tags: TagSet::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Builder-style component insertion.
    #[must_use]
    pub fn with<C: Component>(mut self, component: C) -> Self {
        self.components.insert(component);
        self
    }

    /// Builder-style tag insertion.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<Tag>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Attach a component, returning the previous value of the same kind.
    pub fn insert<C: Component>(&mut self, component: C) -> Option<C> {
        self.components.insert(component)
    }

    #[must_use]
    pub fn get<C: Component>(&self) -> Option<&C> {
        self.components.get::<C>()
    }

    #[must_use]
    pub fn get_mut<C: Component>(&mut self) -> Option<&mut C> {
        self.components.get_mut::<C>()
    }

    #[must_use]
    pub fn has<C: Component>(&self) -> bool {
        self.components.contains::<C>()
    }

    pub fn remove<C: Component>(&mut self) -> Option<C> {
        self.components.remove::<C>()
    }

    /// Returns `true` if the entity carries every listed component kind.
    #[must_use]
    pub fn has_all(&self, kinds: &[ComponentTypeId]) -> bool {
        self.components.contains_all(kinds)
    }

    pub fn add_tag(&mut self, tag: impl Into<Tag>) -> bool {
        self.tags.insert(tag.into())
    }

    #[must_use]
    pub fn has_tag(&self, tag: &Tag) -> bool {
        self.tags.contains(tag)
    }

    pub fn remove_tag(&mut self, tag: &Tag) -> bool {
        self.tags.remove(tag)
    }

    #[must_use]
    pub fn components(&self) -> &ComponentStore {
        &self.components
    }

    #[must_use]
    pub fn tags(&self) -> &TagSet {
        &self.tags
    }
}
