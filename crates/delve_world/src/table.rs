//! Entity table, the single owner of every live entity.
//!
//! Entities are kept in insertion order. Removal preserves the relative
//! order of the remaining entities, so repeated queries over an unmutated
//! table return identical sequences.

use delve_component::{ComponentTypeId, Entity, EntityAllocator, EntityId, QueryDescriptor, Tag};
use indexmap::IndexMap;

/// Insertion-ordered storage of live entities keyed by id.
#[derive(Debug, Default)]
pub struct EntityTable {
    /// Entity ID allocator.
    allocator: EntityAllocator,
    /// Live entities in insertion order.
    entities: IndexMap<EntityId, Entity>,
}

impl EntityTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh, detached entity. It is not live until inserted.
    pub fn create(&mut self) -> Entity {
        Entity::new(self.allocator.allocate())
    }

    /// Insert an entity, returning the entity it replaced if the id was
    /// already live. A replaced entity keeps its position in the order.
    pub fn insert(&mut self, entity: Entity) -> Option<Entity> {
        let id = entity.id();
        debug_assert!(id.is_valid(), "cannot insert an entity with the invalid id");
        self.allocator.observe(id);
        self.entities.insert(id, entity)
    }

    /// Remove an entity. Removing an id that is not live returns `None`.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.shift_remove(&id)
    }

    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    #[must_use]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Number of ids handed out so far, including removed entities.
    #[must_use]
    pub fn allocated(&self) -> u64 {
        self.allocator.count()
    }

    /// Iterate over live entities in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Ids of entities carrying every listed kind, in insertion order.
    /// An empty kind list selects every entity.
    #[must_use]
    pub fn query(&self, kinds: &[ComponentTypeId]) -> Vec<EntityId> {
        self.query_iter(kinds).map(Entity::id).collect()
    }

    /// Borrowing form of [`EntityTable::query`].
    pub fn query_iter<'a>(
        &'a self,
        kinds: &'a [ComponentTypeId],
    ) -> impl Iterator<Item = &'a Entity> + 'a {
        self.entities
            .values()
            .filter(move |entity| entity.has_all(kinds))
    }

    /// Ids of entities matching a descriptor, in insertion order.
    #[must_use]
    pub fn query_with(&self, query: &QueryDescriptor) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|entity| query.matches(entity))
            .map(Entity::id)
            .collect()
    }

    /// Ids of entities carrying a tag, in insertion order.
    #[must_use]
    pub fn tagged(&self, tag: &Tag) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|entity| entity.has_tag(tag))
            .map(Entity::id)
            .collect()
    }

    /// Remove every entity. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.entities.len();
        self.entities.clear();
        removed
    }
}
