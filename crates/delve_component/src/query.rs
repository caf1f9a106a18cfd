//! Query descriptors for entity selection.
//!
//! A [`QueryDescriptor`] declares which entities a system is interested in:
//! component kinds that must be present, kinds that must be absent, and
//! tags that must be carried. Systems expose one as an advisory interest;
//! the world uses the same type for filtered queries.

use serde::{Deserialize, Serialize};

use crate::component::{Component, ComponentTypeId};
use crate::entity::Entity;
use crate::tag::Tag;

/// A filter that narrows the set of entities matched by a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryFilter {
    /// Only match entities that have this component.
    With(ComponentTypeId),
    /// Only match entities that do NOT have this component.
    Without(ComponentTypeId),
    /// Only match entities carrying this tag.
    Tagged(Tag),
}

impl QueryFilter {
    /// Returns `true` if the entity passes this filter.
    #[must_use]
    pub fn matches(&self, entity: &Entity) -> bool {
        match self {
            Self::With(kind) => entity.components().contains_kind(*kind),
            Self::Without(kind) => !entity.components().contains_kind(*kind),
            Self::Tagged(tag) => entity.has_tag(tag),
        }
    }
}

/// A conjunction of [`QueryFilter`]s.
///
/// An empty descriptor matches every entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDescriptor {
    pub filters: Vec<QueryFilter>,
}

impl QueryDescriptor {
    /// Create a new empty query descriptor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require component kind `C`.
    #[must_use]
    pub fn with<C: Component>(self) -> Self {
        self.with_kind(C::component_type_id())
    }

    /// Require a component kind by id.
    #[must_use]
    pub fn with_kind(mut self, kind: ComponentTypeId) -> Self {
        self.filters.push(QueryFilter::With(kind));
        self
    }

    /// Exclude entities carrying component kind `C`.
    #[must_use]
    pub fn without<C: Component>(mut self) -> Self {
        self.filters
            .push(QueryFilter::Without(C::component_type_id()));
        self
    }

    /// Require a tag.
    #[must_use]
    pub fn tagged(mut self, tag: impl Into<Tag>) -> Self {
        self.filters.push(QueryFilter::Tagged(tag.into()));
        self
    }

    /// Returns the component kinds that must be present.
    #[must_use]
    pub fn required_kinds(&self) -> Vec<ComponentTypeId> {
        self.filters
            .iter()
            .filter_map(|f| match f {
                QueryFilter::With(kind) => Some(*kind),
                _ => None,
            })
            .collect()
    }

    /// Returns `true` if the entity passes every filter.
    #[must_use]
    pub fn matches(&self, entity: &Entity) -> bool {
        self.filters.iter().all(|f| f.matches(entity))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}
