//! Per-entity, type-keyed component storage.
//!
//! A [`ComponentStore`] holds at most one value per [`ComponentTypeId`].
//! Lookups are keyed by the kind's hashed name and then downcast to the
//! concrete type, so a typed read either yields the requested type or
//! nothing.

use std::collections::HashMap;
use std::fmt;

use crate::component::{Component, ComponentTypeId, ErasedComponent};

/// Type-keyed heterogeneous map of components for one entity.
#[derive(Default)]
pub struct ComponentStore {
    components: HashMap<ComponentTypeId, Box<dyn ErasedComponent>>,
}

impl ComponentStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a component, returning the previous value of the same kind.
    pub fn insert<C: Component>(&mut self, component: C) -> Option<C> {
        let previous = self
            .components
            .insert(C::component_type_id(), Box::new(component))?;
        downcast_owned::<C>(previous)
    }

    /// Returns a reference to the component of kind `C`, if present.
    #[must_use]
    pub fn get<C: Component>(&self) -> Option<&C> {
        let stored = self.components.get(&C::component_type_id())?;
        let value = stored.as_any().downcast_ref::<C>();
        debug_assert!(
            value.is_some(),
            "component kind `{}` is stored as `{}`; two component types share a name",
            C::type_name(),
            stored.kind_name()
        );
        value
    }

    /// Returns a mutable reference to the component of kind `C`, if present.
    #[must_use]
    pub fn get_mut<C: Component>(&mut self) -> Option<&mut C> {
        let stored = self.components.get_mut(&C::component_type_id())?;
        let stored_name = stored.kind_name();
        let value = stored.as_any_mut().downcast_mut::<C>();
        debug_assert!(
            value.is_some(),
            "component kind `{}` is stored as `{}`; two component types share a name",
            C::type_name(),
            stored_name
        );
        value
    }

    /// Remove and return the component of kind `C`.
    pub fn remove<C: Component>(&mut self) -> Option<C> {
        let stored = self.components.remove(&C::component_type_id())?;
        downcast_owned::<C>(stored)
    }

    /// Returns `true` if a component of kind `C` is present.
    #[must_use]
    pub fn contains<C: Component>(&self) -> bool {
        self.contains_kind(C::component_type_id())
    }

    /// Returns `true` if a component of the given kind is present.
    #[must_use]
    pub fn contains_kind(&self, kind: ComponentTypeId) -> bool {
        self.components.contains_key(&kind)
    }

    /// Returns `true` if every listed kind is present.
    #[must_use]
    pub fn contains_all(&self, kinds: &[ComponentTypeId]) -> bool {
        kinds.iter().all(|kind| self.contains_kind(*kind))
    }

    /// Iterate over the kinds present, in unspecified order.
    pub fn kinds(&self) -> impl Iterator<Item = ComponentTypeId> + '_ {
        self.components.keys().copied()
    }

    /// Names of the kinds present, sorted. Intended for diagnostics.
    #[must_use]
    pub fn kind_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.components.values().map(|c| c.kind_name()).collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl fmt::Debug for ComponentStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.components.values()).finish()
    }
}

fn downcast_owned<C: Component>(stored: Box<dyn ErasedComponent>) -> Option<C> {
    let stored_name = stored.kind_name();
    match stored.into_any().downcast::<C>() {
        Ok(value) => Some(*value),
        Err(_) => {
            debug_assert!(
                false,
                "component kind `{}` is stored as `{}`; two component types share a name",
                C::type_name(),
                stored_name
            );
            None
        }
    }
}
