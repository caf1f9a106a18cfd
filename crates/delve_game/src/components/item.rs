//! Items, carrying and level features.
//!
//! A carried item stays a live entity. Picking it up strips its
//! [`Position`](super::Position) and records its id in the carrier's
//! [`Inventory`]; dropping it restores a position.

use delve_component::{Component, EntityId};
use serde::{Deserialize, Serialize};

/// Marks an entity as something that can be picked up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
}

impl Item {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Component for Item {
    fn type_name() -> &'static str {
        "Item"
    }
}

/// Items an entity carries, and which one it has equipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub items: Vec<EntityId>,
    pub capacity: usize,
    pub equipped: Option<EntityId>,
}

impl Inventory {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity,
            equipped: None,
        }
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    #[must_use]
    pub fn contains(&self, item: EntityId) -> bool {
        self.items.contains(&item)
    }

    /// Add an item. Returns `false` when full or already carried.
    pub fn add(&mut self, item: EntityId) -> bool {
        if self.is_full() || self.contains(item) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Remove an item, unequipping it if needed. Returns `false` if it was
    /// not carried.
    pub fn take(&mut self, item: EntityId) -> bool {
        let Some(index) = self.items.iter().position(|&carried| carried == item) else {
            return false;
        };
        self.items.remove(index);
        if self.equipped == Some(item) {
            self.equipped = None;
        }
        true
    }
}

impl Component for Inventory {
    fn type_name() -> &'static str {
        "Inventory"
    }
}

/// Bonuses granted while the item is equipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Equippable {
    pub attack_bonus: i32,
    pub defense_bonus: i32,
}

impl Component for Equippable {
    fn type_name() -> &'static str {
        "Equippable"
    }
}

/// A single-use item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consumable {
    pub heal: i32,
}

impl Component for Consumable {
    fn type_name() -> &'static str {
        "Consumable"
    }
}

/// Stairs down to the next depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stairs {
    pub depth: u32,
}

impl Component for Stairs {
    fn type_name() -> &'static str {
        "Stairs"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inventory_capacity() {
        let mut inventory = Inventory::with_capacity(2);
        assert!(inventory.add(EntityId::from_raw(1)));
        assert!(!inventory.add(EntityId::from_raw(1)));
        assert!(inventory.add(EntityId::from_raw(2)));
        assert!(inventory.is_full());
        assert!(!inventory.add(EntityId::from_raw(3)));
    }

    #[test]
    fn test_take_unequips() {
        let sword = EntityId::from_raw(7);
        let mut inventory = Inventory::with_capacity(4);
        inventory.add(sword);
        inventory.equipped = Some(sword);

        assert!(inventory.take(sword));
        assert_eq!(inventory.equipped, None);
        assert!(!inventory.take(sword));
    }
}
