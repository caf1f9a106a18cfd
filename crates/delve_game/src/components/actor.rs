//! Components describing creatures: what they are called, how they look,
//! how much punishment they take and how hard they hit.

use delve_component::Component;
use serde::{Deserialize, Serialize};

/// Display name used in messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Name(pub String);

impl Name {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Component for Name {
    fn type_name() -> &'static str {
        "Name"
    }
}

/// How an entity is drawn. Higher layers are drawn over lower ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Render {
    pub glyph: char,
    pub layer: u8,
}

impl Render {
    pub const FLOOR_LAYER: u8 = 0;
    pub const ITEM_LAYER: u8 = 1;
    pub const ACTOR_LAYER: u8 = 2;

    #[must_use]
    pub const fn new(glyph: char, layer: u8) -> Self {
        Self { glyph, layer }
    }
}

impl Component for Render {
    fn type_name() -> &'static str {
        "Render"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Health {
    #[must_use]
    pub const fn full(max: i32) -> Self {
        Self { current: max, max }
    }

    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.current <= 0
    }

    /// Subtract `amount`, returning the remaining health.
    pub fn damage(&mut self, amount: i32) -> i32 {
        self.current -= amount;
        self.current
    }

    /// Restore up to `amount`, never past `max`. Returns the amount restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.current;
        self.current = (self.current + amount).min(self.max);
        self.current - before
    }
}

impl Component for Health {
    fn type_name() -> &'static str {
        "Health"
    }
}

/// Base combat statistics, before equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Combat {
    pub attack: i32,
    pub defense: i32,
}

impl Combat {
    #[must_use]
    pub const fn new(attack: i32, defense: i32) -> Self {
        Self { attack, defense }
    }
}

impl Component for Combat {
    fn type_name() -> &'static str {
        "Combat"
    }
}

/// Sight radius in cells (Chebyshev distance).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visibility {
    pub radius: i32,
}

impl Component for Visibility {
    fn type_name() -> &'static str {
        "Visibility"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_damage_and_heal() {
        let mut health = Health::full(10);
        assert_eq!(health.damage(4), 6);
        assert_eq!(health.heal(10), 4);
        assert_eq!(health.current, 10);
        assert_eq!(health.damage(12), -2);
        assert!(health.is_dead());
    }
}
