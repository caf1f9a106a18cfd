//! World configuration.

use serde::{Deserialize, Serialize};

/// Limits applied to the drain phases of a step.
///
/// Every field has a default, so a partial JSON object deserializes into a
/// complete config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Maximum events popped by a single event drain before it is treated
    /// as a publish cycle.
    pub max_events_per_drain: usize,
    /// Maximum commands popped by a single command drain.
    pub max_commands_per_drain: usize,
    /// Maximum event-drain/command-drain rounds per settle.
    pub max_settle_rounds: usize,
    /// Maximum nesting of `flush_now` calls.
    pub max_flush_depth: usize,
    /// Maximum `flush_now` calls within one step.
    pub max_flushes_per_step: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            max_events_per_drain: 10_000,
            max_commands_per_drain: 10_000,
            max_settle_rounds: 16,
            max_flush_depth: 4,
            max_flushes_per_step: 8,
        }
    }
}

impl WorldConfig {
    #[must_use]
    pub fn with_max_events_per_drain(mut self, limit: usize) -> Self {
        self.max_events_per_drain = limit;
        self
    }

    #[must_use]
    pub fn with_max_commands_per_drain(mut self, limit: usize) -> Self {
        self.max_commands_per_drain = limit;
        self
    }

    #[must_use]
    pub fn with_max_settle_rounds(mut self, rounds: usize) -> Self {
        self.max_settle_rounds = rounds;
        self
    }

    #[must_use]
    pub fn with_max_flush_depth(mut self, depth: usize) -> Self {
        self.max_flush_depth = depth;
        self
    }

    #[must_use]
    pub fn with_max_flushes_per_step(mut self, count: usize) -> Self {
        self.max_flushes_per_step = count;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_override_defaults() {
        let config = WorldConfig::default()
            .with_max_events_per_drain(10)
            .with_max_flush_depth(1);
        assert_eq!(config.max_events_per_drain, 10);
        assert_eq!(config.max_flush_depth, 1);
        assert_eq!(config.max_settle_rounds, 16);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: WorldConfig =
            serde_json::from_str(r#"{ "max_settle_rounds": 3 }"#).unwrap();
        assert_eq!(config.max_settle_rounds, 3);
        assert_eq!(config.max_events_per_drain, 10_000);
        assert_eq!(config.max_flushes_per_step, 8);
    }
}
