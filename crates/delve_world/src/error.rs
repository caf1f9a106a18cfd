//! World-level error types.

use std::fmt;

use crate::command::CommandKind;
use crate::event::EventKind;

/// The hook of a system that was running when a fault occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// `System::update` during the scheduler pass.
    Update,
    /// `System::on_event` during an event drain.
    Event,
    /// `System::on_command` during a command drain.
    Command,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Update => f.write_str("update"),
            Self::Event => f.write_str("event handling"),
            Self::Command => f.write_str("command handling"),
        }
    }
}

/// Errors that abort a step.
///
/// Stale entity references and unknown event/command kinds are not errors;
/// they are logged and skipped.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A system hook returned an error.
    #[error("system `{system}` failed during {phase}")]
    SystemFault {
        system: String,
        phase: Phase,
        #[source]
        source: anyhow::Error,
    },

    /// More events were drained than the configured cap allows.
    #[error("event drain exceeded {limit} events (last kind `{kind}`); a handler is republishing unconditionally")]
    EventStorm { limit: usize, kind: EventKind },

    /// More commands were drained than the configured cap allows.
    #[error("command drain exceeded {limit} commands (last kind `{kind}`)")]
    CommandStorm { limit: usize, kind: CommandKind },

    /// Events and commands kept producing each other past the round limit.
    #[error("step did not settle after {rounds} drain rounds")]
    Unsettled { rounds: usize },

    /// `flush_now` was nested deeper than allowed.
    #[error("flush_now nested deeper than {limit} levels")]
    FlushDepthExceeded { limit: usize },

    /// `flush_now` was called too many times within one step.
    #[error("flush_now called more than {limit} times in one step")]
    FlushBudgetExhausted { limit: usize },
}

impl WorldError {
    /// Returns the name of the faulting system, if this is a system fault.
    #[must_use]
    pub fn system(&self) -> Option<&str> {
        match self {
            Self::SystemFault { system, .. } => Some(system.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_fault_display_and_source() {
        let err = WorldError::SystemFault {
            system: "combat".to_string(),
            phase: Phase::Command,
            source: anyhow::anyhow!("target has no health"),
        };
        assert_eq!(err.to_string(), "system `combat` failed during command handling");
        assert_eq!(err.system(), Some("combat"));
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("target has no health"));
    }

    #[test]
    fn test_event_storm_names_kind() {
        let err = WorldError::EventStorm {
            limit: 5,
            kind: EventKind::new("ping"),
        };
        assert!(err.to_string().contains("`ping`"));
        assert_eq!(err.system(), None);
    }
}
