//! Orchestrator modes and states.

use std::fmt;
use std::path::PathBuf;

/// What kind of artifact is being transformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Rewrite a circuit through the layer plan.
    Quantum,
    /// Wrap a Python script in a quantum guard.
    Classical,
}

impl Mode {
    /// Mode name.
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Quantum => "quantum",
            Mode::Classical => "classical",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of one invocation.
///
/// ```text
/// Idle → ModeSelected → AlgorithmsResolved → Transformed → Written
///   └──────────┴──────────────┴──────────────────┴──→ Failed
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineState {
    /// Nothing has happened yet.
    Idle,
    /// The mode is known.
    ModeSelected { mode: Mode },
    /// Every algorithm spec resolved and validated.
    AlgorithmsResolved { mode: Mode, algorithms: Vec<String> },
    /// The artifact was transformed and rendered.
    Transformed { mode: Mode, bytes: usize },
    /// The output was written.
    Written { path: PathBuf, bytes: usize },
    /// The invocation failed. Nothing was written.
    Failed { reason: String },
}

impl EngineState {
    /// State name.
    pub fn name(&self) -> &'static str {
        match self {
            EngineState::Idle => "Idle",
            EngineState::ModeSelected { .. } => "ModeSelected",
            EngineState::AlgorithmsResolved { .. } => "AlgorithmsResolved",
            EngineState::Transformed { .. } => "Transformed",
            EngineState::Written { .. } => "Written",
            EngineState::Failed { .. } => "Failed",
        }
    }

    /// Check if the state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, EngineState::Written { .. } | EngineState::Failed { .. })
    }

    /// Check if the invocation succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, EngineState::Written { .. })
    }

    /// Check if `next` may follow this state.
    pub fn can_advance_to(&self, next: &EngineState) -> bool {
        match (self, next) {
            (from, EngineState::Failed { .. }) => !from.is_terminal(),
            (EngineState::Idle, EngineState::ModeSelected { .. })
            | (EngineState::ModeSelected { .. }, EngineState::AlgorithmsResolved { .. })
            | (EngineState::AlgorithmsResolved { .. }, EngineState::Transformed { .. })
            | (EngineState::Transformed { .. }, EngineState::Written { .. }) => true,
            _ => false,
        }
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineState::Failed { reason } => write!(f, "Failed: {reason}"),
            EngineState::Written { path, bytes } => {
                write!(f, "Written: {} ({bytes} bytes)", path.display())
            }
            other => f.write_str(other.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_path() {
        let states = [
            EngineState::Idle,
            EngineState::ModeSelected { mode: Mode::Quantum },
            EngineState::AlgorithmsResolved {
                mode: Mode::Quantum,
                algorithms: vec!["cloaked".into()],
            },
            EngineState::Transformed {
                mode: Mode::Quantum,
                bytes: 10,
            },
            EngineState::Written {
                path: "a.qasm".into(),
                bytes: 10,
            },
        ];
        for pair in states.windows(2) {
            assert!(pair[0].can_advance_to(&pair[1]), "{} -> {}", pair[0], pair[1]);
        }
        assert!(states[4].is_terminal());
        assert!(states[4].is_success());
    }

    #[test]
    fn test_no_skipping() {
        let idle = EngineState::Idle;
        let transformed = EngineState::Transformed {
            mode: Mode::Classical,
            bytes: 1,
        };
        assert!(!idle.can_advance_to(&transformed));
    }

    #[test]
    fn test_failed_from_any_live_state() {
        let failed = EngineState::Failed {
            reason: "x".into(),
        };
        assert!(EngineState::Idle.can_advance_to(&failed));
        assert!(EngineState::ModeSelected { mode: Mode::Classical }.can_advance_to(&failed));
        assert!(!failed.can_advance_to(&failed));
        assert_eq!(failed.to_string(), "Failed: x");
    }
}
