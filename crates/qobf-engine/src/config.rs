//! Orchestrator limits and switches.

use serde::{Deserialize, Serialize};

/// Settings for one orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Circuits wider than this are rejected
    #[serde(default = "default_max_qubits")]
    pub max_qubits: usize,

    /// Circuits deeper than this only produce a warning
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Check each layer's unitary against its input
    #[serde(default = "default_true")]
    pub verify_equivalence: bool,

    /// Simulate guard triggers before wrapping
    #[serde(default = "default_true")]
    pub verify_triggers: bool,
}

fn default_max_qubits() -> usize {
    30
}

fn default_max_depth() -> usize {
    1000
}

fn default_true() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_qubits: default_max_qubits(),
            max_depth: default_max_depth(),
            verify_equivalence: true,
            verify_triggers: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: EngineConfig = serde_yaml_ng::from_str("max_depth: 50\n").unwrap();
        assert_eq!(config.max_depth, 50);
        assert_eq!(config.max_qubits, 30);
        assert!(config.verify_equivalence);
    }
}
