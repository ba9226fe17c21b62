//! Configuration for the qobf CLI.
//!
//! Values come from, highest precedence first:
//! 1. Environment variables (`QOBF_` prefix)
//! 2. The YAML file given by `--config`, or `~/.config/qobf/config.yaml`
//! 3. Defaults

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use qobf_engine::EngineConfig;

/// Log levels accepted in `logging.level`.
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Complete CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Orchestrator limits and switches
    #[serde(default)]
    pub engine: EngineConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Level used when no `-v` flag is given
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(format!("{}: {e}", path.as_ref().display())))?;

        let config: Config = serde_yaml_ng::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Default config file location.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("qobf").join("config.yaml"))
    }

    /// Load the file (explicit, else the default location if present), then
    /// apply environment overrides.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(path)?,
                None => Config::default(),
            },
        };

        config = config.merge_env();

        config.validate()?;
        Ok(config)
    }

    /// Merge environment variables into this configuration. Unset or
    /// unparsable variables leave the field unchanged.
    fn merge_env(mut self) -> Self {
        if let Ok(v) = std::env::var("QOBF_MAX_QUBITS") {
            if let Ok(val) = v.parse() {
                self.engine.max_qubits = val;
            }
        }
        if let Ok(v) = std::env::var("QOBF_MAX_DEPTH") {
            if let Ok(val) = v.parse() {
                self.engine.max_depth = val;
            }
        }
        if let Ok(v) = std::env::var("QOBF_LOG_LEVEL") {
            self.logging.level = v.to_lowercase();
        }
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.max_qubits == 0 {
            return Err(ConfigError::ValidationError(
                "engine.max_qubits must be at least 1".into(),
            ));
        }
        if self.engine.max_depth == 0 {
            return Err(ConfigError::ValidationError(
                "engine.max_depth must be at least 1".into(),
            ));
        }
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "Unknown log level '{}' (expected one of {})",
                self.logging.level,
                LOG_LEVELS.join(", ")
            )));
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
