//! Error types for the orchestrator.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that end an invocation in the `Failed` state.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EngineError {
    /// A spec or a limit was rejected.
    #[error(transparent)]
    Validation(#[from] qobf_compile::ValidationError),

    /// The layer plan could not be built or run.
    #[error(transparent)]
    Compile(#[from] qobf_compile::CompileError),

    /// The guard could not be built or verified.
    #[error(transparent)]
    Guard(#[from] qobf_guard::GuardError),

    /// The input circuit could not be read or the output not rendered.
    #[error("{}: {source}", path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: qobf_qasm::ParseError,
    },

    /// No circuit format is known for this file extension.
    #[error("Unsupported circuit file '{}' (expected .qasm, .py or .json)", path.display())]
    UnsupportedFormat { path: PathBuf },

    /// Classical mode needs a guard algorithm.
    #[error("No algorithm given")]
    NoAlgorithm,

    /// Writing the output failed. No partial file is left behind.
    #[error("Failed to write '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The orchestrator was driven out of order.
    #[error("Invalid state transition {from} -> {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },
}

/// Result type for orchestrator operations.
pub type EngineResult<T> = Result<T, EngineError>;
