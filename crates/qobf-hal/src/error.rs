//! Error types for the HAL crate.

use thiserror::Error;

/// Errors that can occur while simulating a circuit.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HalError {
    /// Invalid circuit.
    #[error("Invalid circuit: {0}")]
    InvalidCircuit(String),

    /// Circuit exceeds simulator capabilities.
    #[error("Circuit exceeds simulator capabilities: {0}")]
    CircuitTooLarge(String),

    /// Unsupported feature.
    #[error("Unsupported feature: {0}")]
    Unsupported(String),

    /// Invalid number of shots.
    #[error("Invalid shots: {0}")]
    InvalidShots(String),

    /// IR error while building gate matrices.
    #[error("Circuit error: {0}")]
    Ir(#[from] qobf_ir::IrError),
}

/// Result type for HAL operations.
pub type HalResult<T> = Result<T, HalError>;
