//! Error types for guard synthesis.

use thiserror::Error;

use qobf_compile::ValidationError;

/// Errors that can occur while building or checking a guard.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GuardError {
    /// The guard spec failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The parameters are valid on their own but the trigger cannot be built
    /// from them.
    #[error("Guard '{algorithm}' cannot be built: {requirement}")]
    Structural {
        algorithm: &'static str,
        requirement: String,
    },

    /// The trigger can produce an outcome on which the payload would not run.
    #[error(
        "Trigger for '{algorithm}' yields '{outcome}' with probability {probability:.3}, which skips the payload"
    )]
    TriggerMismatch {
        algorithm: &'static str,
        outcome: String,
        probability: f64,
    },

    /// The simulator could not run the trigger.
    #[error("Simulation failed: {0}")]
    Simulation(#[from] qobf_hal::HalError),

    /// Error from the IR crate.
    #[error("IR error: {0}")]
    Ir(#[from] qobf_ir::IrError),
}

/// Result type for guard operations.
pub type GuardResult<T> = Result<T, GuardError>;
