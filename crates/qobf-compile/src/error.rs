//! Error types for the obfuscation crate.

use thiserror::Error;

/// A rejected algorithm spec. Always raised before any circuit is touched.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ValidationError {
    /// The spec text does not follow `name[:key=value,...]`.
    #[error("Malformed algorithm spec '{spec}': {reason}")]
    MalformedSpec { spec: String, reason: String },

    /// No algorithm with this name exists in the selected mode.
    #[error("Unknown algorithm '{name}' (available: {available})")]
    UnknownAlgorithm { name: String, available: String },

    /// The algorithm does not take this parameter.
    #[error("Unknown parameter '{key}' for algorithm '{algorithm}'")]
    UnknownParameter { algorithm: String, key: String },

    /// The same parameter was given twice.
    #[error("Parameter '{key}' given more than once for algorithm '{algorithm}'")]
    DuplicateParameter { algorithm: String, key: String },

    /// The value does not parse as the parameter's type.
    #[error("Invalid value '{value}' for '{algorithm}.{key}': expected {expected}")]
    InvalidValue {
        algorithm: String,
        key: String,
        value: String,
        expected: String,
    },

    /// The value parses but lies outside the allowed range.
    #[error("Value {value} for '{algorithm}.{key}' is out of range {range}")]
    OutOfRange {
        algorithm: String,
        key: String,
        value: String,
        range: String,
    },

    /// The circuit is larger than the configured limit.
    #[error("Circuit has {qubits} qubits, limit is {limit}")]
    TooManyQubits { qubits: usize, limit: usize },
}

/// Errors that can occur while obfuscating a circuit.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// A stage of the layer plan failed validation.
    #[error("Stage {index}: {source}")]
    InvalidStage {
        index: usize,
        #[source]
        source: ValidationError,
    },

    /// A spec failed validation outside of a layer plan.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A rewrite changed the circuit's unitary. Never expected; the output is
    /// discarded.
    #[error("Stage {index} ('{algorithm}') broke circuit equivalence: {detail}")]
    EquivalencePreservationFailure {
        index: usize,
        algorithm: String,
        detail: String,
    },

    /// Error from the IR crate.
    #[error("IR error: {0}")]
    Ir(#[from] qobf_ir::IrError),

    /// The circuit could not be fingerprinted for seeding.
    #[error("Failed to serialize circuit: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for obfuscation operations.
pub type CompileResult<T> = Result<T, CompileError>;
