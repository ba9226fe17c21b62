//! Error types for the circuit format readers.

use thiserror::Error;

/// Errors that can occur while reading or writing a circuit description.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// Lexer error (invalid token).
    #[error("Lexer error at position {position}: {message}")]
    LexerError { position: usize, message: String },

    /// Unexpected token.
    #[error("Unexpected token at line {line}: expected {expected}, found {found}")]
    UnexpectedToken {
        line: usize,
        expected: String,
        found: String,
    },

    /// Unexpected end of input.
    #[error("Unexpected end of input: {0}")]
    UnexpectedEof(String),

    /// Invalid version.
    #[error("Invalid OPENQASM version: {0}")]
    InvalidVersion(String),

    /// Undefined register.
    #[error("Undefined register: {0}")]
    UndefinedRegister(String),

    /// Duplicate declaration.
    #[error("Duplicate declaration: {0}")]
    DuplicateDeclaration(String),

    /// Register operands of different sizes in one broadcast statement.
    #[error("Register size mismatch in '{statement}': {left} vs {right}")]
    BroadcastMismatch {
        statement: String,
        left: usize,
        right: usize,
    },

    /// Index out of bounds.
    #[error("Index {index} out of bounds for register '{register}' of size {size}")]
    IndexOutOfBounds {
        register: String,
        index: usize,
        size: usize,
    },

    /// A language feature the circuit model cannot represent.
    #[error("Unsupported at line {line}: {feature}")]
    Unsupported { line: usize, feature: String },

    /// The Python source has no `QuantumCircuit(...)` construction.
    #[error("No QuantumCircuit construction found in Python source")]
    MissingCircuit,

    /// IR error during circuit construction.
    #[error("Circuit error: {0}")]
    CircuitError(#[from] qobf_ir::IrError),

    /// JSON encoding or decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;
