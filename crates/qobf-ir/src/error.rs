//! Error types for the IR crate.

use crate::qubit::{ClbitId, QubitId};
use thiserror::Error;

/// Errors that can occur while building or inspecting circuits.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Qubit index is outside the register.
    #[error("Qubit {qubit} out of bounds for register of size {size}{}", format_gate_context(.gate_name))]
    QubitOutOfBounds {
        /// The offending qubit.
        qubit: QubitId,
        /// Register size.
        size: u32,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Classical bit index is outside the register.
    #[error("Classical bit {clbit} out of bounds for register of size {size}")]
    ClbitOutOfBounds {
        /// The offending classical bit.
        clbit: ClbitId,
        /// Register size.
        size: u32,
    },

    /// Gate requires a different number of qubits.
    #[error("Gate '{gate_name}' requires {expected} qubits, got {got}")]
    QubitCountMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Expected number of qubits.
        expected: u32,
        /// Actual number of qubits provided.
        got: u32,
    },

    /// Gate requires a different number of angles.
    #[error("Gate '{gate_name}' requires {expected} parameters, got {got}")]
    ParameterCountMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Expected number of parameters.
        expected: usize,
        /// Actual number of parameters provided.
        got: usize,
    },

    /// Unknown gate name.
    #[error("Unknown gate: {0}")]
    UnknownGate(String),

    /// An angle does not evaluate to a finite number.
    #[error("Angle '{0}' does not evaluate to a finite value")]
    NonFiniteAngle(String),

    /// Duplicate qubit in operation.
    #[error("Duplicate qubit {qubit} in operation{}", format_gate_context(.gate_name))]
    DuplicateQubit {
        /// The duplicate qubit.
        qubit: QubitId,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Measurement operands do not pair up.
    #[error("Measurement has {qubits} qubits but {clbits} classical bits")]
    MeasureArity {
        /// Number of qubits.
        qubits: usize,
        /// Number of classical bits.
        clbits: usize,
    },

    /// Invalid DAG structure.
    #[error("Invalid DAG structure: {0}")]
    InvalidDag(String),
}

#[allow(clippy::ref_option)]
fn format_gate_context(gate_name: &Option<String>) -> String {
    match gate_name {
        Some(name) => format!(" (gate: {name})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
