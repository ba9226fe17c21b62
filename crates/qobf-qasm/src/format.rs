//! Circuit file formats, selected by file extension.

use std::fmt;
use std::path::Path;

use qobf_ir::Circuit;

use crate::error::ParseResult;
use crate::{emit_python, emit_qasm2, parse, parse_python};

/// External circuit notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitFormat {
    /// `OpenQASM` 2.0 (`.qasm`).
    Qasm2,
    /// Python builder script (`.py`).
    Python,
    /// serde JSON of the circuit model (`.json`).
    Json,
}

impl CircuitFormat {
    /// Pick the format from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "qasm" | "qasm2" => Some(Self::Qasm2),
            "py" => Some(Self::Python),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Read a circuit in this format.
    pub fn parse(self, source: &str) -> ParseResult<Circuit> {
        match self {
            Self::Qasm2 => parse(source),
            Self::Python => parse_python(source),
            Self::Json => Ok(serde_json::from_str(source)?),
        }
    }

    /// Write a circuit in this format.
    pub fn emit(self, circuit: &Circuit) -> ParseResult<String> {
        match self {
            Self::Qasm2 => Ok(emit_qasm2(circuit)),
            Self::Python => Ok(emit_python(circuit)),
            Self::Json => Ok(serde_json::to_string_pretty(circuit)?),
        }
    }
}

impl fmt::Display for CircuitFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Qasm2 => write!(f, "OpenQASM 2.0"),
            Self::Python => write!(f, "Python"),
            Self::Json => write!(f, "JSON"),
        }
    }
}
