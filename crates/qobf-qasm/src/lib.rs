//! Circuit formats for qobf
//!
//! Readers and writers for the notations circuits travel in: `OpenQASM` 2.0,
//! Qiskit-style Python builder scripts, and JSON. Angle expressions pass
//! through unevaluated, so `rz(pi/4)` is written back as `rz(pi/4)`.
//!
//! # Supported `OpenQASM` 2.0
//!
//! | Feature | Status | Example |
//! |---------|--------|---------|
//! | Version declaration | ✅ | `OPENQASM 2.0;` |
//! | Register declarations | ✅ | `qreg q[5];`, `creg c[5];` |
//! | Standard gates | ✅ | `h q[0];`, `cx q[0], q[1];` |
//! | Parameterized gates | ✅ | `rz(-pi/4) q[0];` |
//! | Broadcasting | ✅ | `h q;`, `measure q -> c;` |
//! | Barriers, reset | ✅ | `barrier q;`, `reset q[0];` |
//! | Custom `gate` definitions | ❌ | |
//! | `if` statements | ❌ | |
//!
//! # Example: Round-Trip
//!
//! ```rust
//! use qobf_qasm::{emit_qasm2, parse};
//!
//! let original = r#"
//! OPENQASM 2.0;
//! include "qelib1.inc";
//! qreg q[3];
//! h q[0];
//! cx q[0], q[1];
//! rz(pi/8) q[2];
//! "#;
//!
//! let circuit = parse(original).unwrap();
//! let emitted = emit_qasm2(&circuit);
//! assert!(emitted.contains("rz(pi/8) q[2];"));
//!
//! let reparsed = parse(&emitted).unwrap();
//! assert_eq!(circuit.instructions(), reparsed.instructions());
//! ```
//!
//! # Example: Python Builder
//!
//! ```rust
//! use qobf_ir::Circuit;
//! use qobf_qasm::emit_python;
//!
//! let script = emit_python(&Circuit::bell().unwrap());
//! assert!(script.contains("def build_obfuscated_circuit():"));
//! assert!(script.contains("qc.cx(0, 1)"));
//! ```

mod emitter;
mod error;
mod format;
mod lexer;
mod parser;
mod python;

pub use emitter::emit_qasm2;
pub use error::{ParseError, ParseResult};
pub use format::CircuitFormat;
pub use parser::parse;
pub use python::{BUILDER_FN, emit_python, emit_python_calls, parse_python, python_string};
