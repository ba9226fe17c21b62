//! qobf Circuit Data Model
//!
//! The value types every other qobf crate passes around: qubit indices,
//! gates with exact angle expressions, instructions, and [`Circuit`], an
//! ordered instruction list over a fixed-size register.
//!
//! # Example: Building a Bell State
//!
//! ```rust
//! use qobf_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("bell_state", 2, 2);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//! circuit.measure_all().unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.depth(), 3);
//! ```
//!
//! # Example: Exact Angles
//!
//! ```rust
//! use qobf_ir::{Angle, StandardGate};
//!
//! let theta = Angle::pi_over(4);
//! let inverse = StandardGate::Rz(theta.negated());
//! assert_eq!(inverse.angles()[0].to_string(), "-(pi/4)");
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Description |
//! |------|--------|-------------|
//! | `id`, `x`, `y`, `z` | 1 | Identity and Pauli gates |
//! | `h`, `s`, `sdg`, `t`, `tdg`, `sx`, `sxdg` | 1 | Clifford+T gates |
//! | `rx`, `ry`, `rz`, `p`, `u` | 1 | Rotations and the universal gate |
//! | `cx`, `cy`, `cz`, `swap` | 2 | Controlled Paulis and SWAP |
//! | `cp`, `crz`, `rzz` | 2 | Parameterized two-qubit gates |
//! | `ccx` | 3 | Toffoli |

pub mod angle;
pub mod circuit;
pub mod dag;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod qubit;

pub use angle::Angle;
pub use circuit::Circuit;
pub use dag::CircuitDag;
pub use error::{IrError, IrResult};
pub use gate::StandardGate;
pub use instruction::{Instruction, InstructionKind};
pub use qubit::{ClbitId, QubitId};
