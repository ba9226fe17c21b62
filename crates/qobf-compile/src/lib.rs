//! qobf Circuit Obfuscation
//!
//! This crate rewrites quantum circuits into longer, harder-to-read circuits
//! with the same unitary up to global phase. It provides the exact gate
//! algebra the rewrites are built from, four obfuscation passes, and a
//! pipeline that layers them.
//!
//! # Architecture
//!
//! ```text
//! "inverse:density=0.5" ─→ RawAlgorithmSpec ─→ AlgorithmSpec ─┐
//!                                                             ▼
//! Input Circuit ───────────────────────────────────────→ LayerPlan
//!                                                             │
//!       ├── seed = Keccak256(algorithm, params, circuit)      │
//!       ├── Pass::run (CloakedGates / InverseGates /          │
//!       │             DelayedGates / CompositeGates)          │
//!       └── verify_equivalence ── EquivalencePreservationFailure
//!                                                             │
//!                                                             ▼
//!                                                   Output Circuit
//! ```
//!
//! # Example
//!
//! ```rust
//! use qobf_compile::{LayerPlan, NullSink};
//! use qobf_ir::Circuit;
//!
//! let circuit = Circuit::bell().unwrap();
//! let plan = LayerPlan::parse(["inverse:density=1.0", "cloaked"]).unwrap();
//! let obfuscated = plan.apply(&circuit, &mut NullSink).unwrap();
//!
//! assert!(obfuscated.depth() > circuit.depth());
//! assert_eq!(obfuscated.num_qubits(), circuit.num_qubits());
//! ```
//!
//! # Algorithms
//!
//! | Name | Parameters | Effect |
//! |------|------------|--------|
//! | `cloaked` | `probability` (0.5) | substitute gates in place |
//! | `inverse` | `density` (0.3), `level` (light) | add `g, g†` pairs and noise |
//! | `delayed` | `probability` (0.5) | identity sequences on the critical path |
//! | `composite` | `density` (0.2) | register-wide identity blocks |
//!
//! All of them also take `seed`, mixed into the derived seed.

pub mod algebra;
pub mod algorithm;
pub mod error;
pub mod events;
pub mod noise;
pub mod pass;
pub mod passes;
pub mod pipeline;
pub mod seed;
pub mod spec;
pub mod unitary;

pub use algorithm::AlgorithmSpec;
pub use error::{CompileError, CompileResult, ValidationError};
pub use events::{EventSink, NullSink, ObfuscationEvent, RecordingSink};
pub use noise::NoiseLevel;
pub use pass::Pass;
pub use pipeline::LayerPlan;
pub use spec::{ParamReader, RawAlgorithmSpec};
pub use unitary::{Verification, verify_equivalence};
