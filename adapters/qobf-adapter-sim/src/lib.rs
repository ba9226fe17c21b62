//! qobf Local Statevector Simulator
//!
//! Exact statevector simulation of trigger circuits, used by the guard
//! engine to prove that a synthesized trigger satisfies its branch predicate
//! before any script is written.
//!
//! # Features
//!
//! - **Exact Simulation**: full statevector, no sampling noise in
//!   `statevector()` or `outcome_distribution()`
//! - **All Standard Gates**: fast kernels for `x`, `h`, `cx`, `cz`; every
//!   other gate goes through its matrix
//! - **Reproducible Sampling**: seeded ChaCha20 stream
//! - **Terminal Measurement**: gates after a qubit's read-out are rejected
//!
//! # Performance
//!
//! | Qubits | Memory |
//! |--------|--------|
//! | 10 | ~16 KB |
//! | 16 | ~1 MB |
//! | 20 | ~16 MB |
//! | 24 | ~256 MB |
//!
//! # Example
//!
//! ```rust
//! use qobf_adapter_sim::StatevectorSimulator;
//! use qobf_hal::Simulator;
//! use qobf_ir::Circuit;
//!
//! let sim = StatevectorSimulator::new();
//! let counts = sim.sample(&Circuit::bell().unwrap(), 1000).unwrap();
//! assert_eq!(counts.get("01") + counts.get("10"), 0);
//! ```

mod simulator;
mod statevector;

pub use simulator::StatevectorSimulator;
pub use statevector::Statevector;
