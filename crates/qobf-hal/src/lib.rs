//! qobf Simulation Abstraction
//!
//! The guard engine never simulates circuits itself. It asks a
//! [`Simulator`] for the final statevector or for sampled [`Counts`], and
//! checks its branch predicates against the answer. The statevector
//! implementation lives in `qobf-adapter-sim`.
//!
//! # Bit Order
//!
//! Amplitude index bit `k` is qubit `k`. Classical outcomes are bitstrings in
//! Qiskit order, with classical bit 0 as the rightmost character, which is
//! also the order the generated Python guards compare against.
//!
//! # Implementing a Simulator
//!
//! ```ignore
//! use qobf_hal::{Counts, HalResult, Simulator};
//! use qobf_ir::Circuit;
//! use num_complex::Complex64;
//!
//! struct Oracle;
//!
//! impl Simulator for Oracle {
//!     fn name(&self) -> &str { "oracle" }
//!     fn max_qubits(&self) -> u32 { 16 }
//!     fn statevector(&self, circuit: &Circuit) -> HalResult<Vec<Complex64>> {
//!         # todo!()
//!     }
//!     fn sample(&self, circuit: &Circuit, shots: u32) -> HalResult<Counts> {
//!         # todo!()
//!     }
//! }
//! ```

pub mod error;
pub mod result;
pub mod simulator;

pub use error::{HalError, HalResult};
pub use result::{Counts, outcome_to_bitstring};
pub use simulator::{
    PROBABILITY_EPSILON, Simulator, classical_distribution, classical_value, measurement_map,
};
