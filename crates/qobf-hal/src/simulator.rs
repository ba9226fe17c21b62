//! The simulation capability.
//!
//! ```text
//!   statevector() ──→ outcome_distribution() ──→ predicate checks
//!        │
//!        └──────────→ sample(shots) ──→ Counts
//! ```
//!
//! Measurements are treated as terminal: the simulated state is the state
//! just before read-out, and each `measure q -> c` maps qubit `q`'s basis bit
//! onto classical bit `c`. Implementations reject gates that act on a qubit
//! after it has been measured.

use num_complex::Complex64;
use qobf_ir::{Circuit, InstructionKind};
use rustc_hash::FxHashMap;

use crate::error::HalResult;
use crate::result::{Counts, outcome_to_bitstring};

/// Probabilities below this are treated as exactly zero.
pub const PROBABILITY_EPSILON: f64 = 1e-12;

/// A simulator the guard engine can ask for trigger outcomes.
pub trait Simulator: Send + Sync {
    /// Simulator name, for logs.
    fn name(&self) -> &str;

    /// Largest register this simulator accepts.
    fn max_qubits(&self) -> u32;

    /// Amplitudes of the final state, indexed with qubit `k` as bit `k`.
    fn statevector(&self, circuit: &Circuit) -> HalResult<Vec<Complex64>>;

    /// Sample `shots` read-outs of the classical register.
    fn sample(&self, circuit: &Circuit, shots: u32) -> HalResult<Counts>;

    /// Exact probability of every reachable classical outcome, sorted by
    /// bitstring.
    fn outcome_distribution(&self, circuit: &Circuit) -> HalResult<Vec<(String, f64)>> {
        let amplitudes = self.statevector(circuit)?;
        Ok(classical_distribution(circuit, &amplitudes))
    }
}

/// For each classical bit, the qubit last measured into it.
pub fn measurement_map(circuit: &Circuit) -> Vec<Option<usize>> {
    let mut map = vec![None; circuit.num_clbits()];
    for instruction in circuit.instructions() {
        if matches!(instruction.kind, InstructionKind::Measure) {
            for (q, c) in instruction.qubits.iter().zip(&instruction.clbits) {
                map[c.index()] = Some(q.index());
            }
        }
    }
    map
}

/// Classical register value read out from basis state `basis`.
pub fn classical_value(map: &[Option<usize>], basis: usize) -> usize {
    map.iter().enumerate().fold(0, |acc, (clbit, qubit)| match qubit {
        Some(q) if (basis >> q) & 1 == 1 => acc | (1 << clbit),
        _ => acc,
    })
}

/// Fold basis-state probabilities into classical-outcome probabilities.
pub fn classical_distribution(circuit: &Circuit, amplitudes: &[Complex64]) -> Vec<(String, f64)> {
    let map = measurement_map(circuit);
    let mut distribution: FxHashMap<usize, f64> = FxHashMap::default();
    for (basis, amplitude) in amplitudes.iter().enumerate() {
        let p = amplitude.norm_sqr();
        if p > PROBABILITY_EPSILON {
            *distribution.entry(classical_value(&map, basis)).or_insert(0.0) += p;
        }
    }
    let mut outcomes: Vec<_> = distribution
        .into_iter()
        .map(|(value, p)| (outcome_to_bitstring(value, map.len()), p))
        .collect();
    outcomes.sort_by(|a, b| a.0.cmp(&b.0));
    outcomes
}
