//! Simulator implementation.

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::{debug, instrument};

use num_complex::Complex64;
use qobf_hal::{
    Counts, HalError, HalResult, Simulator, classical_value, measurement_map, outcome_to_bitstring,
};
use qobf_ir::Circuit;

use crate::statevector::Statevector;

/// Default sampling seed.
const DEFAULT_SEED: u64 = 0x5eed_0b5f;

/// Local statevector simulator.
///
/// Sampling draws from a ChaCha20 stream seeded at construction, so two
/// `sample` calls with the same circuit and shot count return the same
/// counts.
#[derive(Debug, Clone)]
pub struct StatevectorSimulator {
    /// Maximum number of qubits supported.
    max_qubits: u32,
    /// Seed for measurement sampling.
    seed: u64,
}

impl StatevectorSimulator {
    /// Create a new simulator with default settings.
    pub fn new() -> Self {
        Self {
            max_qubits: 24,
            seed: DEFAULT_SEED,
        }
    }

    /// Create a simulator with custom max qubits.
    pub fn with_max_qubits(max_qubits: u32) -> Self {
        Self {
            max_qubits,
            ..Self::new()
        }
    }

    /// Use a different sampling seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn run(&self, circuit: &Circuit) -> HalResult<Statevector> {
        if circuit.num_qubits() > self.max_qubits as usize {
            return Err(HalError::CircuitTooLarge(format!(
                "Circuit has {} qubits but simulator only supports {}",
                circuit.num_qubits(),
                self.max_qubits
            )));
        }

        let mut sv = Statevector::new(circuit.num_qubits());
        for instruction in circuit.instructions() {
            sv.apply(instruction)?;
        }
        Ok(sv)
    }
}

impl Default for StatevectorSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulator for StatevectorSimulator {
    fn name(&self) -> &str {
        "statevector"
    }

    fn max_qubits(&self) -> u32 {
        self.max_qubits
    }

    #[instrument(skip(self, circuit), fields(qubits = circuit.num_qubits()))]
    fn statevector(&self, circuit: &Circuit) -> HalResult<Vec<Complex64>> {
        debug!("Simulating {} instructions", circuit.len());
        Ok(self.run(circuit)?.into_amplitudes())
    }

    #[instrument(skip(self, circuit), fields(qubits = circuit.num_qubits()))]
    fn sample(&self, circuit: &Circuit, shots: u32) -> HalResult<Counts> {
        if shots == 0 {
            return Err(HalError::InvalidShots("shots must be positive".into()));
        }

        let sv = self.run(circuit)?;
        let map = measurement_map(circuit);
        let mut rng = ChaCha20Rng::seed_from_u64(self.seed);
        let mut counts = Counts::new();

        for _ in 0..shots {
            let basis = sv.sample(&mut rng);
            counts.insert(outcome_to_bitstring(classical_value(&map, basis), map.len()), 1);
        }

        debug!("Sampled {} shots into {} outcomes", shots, counts.len());
        Ok(counts)
    }
}
