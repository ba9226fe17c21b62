//! Superposition guard with two payload paths.

use rand_chacha::ChaCha20Rng;

use qobf_compile::{NoiseLevel, ParamReader, ValidationError};
use qobf_ir::Circuit;

use crate::error::GuardResult;
use crate::predicate::BranchPredicate;
use crate::trigger::{TriggerCircuit, pad_with_noise};

use super::{Guard, params_text, read_noise, register, require};

/// Puts `qubits` qubits in uniform superposition. Even-parity outcomes run
/// the payload on one code path and odd-parity outcomes on another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shroud {
    /// Register size.
    pub qubits: u64,
    /// Noise tier for padding.
    pub noise: NoiseLevel,
    /// User seed mixed into the derived seed.
    pub seed: Option<u64>,
}

impl Shroud {
    /// Spec name.
    pub const NAME: &'static str = "shroud";

    /// Default register size.
    pub const DEFAULT_QUBITS: u64 = 1;

    /// Allowed register sizes.
    pub const QUBITS: std::ops::RangeInclusive<u64> = 1..=8;

    /// Create the guard.
    pub fn new(qubits: u64) -> Self {
        Self {
            qubits,
            noise: NoiseLevel::default(),
            seed: None,
        }
    }

    pub(crate) fn read(reader: &mut ParamReader<'_>) -> Result<Self, ValidationError> {
        Ok(Self {
            qubits: reader.integer("qubits", Self::DEFAULT_QUBITS)?,
            noise: read_noise(reader)?,
            seed: reader.optional_integer("seed")?,
        })
    }
}

impl Default for Shroud {
    fn default() -> Self {
        Self::new(Self::DEFAULT_QUBITS)
    }
}

impl Guard for Shroud {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn params(&self) -> String {
        params_text(format!("qubits={},noise={}", self.qubits, self.noise), self.seed)
    }

    fn check(&self) -> GuardResult<()> {
        require(Self::NAME, Self::QUBITS.contains(&self.qubits), || {
            format!(
                "needs between {} and {} qubits, got {}",
                Self::QUBITS.start(),
                Self::QUBITS.end(),
                self.qubits
            )
        })
    }

    fn synthesize(&self, rng: &mut ChaCha20Rng) -> GuardResult<TriggerCircuit> {
        self.check()?;
        let width = self.qubits as usize;
        let qubits = register(width);

        let mut circuit = Circuit::with_size(Self::NAME, width as u32, width as u32);
        pad_with_noise(&mut circuit, rng, self.noise, &qubits)?;
        for &q in &qubits {
            circuit.h(q)?;
        }
        pad_with_noise(&mut circuit, rng, self.noise, &qubits)?;
        circuit.measure_all()?;

        Ok(TriggerCircuit::new(
            circuit,
            BranchPredicate::EitherParity { width },
        ))
    }
}
