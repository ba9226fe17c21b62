//! Checksum guard.
//!
//! The trigger always measures the same bitstring. With `n ≥ 2` qubits it is
//! built by phase kickback:
//!
//! ```text
//! h on all ─ z on ancilla ─ cx(q, ancilla) for every other q ─ h on all
//! ```
//!
//! Every control picks up the ancilla's `-` phase, so all `n` qubits end in
//! `|1⟩`. An `x` on each qubit whose checksum bit is `0` then yields the
//! checksum. A single qubit starts from `x` instead.

use rand::Rng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;

use qobf_compile::{NoiseLevel, ParamReader, ValidationError};
use qobf_ir::Circuit;

use crate::error::GuardResult;
use crate::predicate::{BranchPredicate, bit, is_bitstring};
use crate::trigger::{TriggerCircuit, pad_with_noise};

use super::{Guard, params_text, read_noise, register, require};

/// Runs the payload only when the trigger measures `checksum`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deterministic {
    /// Target bitstring, classical bit 0 rightmost.
    pub checksum: String,
    /// Noise tier for padding.
    pub noise: NoiseLevel,
    /// User seed mixed into the derived seed.
    pub seed: Option<u64>,
}

impl Deterministic {
    /// Spec name.
    pub const NAME: &'static str = "deterministic";

    /// Default checksum.
    pub const DEFAULT_CHECKSUM: &'static str = "11111";

    /// Longest checksum.
    pub const MAX_CHECKSUM_BITS: usize = 16;

    /// Create the guard.
    pub fn new(checksum: impl Into<String>) -> Self {
        Self {
            checksum: checksum.into(),
            noise: NoiseLevel::default(),
            seed: None,
        }
    }

    pub(crate) fn read(reader: &mut ParamReader<'_>) -> Result<Self, ValidationError> {
        let guard = Self {
            checksum: reader.text("checksum", Self::DEFAULT_CHECKSUM),
            noise: read_noise(reader)?,
            seed: reader.optional_integer("seed")?,
        };
        guard.validate_checksum()?;
        Ok(guard)
    }

    /// Width is a structural concern left to [`Guard::check`].
    fn validate_checksum(&self) -> Result<(), ValidationError> {
        if self.checksum.is_empty() || is_bitstring(&self.checksum) {
            Ok(())
        } else {
            Err(ValidationError::InvalidValue {
                algorithm: Self::NAME.to_string(),
                key: "checksum".to_string(),
                value: self.checksum.clone(),
                expected: "a string of 0 and 1".to_string(),
            })
        }
    }
}

impl Default for Deterministic {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CHECKSUM)
    }
}

impl Guard for Deterministic {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn params(&self) -> String {
        params_text(
            format!("checksum={},noise={}", self.checksum, self.noise),
            self.seed,
        )
    }

    fn check(&self) -> GuardResult<()> {
        require(
            Self::NAME,
            (1..=Self::MAX_CHECKSUM_BITS).contains(&self.checksum.len()),
            || {
                format!(
                    "checksum must be 1 to {} bits, got {}",
                    Self::MAX_CHECKSUM_BITS,
                    self.checksum.len()
                )
            },
        )?;
        self.validate_checksum()?;
        Ok(())
    }

    fn synthesize(&self, rng: &mut ChaCha20Rng) -> GuardResult<TriggerCircuit> {
        self.check()?;
        let width = self.checksum.len();
        let qubits = register(width);
        let mut circuit = Circuit::with_size(Self::NAME, width as u32, width as u32);

        pad_with_noise(&mut circuit, rng, self.noise, &qubits)?;

        if let [only] = qubits.as_slice() {
            circuit.x(*only)?;
        } else {
            let ancilla = qubits[rng.gen_range(0..width)];
            let mut controls: Vec<_> = qubits.iter().copied().filter(|&q| q != ancilla).collect();
            controls.shuffle(rng);

            for &q in &qubits {
                circuit.h(q)?;
            }
            circuit.z(ancilla)?;
            for &control in &controls {
                circuit.cx(control, ancilla)?;
            }
            for &q in &qubits {
                circuit.h(q)?;
            }
        }

        for &q in &qubits {
            if bit(&self.checksum, q.index()) == Some(false) {
                circuit.x(q)?;
            }
        }

        pad_with_noise(&mut circuit, rng, self.noise, &qubits)?;
        circuit.measure_all()?;

        Ok(TriggerCircuit::new(
            circuit,
            BranchPredicate::Equals(self.checksum.clone()),
        ))
    }
}
