//! Bell-pair guard.

use rand_chacha::ChaCha20Rng;

use qobf_compile::{NoiseLevel, ParamReader, ValidationError};
use qobf_ir::{Circuit, QubitId};

use crate::error::GuardResult;
use crate::predicate::BranchPredicate;
use crate::trigger::{TriggerCircuit, pad_with_noise};

use super::{Guard, params_text, read_noise};

/// Entangles two qubits and runs the payload on either correlated outcome.
/// `01` and `10` lead to two different decoys, and never occur.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimpleEntanglement {
    /// Noise tier for padding.
    pub noise: NoiseLevel,
    /// User seed mixed into the derived seed.
    pub seed: Option<u64>,
}

impl SimpleEntanglement {
    /// Spec name.
    pub const NAME: &'static str = "simple_entanglement";

    pub(crate) fn read(reader: &mut ParamReader<'_>) -> Result<Self, ValidationError> {
        Ok(Self {
            noise: read_noise(reader)?,
            seed: reader.optional_integer("seed")?,
        })
    }
}

impl Guard for SimpleEntanglement {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn params(&self) -> String {
        params_text(format!("noise={}", self.noise), self.seed)
    }

    fn check(&self) -> GuardResult<()> {
        Ok(())
    }

    fn synthesize(&self, rng: &mut ChaCha20Rng) -> GuardResult<TriggerCircuit> {
        let (q0, q1) = (QubitId(0), QubitId(1));
        let mut circuit = Circuit::with_size(Self::NAME, 2, 2);

        pad_with_noise(&mut circuit, rng, self.noise, &[q0, q1])?;
        circuit.h(q0)?;
        pad_with_noise(&mut circuit, rng, self.noise, &[q0])?;
        circuit.cx(q0, q1)?;
        circuit.measure_all()?;

        Ok(TriggerCircuit::new(
            circuit,
            BranchPredicate::OneOf(vec!["00".to_string(), "11".to_string()]),
        ))
    }
}
