//! Multi-pair entanglement guard.

use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;

use qobf_compile::{NoiseLevel, ParamReader, ValidationError};
use qobf_ir::{Circuit, QubitId};

use crate::error::GuardResult;
use crate::predicate::BranchPredicate;
use crate::trigger::{TriggerCircuit, pad_with_noise};

use super::{Guard, params_text, read_noise, register, require};

/// Prepares `pairs` Bell pairs over a shuffled register. The payload runs
/// when the two bits of every pair agree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariablePairs {
    /// Number of Bell pairs.
    pub pairs: u64,
    /// Noise tier for padding.
    pub noise: NoiseLevel,
    /// User seed mixed into the derived seed.
    pub seed: Option<u64>,
}

impl VariablePairs {
    /// Spec name.
    pub const NAME: &'static str = "variable_pairs";

    /// Default number of pairs.
    pub const DEFAULT_PAIRS: u64 = 3;

    /// Allowed number of pairs.
    pub const PAIRS: std::ops::RangeInclusive<u64> = 2..=8;

    /// Create the guard.
    pub fn new(pairs: u64) -> Self {
        Self {
            pairs,
            noise: NoiseLevel::default(),
            seed: None,
        }
    }

    pub(crate) fn read(reader: &mut ParamReader<'_>) -> Result<Self, ValidationError> {
        Ok(Self {
            pairs: reader.integer("pairs", Self::DEFAULT_PAIRS)?,
            noise: read_noise(reader)?,
            seed: reader.optional_integer("seed")?,
        })
    }
}

impl Default for VariablePairs {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PAIRS)
    }
}

impl Guard for VariablePairs {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn params(&self) -> String {
        params_text(format!("pairs={},noise={}", self.pairs, self.noise), self.seed)
    }

    fn check(&self) -> GuardResult<()> {
        require(Self::NAME, Self::PAIRS.contains(&self.pairs), || {
            format!(
                "needs between {} and {} Bell pairs, got {}",
                Self::PAIRS.start(),
                Self::PAIRS.end(),
                self.pairs
            )
        })
    }

    fn synthesize(&self, rng: &mut ChaCha20Rng) -> GuardResult<TriggerCircuit> {
        self.check()?;
        let width = (self.pairs * 2) as usize;
        let qubits = register(width);

        let mut order = qubits.clone();
        order.shuffle(rng);
        let pairs: Vec<(QubitId, QubitId)> = order.chunks(2).map(|p| (p[0], p[1])).collect();

        let mut circuit = Circuit::with_size(Self::NAME, width as u32, width as u32);
        pad_with_noise(&mut circuit, rng, self.noise, &qubits)?;
        for &(control, target) in &pairs {
            circuit.h(control)?.cx(control, target)?;
        }
        pad_with_noise(&mut circuit, rng, self.noise, &qubits)?;
        circuit.measure_all()?;

        Ok(TriggerCircuit::new(
            circuit,
            BranchPredicate::PairsCorrelated {
                width,
                pairs: pairs.iter().map(|(a, b)| (a.index(), b.index())).collect(),
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GuardError;
    use qobf_compile::seed::seeded_rng;

    #[test]
    fn test_pairs_cover_register() {
        let trigger = VariablePairs::new(4).synthesize(&mut seeded_rng(9)).unwrap();
        assert_eq!(trigger.num_qubits(), 8);

        let BranchPredicate::PairsCorrelated { width, pairs } = &trigger.predicate else {
            panic!("unexpected predicate {:?}", trigger.predicate);
        };
        assert_eq!(*width, 8);
        let mut seen: Vec<usize> = pairs.iter().flat_map(|&(a, b)| [a, b]).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn test_too_few_pairs() {
        let err = VariablePairs::new(1).check().unwrap_err();
        assert!(matches!(err, GuardError::Structural { algorithm: "variable_pairs", .. }));
        assert!(err.to_string().contains("got 1"));
    }

    #[test]
    fn test_too_many_pairs() {
        assert!(VariablePairs::new(9).synthesize(&mut seeded_rng(0)).is_err());
    }
}
