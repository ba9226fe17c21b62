//! Cloaked gates: in-place substitution by equivalent sequences.

use rand::Rng;
use rand_chacha::ChaCha20Rng;
use tracing::debug;

use qobf_ir::Circuit;

use crate::algebra::equivalent_substitutions;
use crate::error::{CompileResult, ValidationError};
use crate::pass::Pass;
use crate::spec::{ParamReader, check_range};

use super::with_seed;

/// Replaces each gate, with probability `probability`, by one of its
/// equivalent substitutions.
#[derive(Debug, Clone, PartialEq)]
pub struct CloakedGates {
    /// Chance that a given gate is substituted.
    pub probability: f64,
    /// User seed mixed into the derived seed.
    pub seed: Option<u64>,
}

impl CloakedGates {
    /// Spec name.
    pub const NAME: &'static str = "cloaked";

    /// Default substitution probability.
    pub const DEFAULT_PROBABILITY: f64 = 0.5;

    /// Create the pass.
    pub fn new(probability: f64) -> Self {
        Self {
            probability,
            seed: None,
        }
    }

    /// Mix a user seed into the derived seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub(crate) fn read(reader: &mut ParamReader<'_>) -> Result<Self, ValidationError> {
        Ok(Self {
            probability: reader.fraction("probability", Self::DEFAULT_PROBABILITY)?,
            seed: reader.optional_integer("seed")?,
        })
    }
}

impl Default for CloakedGates {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PROBABILITY)
    }
}

impl Pass for CloakedGates {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn params(&self) -> String {
        with_seed(format!("probability={}", self.probability), self.seed)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_range(Self::NAME, "probability", self.probability, &(0.0..=1.0))
    }

    fn run(&self, circuit: &Circuit, rng: &mut ChaCha20Rng) -> CompileResult<Circuit> {
        self.validate()?;
        let mut out = circuit.empty_like();
        let mut substituted = 0;

        for instruction in circuit.instructions() {
            let mut variants = instruction
                .as_gate()
                .map(|gate| equivalent_substitutions(gate, &instruction.qubits))
                .unwrap_or_default();

            if !variants.is_empty() && rng.gen_bool(self.probability) {
                let choice = rng.gen_range(0..variants.len());
                out.extend(variants.swap_remove(choice))?;
                substituted += 1;
            } else {
                out.push(instruction.clone())?;
            }
        }

        debug!(
            "Cloaked {} of {} gates, {} -> {} instructions",
            substituted,
            circuit.gate_count(),
            circuit.len(),
            out.len()
        );
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unitary::{Verification, verify_equivalence};
    use qobf_ir::QubitId;
    use rand::SeedableRng;

    fn sample() -> Circuit {
        let mut c = Circuit::with_size("sample", 3, 3);
        c.h(QubitId(0)).unwrap();
        c.cx(QubitId(0), QubitId(1)).unwrap();
        c.t(QubitId(2)).unwrap();
        c.rz(qobf_ir::Angle::pi_over(3), QubitId(1)).unwrap();
        c.ccx(QubitId(0), QubitId(1), QubitId(2)).unwrap();
        c.measure_all().unwrap();
        c
    }

    #[test]
    fn test_probability_one_substitutes_every_gate() {
        let c = sample();
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let out = CloakedGates::new(1.0).run(&c, &mut rng).unwrap();

        assert!(out.gate_count() > c.gate_count());
        assert_eq!(verify_equivalence(&c, &out).unwrap(), Verification::Equivalent);
    }

    #[test]
    fn test_probability_zero_is_identity() {
        let c = sample();
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        assert_eq!(CloakedGates::new(0.0).run(&c, &mut rng).unwrap(), c);
    }

    #[test]
    fn test_same_rng_same_output() {
        let c = sample();
        let pass = CloakedGates::default();
        let a = pass.run(&c, &mut ChaCha20Rng::seed_from_u64(9)).unwrap();
        let b = pass.run(&c, &mut ChaCha20Rng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_params_text() {
        assert_eq!(CloakedGates::default().params(), "probability=0.5");
        assert_eq!(CloakedGates::new(1.0).with_seed(4).params(), "probability=1,seed=4");
    }

    #[test]
    fn test_validate_range() {
        assert!(CloakedGates::new(0.7).validate().is_ok());
        assert!(CloakedGates::new(-0.1).validate().is_err());
        assert!(CloakedGates::new(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_out_of_range_probability_rejected_before_run() {
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        let err = CloakedGates::new(1.5).run(&Circuit::bell().unwrap(), &mut rng).unwrap_err();
        assert!(matches!(
            err,
            crate::error::CompileError::Validation(ValidationError::OutOfRange { .. })
        ));
    }
}
