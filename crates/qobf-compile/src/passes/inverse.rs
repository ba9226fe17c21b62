//! Inverse gates: pad chosen gates with `g, g†` pairs.

use rand::seq::index;
use rand_chacha::ChaCha20Rng;
use tracing::debug;

use qobf_ir::Circuit;

use crate::algebra::inverse_pair;
use crate::error::{CompileResult, ValidationError};
use crate::noise::{NoiseLevel, noise_block};
use crate::pass::Pass;
use crate::spec::{ParamReader, check_range};

use super::{floor_share, gate_positions, with_seed};

/// Follows `floor(gates × density)` distinct gates by an inverse pair of
/// themselves, plus `level.extra_blocks()` noise blocks on the same qubits.
#[derive(Debug, Clone, PartialEq)]
pub struct InverseGates {
    /// Share of gates that get a pair.
    pub density: f64,
    /// Extra noise per pair.
    pub level: NoiseLevel,
    /// User seed mixed into the derived seed.
    pub seed: Option<u64>,
}

impl InverseGates {
    /// Spec name.
    pub const NAME: &'static str = "inverse";

    /// Default density.
    pub const DEFAULT_DENSITY: f64 = 0.3;

    /// Create the pass with light noise.
    pub fn new(density: f64) -> Self {
        Self {
            density,
            level: NoiseLevel::Light,
            seed: None,
        }
    }

    /// Set the noise tier.
    #[must_use]
    pub fn with_level(mut self, level: NoiseLevel) -> Self {
        self.level = level;
        self
    }

    /// Mix a user seed into the derived seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub(crate) fn read(reader: &mut ParamReader<'_>) -> Result<Self, ValidationError> {
        Ok(Self {
            density: reader.fraction("density", Self::DEFAULT_DENSITY)?,
            level: reader.choice(
                "level",
                NoiseLevel::Light,
                NoiseLevel::from_name,
                "one of light, medium, heavy",
            )?,
            seed: reader.optional_integer("seed")?,
        })
    }
}

impl Default for InverseGates {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DENSITY)
    }
}

impl Pass for InverseGates {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn params(&self) -> String {
        with_seed(
            format!("density={},level={}", self.density, self.level),
            self.seed,
        )
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_range(Self::NAME, "density", self.density, &(0.0..=1.0))
    }

    fn run(&self, circuit: &Circuit, rng: &mut ChaCha20Rng) -> CompileResult<Circuit> {
        self.validate()?;
        let positions = gate_positions(circuit);
        let count = floor_share(positions.len(), self.density);

        let mut chosen = vec![false; circuit.len()];
        for i in index::sample(rng, positions.len(), count) {
            chosen[positions[i]] = true;
        }

        let mut out = circuit.empty_like();
        for (i, instruction) in circuit.instructions().iter().enumerate() {
            out.push(instruction.clone())?;
            if !chosen[i] {
                continue;
            }
            if let Some(gate) = instruction.as_gate() {
                out.extend(inverse_pair(gate, &instruction.qubits))?;
                for _ in 0..self.level.extra_blocks() {
                    out.extend(noise_block(rng, self.level, &instruction.qubits))?;
                }
            }
        }

        debug!(
            "Inserted {} inverse pairs ({} noise), {} -> {} instructions",
            count,
            self.level,
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

    fn h_cx() -> Circuit {
        let mut c = Circuit::with_size("hcx", 2, 0);
        c.h(QubitId(0)).unwrap().cx(QubitId(0), QubitId(1)).unwrap();
        c
    }

    #[test]
    fn test_full_density_pairs_every_gate() {
        let c = h_cx();
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        let out = InverseGates::new(1.0).run(&c, &mut rng).unwrap();

        let names: Vec<&str> = out.instructions().iter().map(|i| i.name()).collect();
        assert_eq!(names, vec!["h", "h", "h", "cx", "cx", "cx"]);
        assert!(out.depth() >= 4);
        assert_eq!(verify_equivalence(&c, &out).unwrap(), Verification::Equivalent);
    }

    #[test]
    fn test_insertion_count_is_floor() {
        let mut c = Circuit::with_size("line", 1, 0);
        for _ in 0..7 {
            c.t(QubitId(0)).unwrap();
        }
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        let out = InverseGates::new(0.3).run(&c, &mut rng).unwrap();
        // floor(7 × 0.3) = 2 pairs.
        assert_eq!(out.len(), 7 + 2 * 2);
    }

    #[test]
    fn test_heavy_noise_still_equivalent() {
        let mut c = Circuit::ghz(3).unwrap();
        c.measure_all().unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(21);
        let out = InverseGates::new(1.0)
            .with_level(NoiseLevel::Heavy)
            .run(&c, &mut rng)
            .unwrap();

        assert!(out.len() > c.len() + 3 * 2);
        assert_eq!(verify_equivalence(&c, &out).unwrap(), Verification::Equivalent);
    }

    #[test]
    fn test_measurements_never_chosen() {
        let mut c = Circuit::with_size("m", 1, 1);
        c.measure(QubitId(0), qobf_ir::ClbitId(0)).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        assert_eq!(InverseGates::new(1.0).run(&c, &mut rng).unwrap(), c);
    }

    #[test]
    fn test_params_text() {
        assert_eq!(InverseGates::default().params(), "density=0.3,level=light");
    }

    #[test]
    fn test_out_of_range_density_rejected_before_run() {
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        let err = InverseGates::new(2.0).run(&Circuit::bell().unwrap(), &mut rng).unwrap_err();
        assert!(matches!(
            err,
            crate::error::CompileError::Validation(ValidationError::OutOfRange { .. })
        ));
    }
}
