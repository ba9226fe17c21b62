//! Delayed gates: stretch the critical path with identity sequences.

use rand::{Rng, RngCore};
use rand_chacha::ChaCha20Rng;
use tracing::debug;

use qobf_ir::Circuit;

use crate::algebra::{equivalent_substitutions, identity_sequence};
use crate::error::{CompileResult, ValidationError};
use crate::pass::Pass;
use crate::spec::{ParamReader, check_range};

use super::{ceil_share, gate_positions, with_seed};

/// Follows `ceil(gates × probability)` gates by an identity sequence that
/// reads like the gate itself.
///
/// Gates with the least scheduling slack go first, so each insertion lands
/// on a critical path and grows the depth as much as it can. Ties are broken
/// by the random stream.
#[derive(Debug, Clone, PartialEq)]
pub struct DelayedGates {
    /// Share of gates that get delayed.
    pub probability: f64,
    /// User seed mixed into the derived seed.
    pub seed: Option<u64>,
}

impl DelayedGates {
    /// Spec name.
    pub const NAME: &'static str = "delayed";

    /// Default share.
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

impl Default for DelayedGates {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PROBABILITY)
    }
}

impl Pass for DelayedGates {
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
        let positions = gate_positions(circuit);
        let budget = ceil_share(positions.len(), self.probability);
        let slack = circuit.dag().slack();

        let mut ranked: Vec<(usize, u64, usize)> = positions
            .iter()
            .map(|&i| (slack[i], rng.next_u64(), i))
            .collect();
        ranked.sort_unstable();

        let mut chosen = vec![false; circuit.len()];
        for &(_, _, i) in ranked.iter().take(budget) {
            chosen[i] = true;
        }

        let mut out = circuit.empty_like();
        for (i, instruction) in circuit.instructions().iter().enumerate() {
            out.push(instruction.clone())?;
            if !chosen[i] {
                continue;
            }
            if let Some(gate) = instruction.as_gate() {
                let variants = equivalent_substitutions(gate, &instruction.qubits).len().max(1);
                let choice = rng.gen_range(0..variants);
                out.extend(identity_sequence(gate, &instruction.qubits, choice))?;
            }
        }

        debug!(
            "Delayed {} of {} gates, depth {} -> {}",
            budget,
            positions.len(),
            circuit.depth(),
            out.depth()
        );
        Ok(out)
    }
}
