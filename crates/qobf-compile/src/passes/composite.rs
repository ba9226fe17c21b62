//! Composite gates: register-wide identity blocks at random points.

use rand::Rng;
use rand::seq::index;
use rand_chacha::ChaCha20Rng;
use tracing::debug;

use qobf_ir::{Circuit, Instruction, QubitId};

use crate::algebra::{equivalent_substitutions, identity_sequence};
use crate::error::{CompileResult, ValidationError};
use crate::noise::pool_gate;
use crate::pass::Pass;
use crate::spec::{ParamReader, check_range};

use super::{floor_share, with_seed};

/// Inserts `floor(len × density)` identity blocks between instructions.
///
/// Each block picks one gate from the noise alphabet and lays its identity
/// sequence over every qubit, step by step, so the block reads as a
/// register-wide layer that has nothing to do with the surrounding gates.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeGates {
    /// Insertion points per instruction.
    pub density: f64,
    /// User seed mixed into the derived seed.
    pub seed: Option<u64>,
}

impl CompositeGates {
    /// Spec name.
    pub const NAME: &'static str = "composite";

    /// Default density.
    pub const DEFAULT_DENSITY: f64 = 0.2;

    /// Create the pass.
    pub fn new(density: f64) -> Self {
        Self {
            density,
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
            density: reader.fraction("density", Self::DEFAULT_DENSITY)?,
            seed: reader.optional_integer("seed")?,
        })
    }

    fn block(circuit: &Circuit, rng: &mut ChaCha20Rng) -> Vec<Instruction> {
        let gate = pool_gate(rng);
        let variants = equivalent_substitutions(&gate, &[QubitId(0)]).len().max(1);
        let choice = rng.gen_range(0..variants);

        let per_qubit: Vec<Vec<Instruction>> = circuit
            .qubits()
            .map(|q| identity_sequence(&gate, &[q], choice))
            .collect();

        let steps = per_qubit.iter().map(Vec::len).max().unwrap_or(0);
        (0..steps)
            .flat_map(|step| per_qubit.iter().filter_map(move |seq| seq.get(step).cloned()))
            .collect()
    }
}

impl Default for CompositeGates {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DENSITY)
    }
}

impl Pass for CompositeGates {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn params(&self) -> String {
        with_seed(format!("density={}", self.density), self.seed)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_range(Self::NAME, "density", self.density, &(0.0..=1.0))
    }

    fn run(&self, circuit: &Circuit, rng: &mut ChaCha20Rng) -> CompileResult<Circuit> {
        self.validate()?;
        let len = circuit.len();
        let count = floor_share(len, self.density);
        if count == 0 || circuit.num_qubits() == 0 {
            return Ok(circuit.clone());
        }

        // Points are gaps 0..=len: before the first instruction up to after the last.
        let mut points = index::sample(rng, len + 1, count).into_vec();
        points.sort_unstable();

        let mut out = circuit.empty_like();
        let mut next_point = points.iter().peekable();
        for gap in 0..=len {
            while next_point.next_if(|&&p| p == gap).is_some() {
                out.extend(Self::block(circuit, rng))?;
            }
            if let Some(instruction) = circuit.instructions().get(gap) {
                out.push(instruction.clone())?;
            }
        }

        debug!(
            "Inserted {} composite blocks, {} -> {} instructions",
            count,
            len,
            out.len()
        );
        Ok(out)
    }
}
