//! Trigger circuits and their validation.

use rand::Rng;
use tracing::{debug, instrument};

use qobf_compile::NoiseLevel;
use qobf_compile::noise::noise_block;
use qobf_hal::Simulator;
use qobf_ir::{Circuit, QubitId};

use crate::error::{GuardError, GuardResult};
use crate::predicate::BranchPredicate;

/// A small circuit whose measured outcome decides whether the payload runs.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerCircuit {
    /// The circuit, ending in measurements of every clbit the predicate reads.
    pub circuit: Circuit,
    /// The condition on the outcome.
    pub predicate: BranchPredicate,
}

impl TriggerCircuit {
    /// Pair a circuit with its predicate.
    pub fn new(circuit: Circuit, predicate: BranchPredicate) -> Self {
        Self { circuit, predicate }
    }

    /// Number of qubits in the trigger.
    pub fn num_qubits(&self) -> usize {
        self.circuit.num_qubits()
    }
}

/// Append identity noise over `qubits`: one block, plus the tier's extra
/// blocks. The outcome distribution is unchanged.
pub(crate) fn pad_with_noise<R: Rng + ?Sized>(
    circuit: &mut Circuit,
    rng: &mut R,
    level: NoiseLevel,
    qubits: &[QubitId],
) -> GuardResult<()> {
    for _ in 0..=level.extra_blocks() {
        circuit.extend(noise_block(rng, level, qubits))?;
    }
    Ok(())
}

/// Simulate `trigger` exactly and check that every reachable outcome runs the
/// payload. Returns the outcome distribution.
#[instrument(skip(trigger, simulator), fields(simulator = simulator.name()))]
pub fn verify_trigger(
    algorithm: &'static str,
    trigger: &TriggerCircuit,
    simulator: &dyn Simulator,
) -> GuardResult<Vec<(String, f64)>> {
    let distribution = simulator.outcome_distribution(&trigger.circuit)?;

    if let Some((outcome, probability)) = distribution
        .iter()
        .find(|(outcome, _)| !trigger.predicate.holds(outcome))
    {
        return Err(GuardError::TriggerMismatch {
            algorithm,
            outcome: outcome.clone(),
            probability: *probability,
        });
    }

    debug!(
        "Trigger verified: {} reachable outcomes satisfy {}",
        distribution.len(),
        trigger.predicate
    );
    Ok(distribution)
}
