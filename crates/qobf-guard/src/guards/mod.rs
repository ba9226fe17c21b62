//! Guard synthesis algorithms.
//!
//! | Guard | Trigger | Payload runs on |
//! |-------|---------|-----------------|
//! | [`SimpleEntanglement`] | Bell pair | `00` or `11` |
//! | [`VariablePairs`] | `pairs` Bell pairs on shuffled qubits | every pair agrees |
//! | [`Shroud`] | `qubits` qubits in uniform superposition | any outcome, two code paths |
//! | [`Deterministic`] | phase-kickback circuit | the checksum, exactly |
//!
//! Every trigger is padded with identity noise of the configured tier.

mod deterministic;
mod shroud;
mod simple_entanglement;
mod variable_pairs;

pub use deterministic::Deterministic;
pub use shroud::Shroud;
pub use simple_entanglement::SimpleEntanglement;
pub use variable_pairs::VariablePairs;

use rand_chacha::ChaCha20Rng;

use qobf_compile::{NoiseLevel, ParamReader, ValidationError};
use qobf_ir::QubitId;

use crate::error::{GuardError, GuardResult};
use crate::trigger::TriggerCircuit;

/// A guard synthesis algorithm with its configuration.
pub trait Guard: Send + Sync {
    /// Spec name.
    fn name(&self) -> &'static str;

    /// Canonical parameter text, used for seeding.
    fn params(&self) -> String;

    /// Check parameter ranges and structural requirements.
    fn check(&self) -> GuardResult<()>;

    /// Build the trigger circuit and its predicate.
    fn synthesize(&self, rng: &mut ChaCha20Rng) -> GuardResult<TriggerCircuit>;
}

fn read_noise(reader: &mut ParamReader<'_>) -> Result<NoiseLevel, ValidationError> {
    reader.choice(
        "noise",
        NoiseLevel::default(),
        NoiseLevel::from_name,
        "one of light, medium, heavy",
    )
}

fn params_text(base: String, seed: Option<u64>) -> String {
    match seed {
        Some(seed) => format!("{base},seed={seed}"),
        None => base,
    }
}

fn register(n: usize) -> Vec<QubitId> {
    (0..n).map(|i| QubitId(i as u32)).collect()
}

fn require(
    algorithm: &'static str,
    ok: bool,
    requirement: impl FnOnce() -> String,
) -> GuardResult<()> {
    if ok {
        Ok(())
    } else {
        Err(GuardError::Structural {
            algorithm,
            requirement: requirement(),
        })
    }
}
