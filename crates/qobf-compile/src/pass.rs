//! Pass trait for obfuscation passes.

use rand_chacha::ChaCha20Rng;

use qobf_ir::Circuit;

use crate::error::{CompileResult, ValidationError};

/// A circuit obfuscation pass.
///
/// A pass is a pure function of its input circuit, its own configuration and
/// the random stream it is handed: it never edits the input and never reads
/// ambient randomness. The returned circuit has the same register and the
/// same unitary up to global phase.
pub trait Pass: Send + Sync {
    /// Algorithm name, as written in specs.
    fn name(&self) -> &'static str;

    /// Canonical `key=value,...` text of the configuration, in a fixed key
    /// order. Two configurations that behave the same print the same.
    fn params(&self) -> String;

    /// Re-check the configuration's ranges.
    fn validate(&self) -> Result<(), ValidationError>;

    /// Produce the obfuscated circuit.
    fn run(&self, circuit: &Circuit, rng: &mut ChaCha20Rng) -> CompileResult<Circuit>;
}
