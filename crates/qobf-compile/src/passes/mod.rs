//! Built-in obfuscation passes.
//!
//! | Pass | Effect |
//! |------|--------|
//! | [`CloakedGates`] | replace gates by longer equivalent sequences |
//! | [`InverseGates`] | follow gates by inverse pairs and noise blocks |
//! | [`DelayedGates`] | follow critical-path gates by identity sequences |
//! | [`CompositeGates`] | insert identity blocks across the whole register |

mod cloaked;
mod composite;
mod delayed;
mod inverse;

pub use cloaked::CloakedGates;
pub use composite::CompositeGates;
pub use delayed::DelayedGates;
pub use inverse::InverseGates;

use qobf_ir::Circuit;

/// Indices of the unitary gates in a circuit.
fn gate_positions(circuit: &Circuit) -> Vec<usize> {
    circuit
        .instructions()
        .iter()
        .enumerate()
        .filter(|(_, instruction)| instruction.is_gate())
        .map(|(index, _)| index)
        .collect()
}

/// `floor(len × fraction)`, never more than `len`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn floor_share(len: usize, fraction: f64) -> usize {
    ((len as f64 * fraction).floor() as usize).min(len)
}

/// `ceil(len × fraction)`, never more than `len`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn ceil_share(len: usize, fraction: f64) -> usize {
    ((len as f64 * fraction).ceil() as usize).min(len)
}

/// Append `,seed=N` when a user seed is set.
fn with_seed(params: String, seed: Option<u64>) -> String {
    match seed {
        Some(seed) => format!("{params},seed={seed}"),
        None => params,
    }
}
