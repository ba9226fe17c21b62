//! Seeded identity noise.
//!
//! A noise block is a short random gate word followed by its inverse, so it
//! always multiplies to the identity. Tiers control the word length: light
//! blocks are 2-4 gates, medium 6-8, heavy 10-12.

use std::fmt;
use std::ops::RangeInclusive;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use qobf_ir::{Angle, Instruction, QubitId, StandardGate};

use crate::algebra::inverse_of;

/// Noise intensity tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseLevel {
    /// Short blocks.
    #[default]
    Light,
    /// Medium blocks.
    Medium,
    /// Long blocks.
    Heavy,
}

impl NoiseLevel {
    /// All tiers, lightest first.
    pub const ALL: [NoiseLevel; 3] = [NoiseLevel::Light, NoiseLevel::Medium, NoiseLevel::Heavy];

    /// Parse a tier name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "light" => Some(NoiseLevel::Light),
            "medium" => Some(NoiseLevel::Medium),
            "heavy" => Some(NoiseLevel::Heavy),
            _ => None,
        }
    }

    /// The tier name.
    pub fn as_str(self) -> &'static str {
        match self {
            NoiseLevel::Light => "light",
            NoiseLevel::Medium => "medium",
            NoiseLevel::Heavy => "heavy",
        }
    }

    /// Extra noise blocks added next to each inverse pair.
    pub fn extra_blocks(self) -> usize {
        match self {
            NoiseLevel::Light => 0,
            NoiseLevel::Medium => 1,
            NoiseLevel::Heavy => 3,
        }
    }

    fn word_len(self) -> RangeInclusive<usize> {
        match self {
            NoiseLevel::Light => 1..=2,
            NoiseLevel::Medium => 3..=4,
            NoiseLevel::Heavy => 5..=6,
        }
    }
}

impl fmt::Display for NoiseLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A random single-qubit gate from the noise alphabet.
pub fn pool_gate<R: Rng + ?Sized>(rng: &mut R) -> StandardGate {
    const DIVISORS: [u32; 4] = [2, 3, 4, 8];
    let angle = |rng: &mut R| Angle::pi_over(DIVISORS[rng.gen_range(0..DIVISORS.len())]);

    match rng.gen_range(0..13) {
        0 => StandardGate::X,
        1 => StandardGate::Y,
        2 => StandardGate::Z,
        3 => StandardGate::H,
        4 => StandardGate::S,
        5 => StandardGate::Sdg,
        6 => StandardGate::T,
        7 => StandardGate::Tdg,
        8 => StandardGate::SX,
        9 => StandardGate::SXdg,
        10 => StandardGate::Rx(angle(rng)),
        11 => StandardGate::Ry(angle(rng)),
        _ => StandardGate::Rz(angle(rng)),
    }
}

/// An identity block on `qubits`. Two-qubit gates appear only when at
/// least two qubits are given.
pub fn noise_block<R: Rng + ?Sized>(
    rng: &mut R,
    level: NoiseLevel,
    qubits: &[QubitId],
) -> Vec<Instruction> {
    if qubits.is_empty() {
        return Vec::new();
    }

    let len = rng.gen_range(level.word_len());
    let mut word = Vec::with_capacity(len * 2);
    for _ in 0..len {
        if qubits.len() >= 2 && rng.gen_bool(0.3) {
            let pair: Vec<QubitId> = qubits.choose_multiple(rng, 2).copied().collect();
            let gate = if rng.gen_bool(0.5) {
                StandardGate::CX
            } else {
                StandardGate::CZ
            };
            word.push(Instruction::gate(gate, pair));
        } else {
            let target = qubits[rng.gen_range(0..qubits.len())];
            word.push(Instruction::gate(pool_gate(rng), [target]));
        }
    }

    let undo = inverse_of(&word);
    word.extend(undo);
    word
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unitary::{EQUIVALENCE_TOLERANCE, equivalent_up_to_phase, sequence_unitary};
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_blocks_are_identity() {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let qubits = [QubitId(0), QubitId(2)];
        let identity = sequence_unitary(3, &[]).unwrap();
        for level in NoiseLevel::ALL {
            for _ in 0..20 {
                let block = noise_block(&mut rng, level, &qubits);
                let u = sequence_unitary(3, &block).unwrap();
                assert!(equivalent_up_to_phase(&u, &identity, EQUIVALENCE_TOLERANCE));
            }
        }
    }

    #[test]
    fn test_block_lengths_follow_tier() {
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        for _ in 0..50 {
            let light = noise_block(&mut rng, NoiseLevel::Light, &[QubitId(0)]).len();
            let heavy = noise_block(&mut rng, NoiseLevel::Heavy, &[QubitId(0)]).len();
            assert!((2..=4).contains(&light));
            assert!((10..=12).contains(&heavy));
        }
    }

    #[test]
    fn test_single_qubit_block_stays_local() {
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let block = noise_block(&mut rng, NoiseLevel::Heavy, &[QubitId(1)]);
        assert!(block.iter().all(|i| i.qubits == vec![QubitId(1)]));
    }

    #[test]
    fn test_level_names() {
        for level in NoiseLevel::ALL {
            assert_eq!(NoiseLevel::from_name(level.as_str()), Some(level));
        }
        assert_eq!(NoiseLevel::from_name("extreme"), None);
    }
}
