//! Exact gate identities.
//!
//! Every rewrite the obfuscation passes perform is built from three
//! primitives over [`StandardGate`]:
//!
//! | Primitive | Result | Net effect |
//! |-----------|--------|------------|
//! | [`inverse_pair`] | `g, g†` | identity |
//! | [`equivalent_substitution`] | a longer sequence | `g` up to global phase |
//! | [`identity_sequence`] | substitution of `g`, then `g†` | identity up to global phase |
//!
//! Sequences are listed in circuit order: the first instruction acts first.
//! Angles are never evaluated here, only negated or halved as expressions.

use qobf_ir::{Angle, Instruction, QubitId, StandardGate};

/// The exact inverse of a gate.
pub fn inverse(gate: &StandardGate) -> StandardGate {
    use StandardGate as G;
    match gate {
        G::I | G::X | G::Y | G::Z | G::H | G::CX | G::CY | G::CZ | G::Swap | G::CCX => {
            gate.clone()
        }
        G::S => G::Sdg,
        G::Sdg => G::S,
        G::T => G::Tdg,
        G::Tdg => G::T,
        G::SX => G::SXdg,
        G::SXdg => G::SX,
        G::Rx(theta) => G::Rx(theta.negated()),
        G::Ry(theta) => G::Ry(theta.negated()),
        G::Rz(theta) => G::Rz(theta.negated()),
        G::P(theta) => G::P(theta.negated()),
        G::U(theta, phi, lambda) => G::U(theta.negated(), lambda.negated(), phi.negated()),
        G::CP(theta) => G::CP(theta.negated()),
        G::CRz(theta) => G::CRz(theta.negated()),
        G::RZZ(theta) => G::RZZ(theta.negated()),
    }
}

/// Undo a sequence: reversed, each gate inverted. Non-unitary instructions
/// have no inverse and are dropped.
pub fn inverse_of(instructions: &[Instruction]) -> Vec<Instruction> {
    instructions
        .iter()
        .rev()
        .filter_map(|instruction| {
            instruction
                .as_gate()
                .map(|gate| Instruction::gate(inverse(gate), instruction.qubits.iter().copied()))
        })
        .collect()
}

/// `gate` followed by its exact inverse.
pub fn inverse_pair(gate: &StandardGate, qubits: &[QubitId]) -> Vec<Instruction> {
    vec![
        Instruction::gate(gate.clone(), qubits.iter().copied()),
        Instruction::gate(inverse(gate), qubits.iter().copied()),
    ]
}

/// Every known longer sequence equal to `gate` up to global phase.
///
/// Empty only when `qubits` does not match the gate's arity.
pub fn equivalent_substitutions(gate: &StandardGate, qubits: &[QubitId]) -> Vec<Vec<Instruction>> {
    use StandardGate as G;

    match (gate, qubits) {
        (G::I, &[a]) => vec![vec![one(G::X, a), one(G::X, a)]],
        (G::X, &[a]) => vec![
            vec![one(G::H, a), one(G::Z, a), one(G::H, a)],
            vec![one(G::SX, a), one(G::SX, a)],
        ],
        (G::Y, &[a]) => vec![
            vec![one(G::Sdg, a), one(G::X, a), one(G::S, a)],
            vec![one(G::X, a), one(G::Z, a)],
        ],
        (G::Z, &[a]) => vec![
            vec![one(G::H, a), one(G::X, a), one(G::H, a)],
            vec![one(G::S, a), one(G::S, a)],
            vec![one(G::T, a), one(G::T, a), one(G::T, a), one(G::T, a)],
        ],
        (G::H, &[a]) => vec![
            vec![one(G::Z, a), one(G::Ry(Angle::pi_over(2)), a)],
            vec![one(G::S, a), one(G::SX, a), one(G::S, a)],
        ],
        (G::S, &[a]) => vec![
            vec![one(G::T, a), one(G::T, a)],
            twice(G::Rz(Angle::pi_over(4)), a),
        ],
        (G::Sdg, &[a]) => vec![
            vec![one(G::Tdg, a), one(G::Tdg, a)],
            twice(G::Rz(Angle::pi_over(4).negated()), a),
        ],
        (G::T, &[a]) => vec![
            twice(G::Rz(Angle::pi_over(8)), a),
            twice(G::P(Angle::pi_over(8)), a),
        ],
        (G::Tdg, &[a]) => vec![
            twice(G::Rz(Angle::pi_over(8).negated()), a),
            twice(G::P(Angle::pi_over(8).negated()), a),
        ],
        (G::SX, &[a]) => vec![
            vec![one(G::H, a), one(G::S, a), one(G::H, a)],
            twice(G::Rx(Angle::pi_over(4)), a),
        ],
        (G::SXdg, &[a]) => vec![
            vec![one(G::H, a), one(G::Sdg, a), one(G::H, a)],
            twice(G::Rx(Angle::pi_over(4).negated()), a),
        ],
        (G::Rx(theta), &[a]) => vec![
            vec![one(G::H, a), one(G::Rz(theta.clone()), a), one(G::H, a)],
            twice(G::Rx(theta.halved()), a),
        ],
        (G::Ry(theta), &[a]) => vec![vec![
            one(G::Sdg, a),
            one(G::Rx(theta.clone()), a),
            one(G::S, a),
        ]],
        (G::Rz(theta), &[a]) => vec![
            vec![one(G::H, a), one(G::Rx(theta.clone()), a), one(G::H, a)],
            twice(G::Rz(theta.halved()), a),
        ],
        (G::P(theta), &[a]) => vec![
            twice(G::P(theta.halved()), a),
            twice(G::Rz(theta.halved()), a),
        ],
        (G::U(theta, phi, lambda), &[a]) => vec![vec![
            one(G::Rz(lambda.clone()), a),
            one(G::Ry(theta.clone()), a),
            one(G::Rz(phi.clone()), a),
        ]],
        (G::CX, &[a, b]) => vec![
            vec![one(G::H, b), two(G::CZ, a, b), one(G::H, b)],
            vec![
                one(G::H, a),
                one(G::H, b),
                two(G::CX, b, a),
                one(G::H, a),
                one(G::H, b),
            ],
        ],
        (G::CY, &[a, b]) => vec![vec![one(G::Sdg, b), two(G::CX, a, b), one(G::S, b)]],
        (G::CZ, &[a, b]) => vec![
            vec![one(G::H, b), two(G::CX, a, b), one(G::H, b)],
            vec![one(G::H, a), two(G::CX, b, a), one(G::H, a)],
        ],
        (G::Swap, &[a, b]) => vec![
            vec![two(G::CX, a, b), two(G::CX, b, a), two(G::CX, a, b)],
            vec![two(G::CX, b, a), two(G::CX, a, b), two(G::CX, b, a)],
        ],
        (G::CP(theta), &[a, b]) => {
            let half = theta.halved();
            vec![vec![
                one(G::P(half.clone()), a),
                two(G::CX, a, b),
                one(G::P(half.negated()), b),
                two(G::CX, a, b),
                one(G::P(half), b),
            ]]
        }
        (G::CRz(theta), &[a, b]) => {
            let half = theta.halved();
            vec![vec![
                one(G::Rz(half.clone()), b),
                two(G::CX, a, b),
                one(G::Rz(half.negated()), b),
                two(G::CX, a, b),
            ]]
        }
        (G::RZZ(theta), &[a, b]) => vec![
            vec![two(G::CX, a, b), one(G::Rz(theta.clone()), b), two(G::CX, a, b)],
            vec![two(G::CX, b, a), one(G::Rz(theta.clone()), a), two(G::CX, b, a)],
        ],
        (G::CCX, &[a, b, c]) => vec![vec![
            one(G::H, c),
            two(G::CX, b, c),
            one(G::Tdg, c),
            two(G::CX, a, c),
            one(G::T, c),
            two(G::CX, b, c),
            one(G::Tdg, c),
            two(G::CX, a, c),
            one(G::T, b),
            one(G::T, c),
            one(G::H, c),
            two(G::CX, a, b),
            one(G::T, a),
            one(G::Tdg, b),
            two(G::CX, a, b),
        ]],
        _ => Vec::new(),
    }
}

/// One substitution for `gate`, picked by `choice` modulo the number of
/// known variants.
pub fn equivalent_substitution(
    gate: &StandardGate,
    qubits: &[QubitId],
    choice: usize,
) -> Vec<Instruction> {
    let mut variants = equivalent_substitutions(gate, qubits);
    if variants.is_empty() {
        return Vec::new();
    }
    let pick = choice % variants.len();
    variants.swap_remove(pick)
}

/// A sequence that multiplies to the identity and reads like `gate`: the
/// chosen substitution of `gate` followed by `gate`'s inverse.
pub fn identity_sequence(gate: &StandardGate, qubits: &[QubitId], choice: usize) -> Vec<Instruction> {
    let mut sequence = equivalent_substitution(gate, qubits, choice);
    if sequence.is_empty() {
        return sequence;
    }
    sequence.push(Instruction::gate(inverse(gate), qubits.iter().copied()));
    sequence
}

fn one(gate: StandardGate, q: QubitId) -> Instruction {
    Instruction::gate(gate, [q])
}

fn two(gate: StandardGate, a: QubitId, b: QubitId) -> Instruction {
    Instruction::gate(gate, [a, b])
}

fn twice(gate: StandardGate, q: QubitId) -> Vec<Instruction> {
    vec![one(gate.clone(), q), one(gate, q)]
}
