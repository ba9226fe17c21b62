//! Unitary equivalence checking.
//!
//! A rewrite is accepted when the circuit it produces has the same
//! non-unitary skeleton (measurements, resets, barriers in the same order on
//! the same operands) and every gate segment between two skeleton
//! instructions multiplies out to the same `2^n × 2^n` unitary as before, up
//! to global phase.

use ndarray::Array2;
use num_complex::Complex64;
use tracing::debug;

use qobf_ir::{Circuit, Instruction};

use crate::error::CompileResult;

/// Element-wise tolerance after the global phase is removed.
pub const EQUIVALENCE_TOLERANCE: f64 = 1e-10;

/// Largest register whose full unitary is built for checking.
pub const MAX_VERIFY_QUBITS: usize = 10;

/// Outcome of an equivalence check.
#[derive(Debug, Clone, PartialEq)]
pub enum Verification {
    /// Every segment matched.
    Equivalent,
    /// The register is too large to check numerically; only the skeleton
    /// was compared.
    Skipped { qubits: usize },
    /// The circuits differ.
    Mismatch(String),
}

/// Multiply out the gates of `instructions` on an `n`-qubit register.
/// Non-gate instructions are ignored.
pub fn sequence_unitary(
    num_qubits: usize,
    instructions: &[Instruction],
) -> CompileResult<Array2<Complex64>> {
    let mut unitary = Array2::<Complex64>::eye(1 << num_qubits);
    for instruction in instructions {
        if let Some(gate) = instruction.as_gate() {
            let matrix = gate.matrix()?;
            let qubits: Vec<usize> = instruction.qubits.iter().map(|q| q.index()).collect();
            left_multiply(&mut unitary, &matrix, &qubits);
        }
    }
    Ok(unitary)
}

/// `unitary ← G · unitary`, with gate operand `j` as bit `qubits[j]`.
fn left_multiply(unitary: &mut Array2<Complex64>, matrix: &Array2<Complex64>, qubits: &[usize]) {
    let dim = unitary.nrows();
    let local_dim = 1 << qubits.len();
    let operand_mask: usize = qubits.iter().map(|q| 1_usize << q).sum();
    let offsets: Vec<usize> = (0..local_dim)
        .map(|local| {
            qubits
                .iter()
                .enumerate()
                .filter(|(bit, _)| (local >> bit) & 1 == 1)
                .map(|(_, q)| 1_usize << q)
                .sum()
        })
        .collect();

    let mut local = vec![Complex64::new(0.0, 0.0); local_dim];
    for mut column in unitary.columns_mut() {
        for base in (0..dim).filter(|b| b & operand_mask == 0) {
            for (slot, offset) in local.iter_mut().zip(&offsets) {
                *slot = column[base | offset];
            }
            for (row, offset) in offsets.iter().enumerate() {
                column[base | offset] = (0..local_dim).map(|col| matrix[[row, col]] * local[col]).sum();
            }
        }
    }
}

/// Whether `a == e^{iφ} b` for some phase `φ`, element-wise within `tolerance`.
pub fn equivalent_up_to_phase(a: &Array2<Complex64>, b: &Array2<Complex64>, tolerance: f64) -> bool {
    if a.dim() != b.dim() {
        return false;
    }

    // Fix the phase on the largest entry of `a`.
    let Some((pivot, _)) = a
        .indexed_iter()
        .max_by(|(_, x), (_, y)| x.norm_sqr().total_cmp(&y.norm_sqr()))
    else {
        return true;
    };
    let (pa, pb) = (a[pivot], b[pivot]);
    if pa.norm() < tolerance || pb.norm() < tolerance {
        return false;
    }
    let phase = pb / pa;
    let phase = phase / phase.norm();

    a.iter()
        .zip(b.iter())
        .all(|(x, y)| (x * phase - y).norm() < tolerance)
}

/// Check that `after` implements the same computation as `before`.
pub fn verify_equivalence(before: &Circuit, after: &Circuit) -> CompileResult<Verification> {
    if before.num_qubits() != after.num_qubits() || before.num_clbits() != after.num_clbits() {
        return Ok(Verification::Mismatch(format!(
            "register changed from {}q/{}c to {}q/{}c",
            before.num_qubits(),
            before.num_clbits(),
            after.num_qubits(),
            after.num_clbits()
        )));
    }

    let (skeleton_before, segments_before) = split_segments(before);
    let (skeleton_after, segments_after) = split_segments(after);
    if skeleton_before != skeleton_after {
        return Ok(Verification::Mismatch(
            "measurements, resets or barriers were moved".into(),
        ));
    }

    let n = before.num_qubits();
    if n > MAX_VERIFY_QUBITS {
        debug!("Skipping unitary check for {n} qubits");
        return Ok(Verification::Skipped { qubits: n });
    }

    for (index, (a, b)) in segments_before.iter().zip(&segments_after).enumerate() {
        let ua = sequence_unitary(n, a)?;
        let ub = sequence_unitary(n, b)?;
        if !equivalent_up_to_phase(&ua, &ub, EQUIVALENCE_TOLERANCE) {
            return Ok(Verification::Mismatch(format!(
                "gate segment {index} ({} gates before, {} after) has a different unitary",
                a.len(),
                b.len()
            )));
        }
    }

    Ok(Verification::Equivalent)
}

/// Non-gate instructions in order, and the gate runs between them.
fn split_segments(circuit: &Circuit) -> (Vec<&Instruction>, Vec<Vec<Instruction>>) {
    let mut skeleton = Vec::new();
    let mut segments = vec![Vec::new()];
    for instruction in circuit.instructions() {
        if instruction.is_gate() {
            if let Some(segment) = segments.last_mut() {
                segment.push(instruction.clone());
            }
        } else {
            skeleton.push(instruction);
            segments.push(Vec::new());
        }
    }
    (skeleton, segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qobf_ir::{ClbitId, QubitId, StandardGate};

    #[test]
    fn test_cx_matrix_orientation() {
        // cx with control q1, target q0: |10⟩ (index 2) ↦ |11⟩ (index 3).
        let u = sequence_unitary(2, &[Instruction::gate(StandardGate::CX, [QubitId(1), QubitId(0)])])
            .unwrap();
        assert!((u[[3, 2]] - Complex64::new(1.0, 0.0)).norm() < 1e-12);
        assert!((u[[1, 1]] - Complex64::new(1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_global_phase_ignored() {
        // rz(θ) and p(θ) differ by e^{-iθ/2}.
        let rz = sequence_unitary(1, &[Instruction::gate(StandardGate::Rz(0.9.into()), [QubitId(0)])])
            .unwrap();
        let p = sequence_unitary(1, &[Instruction::gate(StandardGate::P(0.9.into()), [QubitId(0)])])
            .unwrap();
        assert!(equivalent_up_to_phase(&rz, &p, EQUIVALENCE_TOLERANCE));
        assert_ne!(rz, p);
    }

    #[test]
    fn test_different_unitaries_rejected() {
        let x = sequence_unitary(1, &[Instruction::gate(StandardGate::X, [QubitId(0)])]).unwrap();
        let z = sequence_unitary(1, &[Instruction::gate(StandardGate::Z, [QubitId(0)])]).unwrap();
        assert!(!equivalent_up_to_phase(&x, &z, EQUIVALENCE_TOLERANCE));
    }

    #[test]
    fn test_verify_bell_against_itself() {
        let bell = Circuit::bell().unwrap();
        assert_eq!(verify_equivalence(&bell, &bell).unwrap(), Verification::Equivalent);
    }

    #[test]
    fn test_verify_detects_changed_gate() {
        let bell = Circuit::bell().unwrap();
        let mut other = Circuit::with_size("bell", 2, 2);
        other.x(QubitId(0)).unwrap().cx(QubitId(0), QubitId(1)).unwrap();
        other.measure_all().unwrap();
        assert!(matches!(
            verify_equivalence(&bell, &other).unwrap(),
            Verification::Mismatch(_)
        ));
    }

    #[test]
    fn test_verify_detects_moved_measurement() {
        let mut a = Circuit::with_size("m", 1, 1);
        a.h(QubitId(0)).unwrap().measure(QubitId(0), ClbitId(0)).unwrap();
        let mut b = Circuit::with_size("m", 1, 1);
        b.measure(QubitId(0), ClbitId(0)).unwrap().h(QubitId(0)).unwrap();
        assert!(matches!(verify_equivalence(&a, &b).unwrap(), Verification::Mismatch(_)));
    }

    #[test]
    fn test_verify_skips_large_registers() {
        let a = Circuit::ghz(12).unwrap();
        assert_eq!(
            verify_equivalence(&a, &a).unwrap(),
            Verification::Skipped { qubits: 12 }
        );
    }
}
