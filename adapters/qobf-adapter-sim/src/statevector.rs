//! Statevector simulation engine.

use ndarray::Array2;
use num_complex::Complex64;
use rand::Rng;

use qobf_hal::{HalError, HalResult};
use qobf_ir::{Instruction, InstructionKind, StandardGate};

/// Amplitudes below this norm are treated as zero when deciding whether a
/// reset is deterministic.
const RESET_EPSILON: f64 = 1e-12;

/// A statevector representing a quantum state.
pub struct Statevector {
    /// The state amplitudes (2^n complex numbers).
    amplitudes: Vec<Complex64>,
    /// Number of qubits.
    num_qubits: usize,
    /// Qubits that have been read out.
    measured: Vec<bool>,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let size = 1 << num_qubits;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); size];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            amplitudes,
            num_qubits,
            measured: vec![false; num_qubits],
        }
    }

    /// The amplitudes, qubit `k` as bit `k` of the index.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Consume the state, returning its amplitudes.
    pub fn into_amplitudes(self) -> Vec<Complex64> {
        self.amplitudes
    }

    /// Apply an instruction to the statevector.
    pub fn apply(&mut self, instruction: &Instruction) -> HalResult<()> {
        let qubits: Vec<usize> = instruction.qubits.iter().map(|q| q.index()).collect();
        match &instruction.kind {
            InstructionKind::Gate(gate) => {
                self.check_unmeasured(gate.name(), &qubits)?;
                self.apply_gate(gate, &qubits)
            }
            InstructionKind::Reset => {
                self.check_unmeasured("reset", &qubits)?;
                self.reset(qubits[0])
            }
            InstructionKind::Measure => {
                for q in qubits {
                    self.measured[q] = true;
                }
                Ok(())
            }
            InstructionKind::Barrier => Ok(()),
        }
    }

    fn check_unmeasured(&self, name: &str, qubits: &[usize]) -> HalResult<()> {
        match qubits.iter().find(|&&q| self.measured[q]) {
            Some(q) => Err(HalError::Unsupported(format!(
                "{name} on qubit {q} after it was measured"
            ))),
            None => Ok(()),
        }
    }

    /// Apply a standard gate.
    fn apply_gate(&mut self, gate: &StandardGate, qubits: &[usize]) -> HalResult<()> {
        match gate {
            StandardGate::I => {}
            StandardGate::X => self.apply_x(qubits[0]),
            StandardGate::H => self.apply_h(qubits[0]),
            StandardGate::CX => self.apply_cx(qubits[0], qubits[1]),
            StandardGate::CZ => self.apply_cz(qubits[0], qubits[1]),
            _ => {
                let matrix = gate.matrix()?;
                self.apply_matrix(&matrix, qubits);
            }
        }
        Ok(())
    }

    // =========================================================================
    // Gate kernels
    // =========================================================================

    fn apply_x(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for i in 0..(1 << self.num_qubits) {
            if i & mask == 0 {
                self.amplitudes.swap(i, i | mask);
            }
        }
    }

    fn apply_h(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        let sqrt2_inv = std::f64::consts::FRAC_1_SQRT_2;
        for i in 0..(1 << self.num_qubits) {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = sqrt2_inv * (a + b);
                self.amplitudes[j] = sqrt2_inv * (a - b);
            }
        }
    }

    fn apply_cx(&mut self, control: usize, target: usize) {
        let ctrl_mask = 1 << control;
        let tgt_mask = 1 << target;
        for i in 0..(1 << self.num_qubits) {
            if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
                self.amplitudes.swap(i, i | tgt_mask);
            }
        }
    }

    fn apply_cz(&mut self, control: usize, target: usize) {
        let mask = (1 << control) | (1 << target);
        for i in 0..(1 << self.num_qubits) {
            if i & mask == mask {
                self.amplitudes[i] = -self.amplitudes[i];
            }
        }
    }

    /// Apply a `2^k × 2^k` matrix whose index bit `j` is operand `qubits[j]`.
    fn apply_matrix(&mut self, matrix: &Array2<Complex64>, qubits: &[usize]) {
        let dim = 1 << qubits.len();
        let operand_mask: usize = qubits.iter().map(|q| 1_usize << q).sum();
        let offsets: Vec<usize> = (0..dim)
            .map(|local| {
                qubits
                    .iter()
                    .enumerate()
                    .filter(|(bit, _)| (local >> bit) & 1 == 1)
                    .map(|(_, q)| 1_usize << q)
                    .sum()
            })
            .collect();

        let mut local = vec![Complex64::new(0.0, 0.0); dim];
        for base in 0..(1 << self.num_qubits) {
            if base & operand_mask != 0 {
                continue;
            }
            for (slot, offset) in local.iter_mut().zip(&offsets) {
                *slot = self.amplitudes[base | offset];
            }
            for (row, offset) in offsets.iter().enumerate() {
                self.amplitudes[base | offset] =
                    (0..dim).map(|col| matrix[[row, col]] * local[col]).sum();
            }
        }
    }

    /// Reset a qubit to |0⟩. Only defined here when the qubit is already in a
    /// basis state; a superposed or entangled qubit would need a mixed state.
    fn reset(&mut self, qubit: usize) -> HalResult<()> {
        let mask = 1 << qubit;
        let weight_one: f64 = self
            .amplitudes
            .iter()
            .enumerate()
            .filter(|(i, _)| i & mask != 0)
            .map(|(_, a)| a.norm_sqr())
            .sum();

        if weight_one < RESET_EPSILON {
            Ok(())
        } else if 1.0 - weight_one < RESET_EPSILON {
            self.apply_x(qubit);
            Ok(())
        } else {
            Err(HalError::Unsupported(format!(
                "reset of qubit {qubit} in superposition"
            )))
        }
    }

    /// Sample a basis state index.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> usize {
        let r: f64 = rng.r#gen();

        let mut cumulative = 0.0;
        for (i, amp) in self.amplitudes.iter().enumerate() {
            cumulative += amp.norm_sqr();
            if r < cumulative {
                return i;
            }
        }

        // Rounding can leave the total just below 1.
        self.amplitudes
            .iter()
            .rposition(|a| a.norm_sqr() > 0.0)
            .unwrap_or(0)
    }
}
