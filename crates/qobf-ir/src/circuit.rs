//! The circuit entity: an ordered instruction list over a fixed register.

use serde::{Deserialize, Serialize};

use crate::angle::Angle;
use crate::dag::CircuitDag;
use crate::error::{IrError, IrResult};
use crate::gate::StandardGate;
use crate::instruction::{Instruction, InstructionKind};
use crate::qubit::{ClbitId, QubitId};

/// A quantum circuit.
///
/// The register sizes are fixed at construction and every operand appended
/// afterwards is checked against them, so a `Circuit` value never holds an
/// out-of-range qubit. Instructions are only ever appended; rewriting
/// algorithms build a fresh circuit with [`Circuit::empty_like`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCircuit")]
pub struct Circuit {
    name: String,
    num_qubits: u32,
    num_clbits: u32,
    instructions: Vec<Instruction>,
}

/// Unchecked serde mirror of [`Circuit`].
#[derive(Deserialize)]
struct RawCircuit {
    name: String,
    num_qubits: u32,
    #[serde(default)]
    num_clbits: u32,
    #[serde(default)]
    instructions: Vec<Instruction>,
}

impl TryFrom<RawCircuit> for Circuit {
    type Error = IrError;

    fn try_from(raw: RawCircuit) -> IrResult<Self> {
        let mut circuit = Circuit::with_size(raw.name, raw.num_qubits, raw.num_clbits);
        circuit.extend(raw.instructions)?;
        Ok(circuit)
    }
}

impl Circuit {
    /// Create an empty circuit with fixed register sizes.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            num_clbits,
            instructions: Vec::new(),
        }
    }

    /// An empty circuit with the same name and register sizes.
    pub fn empty_like(&self) -> Self {
        Self::with_size(self.name.clone(), self.num_qubits, self.num_clbits)
    }

    /// Append an instruction after checking its operands.
    pub fn push(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        self.check(&instruction)?;
        self.instructions.push(instruction);
        Ok(self)
    }

    /// Append every instruction in order, stopping at the first invalid one.
    pub fn extend(&mut self, instructions: impl IntoIterator<Item = Instruction>) -> IrResult<()> {
        for instruction in instructions {
            self.push(instruction)?;
        }
        Ok(())
    }

    /// Append a gate on the given qubits.
    pub fn apply(
        &mut self,
        gate: StandardGate,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.push(Instruction::gate(gate, qubits))
    }

    fn check(&self, instruction: &Instruction) -> IrResult<()> {
        let gate_name = instruction.as_gate().map(|g| g.name().to_string());

        if let InstructionKind::Gate(gate) = &instruction.kind {
            let expected = gate.num_qubits();
            if instruction.qubits.len() != expected as usize {
                return Err(IrError::QubitCountMismatch {
                    gate_name: gate.name().to_string(),
                    expected,
                    got: u32::try_from(instruction.qubits.len()).unwrap_or(u32::MAX),
                });
            }
        }

        for (i, &qubit) in instruction.qubits.iter().enumerate() {
            if qubit.0 >= self.num_qubits {
                return Err(IrError::QubitOutOfBounds {
                    qubit,
                    size: self.num_qubits,
                    gate_name,
                });
            }
            if instruction.qubits[..i].contains(&qubit) {
                return Err(IrError::DuplicateQubit { qubit, gate_name });
            }
        }

        match instruction.kind {
            InstructionKind::Measure => {
                if instruction.qubits.len() != instruction.clbits.len()
                    || instruction.qubits.is_empty()
                {
                    return Err(IrError::MeasureArity {
                        qubits: instruction.qubits.len(),
                        clbits: instruction.clbits.len(),
                    });
                }
            }
            InstructionKind::Reset if instruction.qubits.len() != 1 => {
                return Err(IrError::QubitCountMismatch {
                    gate_name: "reset".into(),
                    expected: 1,
                    got: u32::try_from(instruction.qubits.len()).unwrap_or(u32::MAX),
                });
            }
            _ => {}
        }

        for &clbit in &instruction.clbits {
            if clbit.0 >= self.num_clbits {
                return Err(IrError::ClbitOutOfBounds {
                    clbit,
                    size: self.num_clbits,
                });
            }
        }
        Ok(())
    }

    // =========================================================================
    // Gate shorthands
    // =========================================================================

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::H, [qubit])
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::X, [qubit])
    }

    /// Apply Pauli-Z gate.
    pub fn z(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::Z, [qubit])
    }

    /// Apply S gate.
    pub fn s(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::S, [qubit])
    }

    /// Apply T gate.
    pub fn t(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::T, [qubit])
    }

    /// Apply RX rotation.
    pub fn rx(&mut self, theta: impl Into<Angle>, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::Rx(theta.into()), [qubit])
    }

    /// Apply RY rotation.
    pub fn ry(&mut self, theta: impl Into<Angle>, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::Ry(theta.into()), [qubit])
    }

    /// Apply RZ rotation.
    pub fn rz(&mut self, theta: impl Into<Angle>, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::Rz(theta.into()), [qubit])
    }

    /// Apply CNOT gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::CX, [control, target])
    }

    /// Apply CZ gate.
    pub fn cz(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::CZ, [control, target])
    }

    /// Apply SWAP gate.
    pub fn swap(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::Swap, [q1, q2])
    }

    /// Apply Toffoli gate.
    pub fn ccx(&mut self, c1: QubitId, c2: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::CCX, [c1, c2, target])
    }

    /// Measure a qubit into a classical bit.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.push(Instruction::measure(qubit, clbit))
    }

    /// Measure qubit `i` into classical bit `i` for every qubit.
    ///
    /// Requires at least as many classical bits as qubits.
    pub fn measure_all(&mut self) -> IrResult<&mut Self> {
        for i in 0..self.num_qubits {
            self.measure(QubitId(i), ClbitId(i))?;
        }
        Ok(self)
    }

    /// Reset a qubit.
    pub fn reset(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::reset(qubit))
    }

    /// Barrier across every qubit.
    pub fn barrier_all(&mut self) -> IrResult<&mut Self> {
        self.push(Instruction::barrier((0..self.num_qubits).map(QubitId)))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the circuit.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Size of the qubit register.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits as usize
    }

    /// Size of the classical register.
    pub fn num_clbits(&self) -> usize {
        self.num_clbits as usize
    }

    /// The instructions in program order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Consume the circuit, returning its instructions.
    pub fn into_instructions(self) -> Vec<Instruction> {
        self.instructions
    }

    /// Number of instructions, including measurements and barriers.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Check if the circuit has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Number of unitary gates.
    pub fn gate_count(&self) -> usize {
        self.instructions.iter().filter(|i| i.is_gate()).count()
    }

    /// Iterate over the qubit register.
    pub fn qubits(&self) -> impl Iterator<Item = QubitId> + '_ {
        (0..self.num_qubits).map(QubitId)
    }

    /// Circuit depth (barriers do not count as a layer).
    pub fn depth(&self) -> usize {
        CircuitDag::from_circuit(self).depth()
    }

    /// Build the dependency DAG of this circuit.
    pub fn dag(&self) -> CircuitDag {
        CircuitDag::from_circuit(self)
    }

    // =========================================================================
    // Common circuits
    // =========================================================================

    /// Create a Bell state circuit with measurement.
    pub fn bell() -> IrResult<Self> {
        let mut circuit = Circuit::with_size("bell", 2, 2);
        circuit.h(QubitId(0))?.cx(QubitId(0), QubitId(1))?;
        circuit.measure_all()?;
        Ok(circuit)
    }

    /// Create a GHZ state circuit on `n` qubits, without measurement.
    pub fn ghz(n: u32) -> IrResult<Self> {
        let mut circuit = Circuit::with_size(format!("ghz_{n}"), n, n);
        if n == 0 {
            return Ok(circuit);
        }
        circuit.h(QubitId(0))?;
        for i in 1..n {
            circuit.cx(QubitId(i - 1), QubitId(i))?;
        }
        Ok(circuit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bell_state() {
        let circuit = Circuit::bell().unwrap();
        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(circuit.num_clbits(), 2);
        assert_eq!(circuit.len(), 4);
        assert_eq!(circuit.gate_count(), 2);
        assert_eq!(circuit.depth(), 3);
    }

    #[test]
    fn test_out_of_bounds_qubit_rejected() {
        let mut circuit = Circuit::with_size("small", 2, 0);
        let err = circuit.cx(QubitId(0), QubitId(2)).unwrap_err();
        assert!(matches!(err, IrError::QubitOutOfBounds { size: 2, .. }));
        assert!(circuit.is_empty());
    }

    #[test]
    fn test_arity_checked() {
        let mut circuit = Circuit::with_size("c", 3, 0);
        let err = circuit.apply(StandardGate::CX, [QubitId(0)]).unwrap_err();
        assert!(matches!(err, IrError::QubitCountMismatch { expected: 2, got: 1, .. }));
    }

    #[test]
    fn test_duplicate_qubit_rejected() {
        let mut circuit = Circuit::with_size("c", 2, 0);
        let err = circuit.cx(QubitId(1), QubitId(1)).unwrap_err();
        assert!(matches!(err, IrError::DuplicateQubit { .. }));
    }

    #[test]
    fn test_measure_needs_clbits() {
        let mut circuit = Circuit::with_size("c", 2, 1);
        assert!(circuit.measure(QubitId(0), ClbitId(0)).is_ok());
        assert!(matches!(
            circuit.measure(QubitId(1), ClbitId(1)),
            Err(IrError::ClbitOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_empty_like_keeps_register() {
        let circuit = Circuit::ghz(3).unwrap();
        let fresh = circuit.empty_like();
        assert_eq!(fresh.num_qubits(), 3);
        assert_eq!(fresh.num_clbits(), 3);
        assert_eq!(fresh.name(), circuit.name());
        assert!(fresh.is_empty());
    }

    #[test]
    fn test_json_round_trip_is_validated() {
        let circuit = Circuit::bell().unwrap();
        let json = serde_json::to_string(&circuit).unwrap();
        let back: Circuit = serde_json::from_str(&json).unwrap();
        assert_eq!(back, circuit);

        let bad = r#"{"name":"bad","num_qubits":1,"instructions":[
            {"kind":{"Gate":"CX"},"qubits":[0,1]}]}"#;
        assert!(serde_json::from_str::<Circuit>(bad).is_err());
    }
}
