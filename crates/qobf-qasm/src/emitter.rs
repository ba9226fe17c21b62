//! QASM2 emitter for serializing circuits.

use qobf_ir::{Circuit, Instruction, InstructionKind};

/// Emit a circuit as `OpenQASM` 2.0 source code.
///
/// The output declares one `q` and one `c` register and includes
/// `qelib1.inc`. Angles are written as the expressions the circuit carries,
/// so a parse/emit cycle does not round them.
pub fn emit_qasm2(circuit: &Circuit) -> String {
    let mut emitter = Qasm2Emitter::new();
    emitter.emit_circuit(circuit);
    emitter.output
}

struct Qasm2Emitter {
    output: String,
}

impl Qasm2Emitter {
    fn new() -> Self {
        Self {
            output: String::new(),
        }
    }

    fn writeln(&mut self, line: &str) {
        self.output.push_str(line);
        self.output.push('\n');
    }

    fn emit_circuit(&mut self, circuit: &Circuit) {
        self.writeln("OPENQASM 2.0;");
        self.writeln("include \"qelib1.inc\";");

        self.writeln(&format!("qreg q[{}];", circuit.num_qubits()));
        if circuit.num_clbits() > 0 {
            self.writeln(&format!("creg c[{}];", circuit.num_clbits()));
        }

        for instruction in circuit.instructions() {
            self.emit_instruction(instruction);
        }
    }

    fn emit_instruction(&mut self, instruction: &Instruction) {
        let qubits = instruction
            .qubits
            .iter()
            .map(|q| format!("q[{}]", q.0))
            .collect::<Vec<_>>()
            .join(", ");

        match &instruction.kind {
            InstructionKind::Gate(gate) => {
                let angles = gate.angles();
                if angles.is_empty() {
                    self.writeln(&format!("{} {qubits};", gate.name()));
                } else {
                    let params = angles
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", ");
                    self.writeln(&format!("{}({params}) {qubits};", gate.name()));
                }
            }
            InstructionKind::Measure => {
                for (q, c) in instruction.qubits.iter().zip(&instruction.clbits) {
                    self.writeln(&format!("measure q[{}] -> c[{}];", q.0, c.0));
                }
            }
            InstructionKind::Reset => {
                self.writeln(&format!("reset {qubits};"));
            }
            InstructionKind::Barrier => {
                if !instruction.qubits.is_empty() {
                    self.writeln(&format!("barrier {qubits};"));
                }
            }
        }
    }
}
