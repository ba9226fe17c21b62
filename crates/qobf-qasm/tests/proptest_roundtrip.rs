//! Property-based tests for format round trips.
//!
//! Circuit → text → circuit must reproduce the instruction list exactly,
//! angle expressions included.

use proptest::prelude::*;
use qobf_ir::{Angle, Circuit, QubitId, StandardGate};
use qobf_qasm::{CircuitFormat, emit_python, emit_qasm2, parse, parse_python};

/// Generate a random circuit for property testing.
///
/// Generates circuits with:
/// - 1-5 qubits
/// - 1-12 gates from a mixed gate set, some with angle expressions
/// - a terminal measurement of every qubit
fn arb_circuit() -> impl Strategy<Value = Circuit> {
    (1_u32..=5).prop_flat_map(|num_qubits| {
        prop::collection::vec(arb_gate_op(num_qubits), 1..=12).prop_map(move |ops| {
            let mut circuit = Circuit::with_size("circuit", num_qubits, num_qubits);
            for op in ops {
                op.apply(&mut circuit);
            }
            let _ = circuit.measure_all();
            circuit
        })
    })
}

/// Gate operations that can be applied to a circuit.
#[derive(Debug, Clone)]
enum GateOp {
    H(u32),
    Sdg(u32),
    Rz(Angle, u32),
    U(Angle, u32),
    CX(u32, u32),
    Rzz(Angle, u32, u32),
}

impl GateOp {
    fn apply(self, circuit: &mut Circuit) {
        let _ = match self {
            GateOp::H(q) => circuit.h(QubitId(q)),
            GateOp::Sdg(q) => circuit.apply(StandardGate::Sdg, [QubitId(q)]),
            GateOp::Rz(a, q) => circuit.rz(a, QubitId(q)),
            GateOp::U(a, q) => circuit.apply(
                StandardGate::U(a.clone(), a.negated(), Angle::pi_over(2)),
                [QubitId(q)],
            ),
            GateOp::CX(a, b) => circuit.cx(QubitId(a), QubitId(b)),
            GateOp::Rzz(t, a, b) => circuit.apply(StandardGate::RZZ(t), [QubitId(a), QubitId(b)]),
        };
    }
}

/// Angles as the rewriting passes produce them: literals, fractions of pi,
/// negations and halvings.
fn arb_angle() -> impl Strategy<Value = Angle> {
    let leaf = prop_oneof![
        (1_u32..=16).prop_map(Angle::pi_over),
        (-300_i32..300).prop_map(|v| Angle::value(f64::from(v) / 100.0)),
    ];
    leaf.prop_recursive(3, 8, 1, |inner| {
        prop_oneof![
            inner.clone().prop_map(|a| a.negated()),
            inner.prop_map(|a| a.halved()),
        ]
    })
}

/// Generate a random gate operation for a circuit with given number of qubits.
fn arb_gate_op(num_qubits: u32) -> impl Strategy<Value = GateOp> {
    let one = prop_oneof![
        (0..num_qubits).prop_map(GateOp::H),
        (0..num_qubits).prop_map(GateOp::Sdg),
        (arb_angle(), 0..num_qubits).prop_map(|(a, q)| GateOp::Rz(a, q)),
        (arb_angle(), 0..num_qubits).prop_map(|(a, q)| GateOp::U(a, q)),
    ];
    if num_qubits < 2 {
        one.boxed()
    } else {
        prop_oneof![
            one,
            (0..num_qubits, 0..num_qubits)
                .prop_filter("distinct qubits", |(a, b)| a != b)
                .prop_map(|(a, b)| GateOp::CX(a, b)),
            (arb_angle(), 0..num_qubits, 0..num_qubits)
                .prop_filter("distinct qubits", |(_, a, b)| a != b)
                .prop_map(|(t, a, b)| GateOp::Rzz(t, a, b)),
        ]
        .boxed()
    }
}

proptest! {
    #[test]
    fn qasm_round_trip_is_exact(circuit in arb_circuit()) {
        let qasm = emit_qasm2(&circuit);
        let parsed = parse(&qasm).expect("emitted QASM parses");

        prop_assert_eq!(parsed.num_qubits(), circuit.num_qubits());
        prop_assert_eq!(parsed.num_clbits(), circuit.num_clbits());
        prop_assert_eq!(parsed.instructions(), circuit.instructions());
    }

    #[test]
    fn python_round_trip_is_exact(circuit in arb_circuit()) {
        let script = emit_python(&circuit);
        let parsed = parse_python(&script).expect("emitted script parses");
        prop_assert_eq!(parsed, circuit);
    }

    #[test]
    fn json_round_trip_is_exact(circuit in arb_circuit()) {
        let text = CircuitFormat::Json.emit(&circuit).unwrap();
        let parsed = CircuitFormat::Json.parse(&text).unwrap();
        prop_assert_eq!(parsed, circuit);
    }
}
