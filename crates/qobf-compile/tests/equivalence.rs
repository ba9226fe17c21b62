//! Property tests: every pass and every layer plan preserves the circuit's
//! unitary up to global phase, and layering is sequential application.

use proptest::prelude::*;

use qobf_compile::unitary::{EQUIVALENCE_TOLERANCE, equivalent_up_to_phase, sequence_unitary};
use qobf_compile::{AlgorithmSpec, LayerPlan, NullSink, Verification, verify_equivalence};
use qobf_ir::{Angle, Circuit, QubitId, StandardGate};

const QUBITS: u32 = 3;

fn arb_angle() -> impl Strategy<Value = Angle> {
    prop_oneof![
        (-3.0..3.0f64).prop_map(Angle::value),
        (1u32..9).prop_map(Angle::pi_over),
        (1u32..9).prop_map(|d| Angle::pi_over(d).negated()),
    ]
}

fn arb_gate() -> impl Strategy<Value = (StandardGate, usize)> {
    prop_oneof![
        Just((StandardGate::X, 1)),
        Just((StandardGate::Y, 1)),
        Just((StandardGate::H, 1)),
        Just((StandardGate::S, 1)),
        Just((StandardGate::Tdg, 1)),
        Just((StandardGate::SX, 1)),
        arb_angle().prop_map(|a| (StandardGate::Rx(a), 1)),
        arb_angle().prop_map(|a| (StandardGate::Ry(a), 1)),
        arb_angle().prop_map(|a| (StandardGate::Rz(a), 1)),
        arb_angle().prop_map(|a| (StandardGate::P(a), 1)),
        (arb_angle(), arb_angle(), arb_angle())
            .prop_map(|(t, p, l)| (StandardGate::U(t, p, l), 1)),
        Just((StandardGate::CX, 2)),
        Just((StandardGate::CY, 2)),
        Just((StandardGate::CZ, 2)),
        Just((StandardGate::Swap, 2)),
        arb_angle().prop_map(|a| (StandardGate::CP(a), 2)),
        arb_angle().prop_map(|a| (StandardGate::CRz(a), 2)),
        arb_angle().prop_map(|a| (StandardGate::RZZ(a), 2)),
        Just((StandardGate::CCX, 3)),
    ]
}

fn arb_circuit() -> impl Strategy<Value = Circuit> {
    let order = Just((0..QUBITS).collect::<Vec<u32>>()).prop_shuffle();
    let op = (arb_gate(), order);
    prop::collection::vec(op, 0..12).prop_map(|ops| {
        let mut circuit = Circuit::with_size("prop", QUBITS, 0);
        for ((gate, arity), order) in ops {
            let qubits: Vec<QubitId> = order.into_iter().take(arity).map(QubitId).collect();
            circuit.apply(gate, qubits).unwrap();
        }
        circuit
    })
}

fn arb_spec() -> impl Strategy<Value = AlgorithmSpec> {
    let fraction = 0.0..=1.0f64;
    prop_oneof![
        fraction.clone().prop_map(|p| AlgorithmSpec::parse(&format!("cloaked:probability={p}")).unwrap()),
        (fraction.clone(), prop_oneof![Just("light"), Just("medium"), Just("heavy")]).prop_map(
            |(d, level)| AlgorithmSpec::parse(&format!("inverse:density={d},level={level}")).unwrap()
        ),
        fraction.clone().prop_map(|p| AlgorithmSpec::parse(&format!("delayed:probability={p}")).unwrap()),
        fraction.prop_map(|d| AlgorithmSpec::parse(&format!("composite:density={d}")).unwrap()),
    ]
}

fn unitary(circuit: &Circuit) -> ndarray::Array2<num_complex::Complex64> {
    sequence_unitary(circuit.num_qubits(), circuit.instructions()).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_every_algorithm_preserves_unitary(circuit in arb_circuit(), spec in arb_spec()) {
        let plan = LayerPlan::from_specs(vec![spec]).unwrap().with_verification(false);
        let out = plan.apply(&circuit, &mut NullSink).unwrap();

        prop_assert_eq!(out.num_qubits(), circuit.num_qubits());
        prop_assert!(equivalent_up_to_phase(&unitary(&out), &unitary(&circuit), EQUIVALENCE_TOLERANCE));
    }

    #[test]
    fn prop_layering_is_sequential(
        circuit in arb_circuit(),
        specs in prop::collection::vec(arb_spec(), 0..4),
    ) {
        let all_at_once = LayerPlan::from_specs(specs.clone()).unwrap().apply(&circuit, &mut NullSink).unwrap();

        let mut one_by_one = circuit.clone();
        for spec in specs {
            one_by_one = LayerPlan::from_specs(vec![spec]).unwrap().apply(&one_by_one, &mut NullSink).unwrap();
        }

        prop_assert_eq!(&all_at_once, &one_by_one);
        prop_assert_eq!(verify_equivalence(&circuit, &all_at_once).unwrap(), Verification::Equivalent);
    }

    #[test]
    fn prop_empty_circuit_unchanged(spec in arb_spec()) {
        let empty = Circuit::with_size("empty", QUBITS, 0);
        let out = LayerPlan::from_specs(vec![spec]).unwrap().apply(&empty, &mut NullSink).unwrap();
        prop_assert_eq!(out, empty);
    }

    #[test]
    fn prop_validation_idempotent(spec in arb_spec()) {
        prop_assert!(spec.validate().is_ok());
        prop_assert!(spec.validate().is_ok());
        let reparsed = AlgorithmSpec::parse(&spec.to_string()).unwrap();
        prop_assert_eq!(reparsed, spec);
    }
}
