//! End-to-end layering scenarios on small named circuits.

use qobf_compile::unitary::{EQUIVALENCE_TOLERANCE, equivalent_up_to_phase, sequence_unitary};
use qobf_compile::{
    CompileError, LayerPlan, NullSink, ObfuscationEvent, RecordingSink, ValidationError,
    Verification, verify_equivalence,
};
use qobf_ir::{Circuit, ClbitId, QubitId};

fn h_cx() -> Circuit {
    let mut c = Circuit::with_size("hcx", 2, 0);
    c.h(QubitId(0)).unwrap();
    c.cx(QubitId(0), QubitId(1)).unwrap();
    c
}

// ============================================================================
// Inverse pairs on H, CNOT
// ============================================================================

#[test]
fn test_inverse_full_density_on_h_cx() {
    let c = h_cx();
    let out = LayerPlan::parse(["inverse:density=1.0"])
        .unwrap()
        .apply(&c, &mut NullSink)
        .unwrap();

    assert!(out.depth() >= 4, "depth {} < 4", out.depth());
    assert_eq!(&out.instructions()[..1], &c.instructions()[..1]);
    assert!(out.instructions().iter().any(|i| i == &c.instructions()[1]));

    let before = sequence_unitary(2, c.instructions()).unwrap();
    let after = sequence_unitary(2, out.instructions()).unwrap();
    assert!(equivalent_up_to_phase(&before, &after, EQUIVALENCE_TOLERANCE));
}

// ============================================================================
// Identity and atomicity
// ============================================================================

#[test]
fn test_empty_plan_returns_input() {
    let mut c = Circuit::ghz(3).unwrap();
    c.measure_all().unwrap();
    let out = LayerPlan::new().apply(&c, &mut NullSink).unwrap();
    assert_eq!(out, c);
}

#[test]
fn test_empty_circuit_through_every_algorithm() {
    let empty = Circuit::with_size("empty", 2, 0);
    let plan = LayerPlan::parse([
        "cloaked:probability=1",
        "inverse:density=1,level=heavy",
        "delayed:probability=1",
        "composite:density=1",
    ])
    .unwrap();
    assert_eq!(plan.apply(&empty, &mut NullSink).unwrap(), empty);
}

#[test]
fn test_unknown_algorithm_names_stage() {
    let err = LayerPlan::parse(["cloaked", "delayed", "simple_entanglement"]).unwrap_err();
    assert!(matches!(
        err,
        CompileError::InvalidStage {
            index: 2,
            source: ValidationError::UnknownAlgorithm { .. }
        }
    ));
    assert!(err.to_string().starts_with("Stage 2:"));
}

// ============================================================================
// Measurements and registers
// ============================================================================

#[test]
fn test_skeleton_survives_every_algorithm() {
    let mut c = Circuit::with_size("mid", 3, 2);
    c.h(QubitId(0)).unwrap();
    c.cx(QubitId(0), QubitId(1)).unwrap();
    c.measure(QubitId(1), ClbitId(0)).unwrap();
    c.reset(QubitId(1)).unwrap();
    c.rx(0.75, QubitId(1)).unwrap();
    c.barrier_all().unwrap();
    c.ccx(QubitId(0), QubitId(1), QubitId(2)).unwrap();
    c.measure(QubitId(2), ClbitId(1)).unwrap();

    let plan = LayerPlan::parse([
        "composite:density=0.5",
        "delayed:probability=0.7",
        "inverse:density=0.6,level=medium",
        "cloaked:probability=0.8",
    ])
    .unwrap();
    let mut sink = RecordingSink::new();
    let out = plan.apply(&c, &mut sink).unwrap();

    assert_eq!(out.num_qubits(), 3);
    assert_eq!(out.num_clbits(), 2);
    assert_eq!(verify_equivalence(&c, &out).unwrap(), Verification::Equivalent);

    let finished = sink
        .events()
        .iter()
        .filter(|e| matches!(e, ObfuscationEvent::StageFinished { .. }))
        .count();
    assert_eq!(finished, 4);
}
