//! Orchestrator runs from request to written output.

use std::fs;
use std::path::PathBuf;

use qobf_compile::{
    CompileError, ObfuscationEvent, RecordingSink, ValidationError, Verification,
    verify_equivalence,
};
use qobf_engine::{
    Artifact, EngineConfig, EngineError, EngineState, FsWriter, MemoryWriter, Mode, Orchestrator,
    Request,
};
use qobf_guard::{GuardError, Route};
use qobf_qasm::CircuitFormat;

const BELL: &str = r#"OPENQASM 2.0;
include "qelib1.inc";
qreg q[2];
creg c[2];
h q[0];
cx q[0],q[1];
measure q[0] -> c[0];
measure q[1] -> c[1];
"#;

const GHZ3: &str = r#"OPENQASM 2.0;
include "qelib1.inc";
qreg q[3];
h q[0];
cx q[0],q[1];
cx q[1],q[2];
"#;

fn request(mode: Mode, input: &str, source: &str, algorithms: &[&str]) -> Request {
    Request {
        input: PathBuf::from(input),
        source: source.to_string(),
        mode,
        algorithms: algorithms.iter().map(|s| s.to_string()).collect(),
        output: None,
    }
}

fn transitions(sink: &RecordingSink) -> Vec<(&'static str, &'static str)> {
    sink.events()
        .iter()
        .filter_map(|e| match e {
            ObfuscationEvent::StateChanged { from, to } => Some((*from, *to)),
            _ => None,
        })
        .collect()
}

// ============================================================================
// Quantum mode
// ============================================================================

#[test]
fn test_quantum_layers_keep_the_circuit() {
    let req = request(
        Mode::Quantum,
        "bell.qasm",
        BELL,
        &["cloaked", "inverse:density=0.5", "composite"],
    );
    let mut writer = MemoryWriter::new();
    let mut sink = RecordingSink::new();
    let mut engine = Orchestrator::new(EngineConfig::default());

    let outcome = engine.run(&req, &mut writer, &mut sink).unwrap();
    assert_eq!(outcome.path, PathBuf::from("bell_obfuscated.qasm"));
    assert!(engine.state().is_success());

    let input = CircuitFormat::Qasm2.parse(BELL).unwrap();
    let Artifact::Circuit(output) = &outcome.artifact else {
        panic!("expected a circuit");
    };
    assert!(matches!(
        verify_equivalence(&input, output).unwrap(),
        Verification::Equivalent
    ));

    let text = writer.get(&outcome.path).unwrap();
    assert_eq!(text.len(), outcome.bytes);
    let reparsed = CircuitFormat::Qasm2.parse(text).unwrap();
    assert_eq!(reparsed.num_qubits(), 2);
    assert_eq!(reparsed.num_clbits(), 2);

    assert_eq!(
        transitions(&sink),
        vec![
            ("Idle", "ModeSelected"),
            ("ModeSelected", "AlgorithmsResolved"),
            ("AlgorithmsResolved", "Transformed"),
            ("Transformed", "Written"),
        ]
    );
}

#[test]
fn test_quantum_explicit_output_path() {
    let mut req = request(Mode::Quantum, "bell.qasm", BELL, &["delayed"]);
    req.output = Some(PathBuf::from("out/custom.qasm"));
    let mut writer = MemoryWriter::new();

    let outcome = Orchestrator::new(EngineConfig::default())
        .run(&req, &mut writer, &mut RecordingSink::new())
        .unwrap();
    assert_eq!(outcome.path, PathBuf::from("out/custom.qasm"));
    assert!(writer.get("out/custom.qasm").is_some());
}

#[test]
fn test_quantum_unknown_algorithm_writes_nothing() {
    let req = request(Mode::Quantum, "bell.qasm", BELL, &["cloaked", "scramble"]);
    let mut writer = MemoryWriter::new();
    let mut sink = RecordingSink::new();
    let mut engine = Orchestrator::new(EngineConfig::default());

    let err = engine.run(&req, &mut writer, &mut sink).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Compile(CompileError::InvalidStage { index: 1, .. })
    ));
    assert!(writer.is_empty());
    assert_eq!(
        transitions(&sink).last(),
        Some(&("ModeSelected", "Failed"))
    );
    match engine.state() {
        EngineState::Failed { reason } => assert!(reason.contains("scramble"), "{reason}"),
        other => panic!("unexpected state {other}"),
    }
}

#[test]
fn test_quantum_too_many_qubits() {
    let config = EngineConfig {
        max_qubits: 2,
        ..EngineConfig::default()
    };
    let req = request(Mode::Quantum, "ghz.qasm", GHZ3, &["cloaked"]);
    let mut writer = MemoryWriter::new();

    let err = Orchestrator::new(config)
        .run(&req, &mut writer, &mut RecordingSink::new())
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Validation(ValidationError::TooManyQubits {
            qubits: 3,
            limit: 2
        })
    ));
    assert!(writer.is_empty());
}

#[test]
fn test_quantum_deep_circuit_warns() {
    let config = EngineConfig {
        max_depth: 1,
        ..EngineConfig::default()
    };
    let req = request(Mode::Quantum, "ghz.qasm", GHZ3, &["delayed"]);
    let mut sink = RecordingSink::new();

    Orchestrator::new(config)
        .run(&req, &mut MemoryWriter::new(), &mut sink)
        .unwrap();
    assert!(sink.warnings().iter().any(|w| w.contains("depth")));
}

#[test]
fn test_quantum_unsupported_extension() {
    let req = request(Mode::Quantum, "bell.txt", BELL, &["cloaked"]);
    let err = Orchestrator::new(EngineConfig::default())
        .run(&req, &mut MemoryWriter::new(), &mut RecordingSink::new())
        .unwrap_err();
    assert!(matches!(err, EngineError::UnsupportedFormat { .. }));
    assert!(err.to_string().contains("bell.txt"));
}

#[test]
fn test_quantum_malformed_input() {
    let req = request(Mode::Quantum, "bad.qasm", "OPENQASM 2.0;\nqreg q[2];\nfoo q[0];\n", &["cloaked"]);
    let err = Orchestrator::new(EngineConfig::default())
        .run(&req, &mut MemoryWriter::new(), &mut RecordingSink::new())
        .unwrap_err();
    assert!(matches!(err, EngineError::Format { .. }));
}

// ============================================================================
// Classical mode
// ============================================================================

#[test]
fn test_classical_deterministic_guard() {
    let req = request(
        Mode::Classical,
        "payload.py",
        "print(1)\n",
        &["deterministic:checksum=01"],
    );
    let mut writer = MemoryWriter::new();
    let mut sink = RecordingSink::new();

    let outcome = Orchestrator::new(EngineConfig::default())
        .run(&req, &mut writer, &mut sink)
        .unwrap();
    assert_eq!(outcome.path, PathBuf::from("payload_obf_deterministic.py"));

    let Artifact::Script(script) = &outcome.artifact else {
        panic!("expected a script");
    };
    assert_eq!(script.route("01"), Route::Payload);
    assert_eq!(script.route("10"), Route::Decoy);

    let text = writer.get(&outcome.path).unwrap();
    assert!(text.contains("r'''print(1)\n'''"));
    assert!(text.contains("'payload.py', 'exec')"));
    assert!(text.contains("# Obfuscated from: payload.py"));
    assert!(
        sink.events()
            .iter()
            .any(|e| matches!(e, ObfuscationEvent::TriggerVerified { .. }))
    );
}

#[test]
fn test_classical_trigger_check_can_be_disabled() {
    let config = EngineConfig {
        verify_triggers: false,
        ..EngineConfig::default()
    };
    let req = request(Mode::Classical, "payload.py", "x = 1\n", &["shroud:qubits=3"]);
    let mut sink = RecordingSink::new();

    Orchestrator::new(config)
        .run(&req, &mut MemoryWriter::new(), &mut sink)
        .unwrap();
    assert!(
        !sink
            .events()
            .iter()
            .any(|e| matches!(e, ObfuscationEvent::TriggerVerified { .. }))
    );
}

#[test]
fn test_classical_extra_guards_warn() {
    let req = request(
        Mode::Classical,
        "payload.py",
        "print(1)\n",
        &["simple_entanglement", "shroud"],
    );
    let mut sink = RecordingSink::new();

    let outcome = Orchestrator::new(EngineConfig::default())
        .run(&req, &mut MemoryWriter::new(), &mut sink)
        .unwrap();
    assert_eq!(
        outcome.path,
        PathBuf::from("payload_obf_simple_entanglement.py")
    );
    assert!(sink.warnings().iter().any(|w| w.contains("shroud")));
}

#[test]
fn test_classical_structural_error_writes_nothing() {
    let req = request(
        Mode::Classical,
        "payload.py",
        "print(1)\n",
        &["variable_pairs:pairs=9"],
    );
    let mut writer = MemoryWriter::new();
    let mut engine = Orchestrator::new(EngineConfig::default());

    let err = engine
        .run(&req, &mut writer, &mut RecordingSink::new())
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Guard(GuardError::Structural { .. })
    ));
    assert!(writer.is_empty());
    assert!(engine.state().is_terminal());
    assert!(!engine.state().is_success());
}

#[test]
fn test_classical_quantum_guard_name_rejected() {
    let req = request(Mode::Classical, "payload.py", "print(1)\n", &["cloaked"]);
    let err = Orchestrator::new(EngineConfig::default())
        .run(&req, &mut MemoryWriter::new(), &mut RecordingSink::new())
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Validation(ValidationError::UnknownAlgorithm { .. })
    ));
}

// ============================================================================
// Filesystem
// ============================================================================

#[test]
fn test_fs_writer_next_to_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bell.qasm");
    fs::write(&input, BELL).unwrap();

    let req = Request {
        input: input.clone(),
        source: fs::read_to_string(&input).unwrap(),
        mode: Mode::Quantum,
        algorithms: vec!["composite".into()],
        output: None,
    };
    let outcome = Orchestrator::new(EngineConfig::default())
        .run(&req, &mut FsWriter, &mut RecordingSink::new())
        .unwrap();

    assert_eq!(outcome.path, dir.path().join("bell_obfuscated.qasm"));
    let written = fs::read_to_string(&outcome.path).unwrap();
    assert!(written.starts_with("OPENQASM 2.0;"));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
}
