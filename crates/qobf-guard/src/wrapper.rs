//! Classical wrapper: surrounds a Python script with a quantum guard.
//!
//! The generated script defines a trigger function that rebuilds the trigger
//! circuit with Qiskit, runs one shot on `AerSimulator` and returns the
//! outcome, and a main function that branches on it. The original script is
//! stored once, byte for byte, in a module-level string literal; each payload
//! branch compiles and executes it in a fresh `__main__` namespace.

use chrono::{DateTime, Local};
use tracing::debug;

use qobf_hal::Simulator;
use qobf_qasm::{emit_python_calls, python_string};

use crate::decoy::{self, DecoyGenerator};
use crate::error::GuardResult;
use crate::predicate::{BranchPredicate, Route};
use crate::trigger::TriggerCircuit;

const RULE: &str = "# ======================================================================";

/// Provenance written at the top of a guarded script.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptHeader {
    /// File name of the original script.
    pub source_name: String,
    /// When the script was generated.
    pub generated: DateTime<Local>,
}

impl ScriptHeader {
    /// Header stamped with the current time.
    pub fn now(source_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            generated: Local::now(),
        }
    }

    fn render(&self, algorithm: &str) -> String {
        format!(
            "{RULE}\n# Obfuscated from: {}\n# Template: {algorithm}\n# Generated: {}\n{RULE}\n\n",
            self.source_name,
            self.generated.to_rfc3339()
        )
    }
}

/// A script wrapped in a guard, with the trigger it branches on.
#[derive(Debug, Clone, PartialEq)]
pub struct GuardedScript {
    /// Guard algorithm name.
    pub algorithm: &'static str,
    /// The trigger embedded in the script.
    pub trigger: TriggerCircuit,
    /// Full script text.
    pub text: String,
}

impl GuardedScript {
    /// The branch the script takes when its trigger reports `outcome`.
    pub fn route(&self, outcome: &str) -> Route {
        self.trigger.predicate.route(outcome)
    }

    /// Run the trigger for one shot on `simulator`, as the script would, and
    /// return the outcome with the branch it selects.
    pub fn evaluate(&self, simulator: &dyn Simulator) -> GuardResult<(String, Route)> {
        let counts = simulator.sample(&self.trigger.circuit, 1)?;
        let outcome = counts
            .most_frequent()
            .map(|(bits, _)| bits.to_string())
            .unwrap_or_default();
        let route = self.route(&outcome);
        debug!("Trigger outcome '{}' selects {:?}", outcome, route);
        Ok((outcome, route))
    }
}

/// Identifiers used by the generated script.
struct Names {
    trigger_fn: String,
    main_fn: String,
    circuit: String,
    result: String,
    outcome: String,
    context: String,
    session: String,
    payload: String,
}

impl Names {
    fn draw(decoys: &mut DecoyGenerator) -> Self {
        Self {
            trigger_fn: decoys.identifier("func"),
            main_fn: decoys.identifier("main"),
            circuit: decoys.identifier("casss"),
            result: decoys.identifier("res"),
            outcome: decoys.identifier("dsa"),
            context: decoys.identifier("ctx"),
            session: decoys.identifier("val"),
            payload: decoys.identifier("blob"),
        }
    }
}

/// Wrap `source` in a guard built around `trigger`.
pub fn wrap(
    source: &str,
    algorithm: &'static str,
    trigger: TriggerCircuit,
    header: &ScriptHeader,
    decoys: &mut DecoyGenerator,
) -> GuardedScript {
    let names = Names::draw(decoys);
    let mut text = header.render(algorithm);

    text.push_str(&format!(
        "# OBFUSCATED SCRIPT (Control Flow: {})\n",
        title(&trigger.predicate)
    ));
    text.push_str("import qiskit, random, math, time, datetime, hashlib\n");
    text.push_str("from math import pi\n");
    text.push_str("from qiskit_aer import AerSimulator\n\n");
    text.push_str(&format!("{} = {}\n\n\n", names.payload, payload_literal(source)));

    text.push_str(&decoys.helper_function());
    text.push_str("\n\n");

    text.push_str(&format!("def {}():\n", names.trigger_fn));
    text.push_str(&emit_python_calls(&trigger.circuit, &names.circuit, "    "));
    text.push_str(&format!(
        "    {res} = AerSimulator().run(qiskit.transpile({qc}, AerSimulator()), shots=1).result()\n\
         \x20   return list({res}.get_counts().keys())[0]\n\n\n",
        res = names.result,
        qc = names.circuit
    ));

    text.push_str(&format!("def {}():\n", names.main_fn));
    text.push_str(&decoys.assignment("    "));
    text.push_str(&format!(
        "    {} = \"SESSION_ID:\" + str(random.randint(10000, 99999))\n",
        names.session
    ));
    text.push_str(&format!("    {} = {}()\n", names.outcome, names.trigger_fn));
    let run = format!(
        "exec(compile({}, {}, 'exec'), {{'__name__': '__main__'}})\n",
        names.payload,
        python_string(&header.source_name)
    );
    text.push_str(&branches(&run, &trigger.predicate, &names, decoys));

    text.push_str(&format!(
        "\n\nif __name__ == \"__main__\":\n    {}()\n",
        names.main_fn
    ));

    GuardedScript {
        algorithm,
        trigger,
        text,
    }
}

fn title(predicate: &BranchPredicate) -> &'static str {
    match predicate {
        BranchPredicate::Equals(_) => "Deterministic Quantum Checksum",
        BranchPredicate::OneOf(_) => "Simple Entanglement with Deceptive Branches",
        BranchPredicate::PairsCorrelated { .. } => "Hidden Quantum Trap with Smart Noise",
        BranchPredicate::EitherParity { .. } => "Advanced Superposition Shroud",
    }
}

/// `run` is the single statement that executes the payload.
fn branches(
    run: &str,
    predicate: &BranchPredicate,
    names: &Names,
    decoys: &mut DecoyGenerator,
) -> String {
    let outcome = &names.outcome;
    let mut code = String::new();

    match predicate {
        BranchPredicate::Equals(expected) => {
            code.push_str("    # Payload executes only if checksum matches expected value\n");
            code.push_str(&format!("    if {outcome} == '{expected}':\n"));
            code.push_str(&format!("        {run}"));
            code.push_str("    else:\n");
            code.push_str(&decoy::checksum_dump(
                "        ",
                expected,
                outcome,
                &names.session,
            ));
        }
        BranchPredicate::OneOf(accepted) => {
            for (i, bits) in accepted.iter().enumerate() {
                let keyword = if i == 0 { "if" } else { "elif" };
                code.push_str(&format!("    {keyword} {outcome} == '{bits}':\n"));
                code.push_str(&format!("        {run}"));
            }
            let rejected = complement(accepted, predicate.width());
            for (i, bits) in rejected.iter().enumerate() {
                code.push_str(&format!("    elif {outcome} == '{bits}':\n"));
                if i % 2 == 0 {
                    code.push_str(&decoy::error_log("        "));
                } else {
                    code.push_str(&decoy::fake_scan("        "));
                }
            }
        }
        BranchPredicate::PairsCorrelated { pairs, .. } => {
            let listed: Vec<String> = pairs.iter().map(|(a, b)| format!("({a}, {b})")).collect();
            code.push_str(&format!(
                "    {} = [{}]\n",
                names.context,
                listed.join(", ")
            ));
            code.push_str(&format!(
                "    if any({outcome}[-1 - a] != {outcome}[-1 - b] for a, b in {}):\n",
                names.context
            ));
            code.push_str(&decoy::busy_work("        "));
            code.push_str(&decoys.assignment("        "));
            code.push_str("    else:\n");
            code.push_str(&format!("        {run}"));
        }
        BranchPredicate::EitherParity { .. } => {
            let ctx = &names.context;
            code.push_str(&format!(
                "    {ctx} = {{'status': 'unverified', 'data': None, 'timestamp': time.time()}}\n"
            ));
            code.push_str(&format!("    if {outcome}.count('1') % 2 == 0:\n"));
            code.push_str(&format!("        {ctx}['status'] = 'stage1_ok'\n"));
            code.push_str(&format!("        {run}"));
            code.push_str("    else:\n");
            code.push_str(&format!(
                "        {ctx}['data'] = hashlib.md5(str(random.random()).encode()).hexdigest()\n"
            ));
            code.push_str(&format!("        if {ctx}['data'] is not None:\n"));
            code.push_str(&format!("            {run}"));
        }
    }
    code
}

/// Every bitstring of `width` bits not in `accepted`, highest first. Empty
/// for registers too wide to enumerate.
fn complement(accepted: &[String], width: usize) -> Vec<String> {
    if width == 0 || width > 4 {
        return Vec::new();
    }
    (0..1usize << width)
        .rev()
        .map(|v| format!("{v:0width$b}"))
        .filter(|bits| !accepted.contains(bits))
        .collect()
}

/// A Python literal whose value is exactly `source`. A raw triple-quoted
/// string keeps the text readable; sources it cannot hold fall back to an
/// escaped single-line literal.
pub fn payload_literal(source: &str) -> String {
    let raw_ok = !source.contains(['\r', '\0']) && !source.ends_with('\\');
    for quote in ["'''", "\"\"\""] {
        if raw_ok && !source.contains(quote) && !source.ends_with(&quote[..1]) {
            return format!("r{quote}{source}{quote}");
        }
    }
    let mut escaped = String::with_capacity(source.len() + 2);
    escaped.push('\'');
    for c in source.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '\0' => escaped.push_str("\\x00"),
            c => escaped.push(c),
        }
    }
    escaped.push('\'');
    escaped
}
