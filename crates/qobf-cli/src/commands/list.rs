//! List command implementation.

use console::style;

use qobf_compile::AlgorithmSpec;
use qobf_guard::GuardSpec;

/// Algorithm name, summary, parameter help.
type Entry = (&'static str, &'static str, &'static str);

const CIRCUIT_ALGORITHMS: [Entry; 4] = [
    (
        "cloaked",
        "Substitute gates with equivalent sequences",
        "probability (0..1), seed",
    ),
    (
        "inverse",
        "Insert gate/inverse pairs and identity noise",
        "density (0..1), level (light|medium|heavy), seed",
    ),
    (
        "delayed",
        "Stretch the critical path with identity sequences",
        "probability (0..1), seed",
    ),
    (
        "composite",
        "Insert register-wide identity blocks",
        "density (0..1), seed",
    ),
];

const GUARD_ALGORITHMS: [Entry; 4] = [
    (
        "simple_entanglement",
        "Bell-pair trigger, payload on 00 or 11",
        "noise (light|medium|heavy), seed",
    ),
    (
        "variable_pairs",
        "Several Bell pairs on shuffled qubits",
        "pairs (2..8), noise, seed",
    ),
    (
        "shroud",
        "Uniform superposition, parity picks one of two payload paths",
        "qubits (1..8), noise, seed",
    ),
    (
        "deterministic",
        "Phase-kickback trigger that always measures the checksum",
        "checksum (binary, up to 16 bits), noise, seed",
    ),
];

/// Execute the list command.
pub fn execute() {
    println!("{} Quantum mode (-q), layer with repeated -a:\n", style("qobf").cyan().bold());
    for (name, summary, params) in CIRCUIT_ALGORITHMS {
        let defaults = AlgorithmSpec::parse(name).map(|s| s.to_string()).unwrap_or_default();
        print_entry(name, summary, params, &defaults);
    }

    println!("{} Classical mode (-c), one guard:\n", style("qobf").cyan().bold());
    for (name, summary, params) in GUARD_ALGORITHMS {
        let defaults = GuardSpec::parse(name).map(|s| s.to_string()).unwrap_or_default();
        print_entry(name, summary, params, &defaults);
    }
}

fn print_entry(name: &str, summary: &str, params: &str, defaults: &str) {
    println!("  {} {}", style("●").green(), style(name).bold());
    println!("    {summary}");
    println!("    Parameters: {params}");
    println!("    Defaults:   {}", style(defaults).dim());
    println!();
}
