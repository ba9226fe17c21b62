//! Obfuscate command implementation.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use qobf_compile::{EventSink, ObfuscationEvent};
use qobf_engine::{
    Artifact, EngineConfig, FsWriter, Mode, Orchestrator, Outcome, Request, Tee, TracingSink,
};

/// Keeps the spinner message on the running stage.
struct SpinnerSink<'a> {
    spinner: &'a ProgressBar,
}

impl EventSink for SpinnerSink<'_> {
    fn emit(&mut self, event: ObfuscationEvent) {
        match event {
            ObfuscationEvent::StageStarted {
                index, algorithm, ..
            } => self
                .spinner
                .set_message(format!("Layer {index}: {algorithm}...")),
            ObfuscationEvent::GuardSynthesized { algorithm, .. } => self
                .spinner
                .set_message(format!("Wrapping script in {algorithm} guard...")),
            ObfuscationEvent::TriggerVerified { .. } => {
                self.spinner.set_message("Trigger verified, rendering...")
            }
            _ => {}
        }
    }
}

/// Execute the obfuscate command.
pub fn execute(
    input: &Path,
    mode: Mode,
    algorithms: Vec<String>,
    output: Option<PathBuf>,
    config: &EngineConfig,
) -> Result<()> {
    println!(
        "{} Obfuscating {} ({} mode): {}",
        style("→").cyan().bold(),
        style(input.display()).green(),
        mode,
        style(algorithms.join(" → ")).yellow()
    );

    if !input.exists() {
        anyhow::bail!("File not found: {}", input.display());
    }
    let source = fs::read_to_string(input)
        .with_context(|| format!("Failed to read file: {}", input.display()))?;
    tracing::debug!(path = %input.display(), bytes = source.len(), "Read input");

    let request = Request {
        input: input.to_path_buf(),
        source,
        mode,
        algorithms,
        output,
    };

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .context("Invalid spinner template")?,
    );
    spinner.set_message("Resolving algorithms...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let mut tracing_sink = TracingSink;
    let mut spinner_sink = SpinnerSink { spinner: &spinner };
    let mut sink = Tee::new(&mut tracing_sink, &mut spinner_sink);

    let mut engine = Orchestrator::new(config.clone());
    let result = engine.run(&request, &mut FsWriter, &mut sink);
    spinner.finish_and_clear();

    let outcome = result?;
    tracing::info!(path = %outcome.path.display(), bytes = outcome.bytes, "Wrote output");
    println!("{} Obfuscation complete", style("✓").green().bold());
    print_summary(&outcome);

    Ok(())
}

fn print_summary(outcome: &Outcome) {
    match &outcome.artifact {
        Artifact::Circuit(circuit) => println!(
            "  Result: {} qubits, depth {}, {} gates",
            circuit.num_qubits(),
            circuit.depth(),
            circuit.gate_count()
        ),
        Artifact::Script(script) => println!(
            "  Guard: {} ({} trigger qubits, payload on {})",
            script.algorithm,
            script.trigger.num_qubits(),
            script.trigger.predicate
        ),
    }
    println!(
        "  Output: {} ({} bytes)",
        style(outcome.path.display()).green(),
        outcome.bytes
    );
}
