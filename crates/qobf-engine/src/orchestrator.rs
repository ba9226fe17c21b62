//! The orchestrator: one invocation from request to written output.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use qobf_adapter_sim::StatevectorSimulator;
use qobf_compile::{EventSink, LayerPlan, ObfuscationEvent, ValidationError};
use qobf_guard::{GuardSpec, GuardedScript, ScriptHeader, guard_script};
use qobf_hal::Simulator;
use qobf_ir::Circuit;
use qobf_qasm::CircuitFormat;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::output::{OutputWriter, default_output_path};
use crate::state::{EngineState, Mode};

/// One invocation's input, already read by the caller.
#[derive(Debug, Clone)]
pub struct Request {
    /// Path the input was read from. Picks the circuit format and the
    /// default output path.
    pub input: PathBuf,
    /// Input text.
    pub source: String,
    /// Quantum or classical.
    pub mode: Mode,
    /// Algorithm specs, `name[:key=value,...]`, in order.
    pub algorithms: Vec<String>,
    /// Explicit output path.
    pub output: Option<PathBuf>,
}

/// The transformed artifact.
#[derive(Debug, Clone, PartialEq)]
pub enum Artifact {
    /// An obfuscated circuit.
    Circuit(Circuit),
    /// A guarded script.
    Script(GuardedScript),
}

/// A successful invocation.
#[derive(Debug, Clone)]
pub struct Outcome {
    /// Where the output was written.
    pub path: PathBuf,
    /// Size of the output.
    pub bytes: usize,
    /// What was produced.
    pub artifact: Artifact,
}

enum Resolved {
    Quantum {
        plan: LayerPlan,
        format: CircuitFormat,
    },
    Classical {
        spec: GuardSpec,
    },
}

/// Drives one request through the state machine.
///
/// Every failure moves the orchestrator to [`EngineState::Failed`] and
/// returns before the writer is called, so no partial output exists.
pub struct Orchestrator {
    config: EngineConfig,
    simulator: Box<dyn Simulator>,
    state: EngineState,
}

impl Orchestrator {
    /// Create an orchestrator using the statevector simulator for trigger
    /// checks.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            simulator: Box::new(StatevectorSimulator::new()),
            state: EngineState::Idle,
        }
    }

    /// Use a different simulator for trigger checks.
    #[must_use]
    pub fn with_simulator(mut self, simulator: Box<dyn Simulator>) -> Self {
        self.simulator = simulator;
        self
    }

    /// The configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The current state.
    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// Run `request` to completion.
    #[instrument(skip_all, fields(input = %request.input.display(), mode = %request.mode))]
    pub fn run(
        &mut self,
        request: &Request,
        writer: &mut dyn OutputWriter,
        sink: &mut dyn EventSink,
    ) -> EngineResult<Outcome> {
        if self.state != EngineState::Idle {
            return Err(EngineError::InvalidTransition {
                from: self.state.name(),
                to: "ModeSelected",
            });
        }

        match self.execute(request, writer, sink) {
            Ok(outcome) => {
                info!(
                    "Wrote {} ({} bytes)",
                    outcome.path.display(),
                    outcome.bytes
                );
                Ok(outcome)
            }
            Err(e) => {
                self.fail(&e, sink);
                Err(e)
            }
        }
    }

    fn execute(
        &mut self,
        request: &Request,
        writer: &mut dyn OutputWriter,
        sink: &mut dyn EventSink,
    ) -> EngineResult<Outcome> {
        let mode = request.mode;
        self.advance(EngineState::ModeSelected { mode }, sink)?;

        let resolved = self.resolve(request, sink)?;
        let algorithms = match &resolved {
            Resolved::Quantum { plan, .. } => plan.stages().iter().map(ToString::to_string).collect(),
            Resolved::Classical { spec } => vec![spec.to_string()],
        };
        self.advance(EngineState::AlgorithmsResolved { mode, algorithms }, sink)?;

        let (artifact, text, default_path) = match resolved {
            Resolved::Quantum { plan, format } => {
                let (circuit, text) = self.transform_circuit(request, &plan, format, sink)?;
                let path = default_output_path(&request.input, mode, "");
                (Artifact::Circuit(circuit), text, path)
            }
            Resolved::Classical { spec } => {
                let script = self.transform_script(request, &spec, sink)?;
                let text = script.text.clone();
                let path = default_output_path(&request.input, mode, spec.name());
                (Artifact::Script(script), text, path)
            }
        };
        let bytes = text.len();
        self.advance(EngineState::Transformed { mode, bytes }, sink)?;

        let path = request.output.clone().unwrap_or(default_path);
        writer.write(&path, &text)?;
        sink.emit(ObfuscationEvent::OutputWritten {
            path: path.display().to_string(),
            bytes,
        });
        self.advance(
            EngineState::Written {
                path: path.clone(),
                bytes,
            },
            sink,
        )?;

        Ok(Outcome {
            path,
            bytes,
            artifact,
        })
    }

    fn resolve(&self, request: &Request, sink: &mut dyn EventSink) -> EngineResult<Resolved> {
        match request.mode {
            Mode::Quantum => {
                let format = CircuitFormat::from_path(&request.input).ok_or_else(|| {
                    EngineError::UnsupportedFormat {
                        path: request.input.clone(),
                    }
                })?;
                let plan = LayerPlan::parse(&request.algorithms)?
                    .with_verification(self.config.verify_equivalence);
                debug!("Resolved {} layers for {} input", plan.len(), format);
                Ok(Resolved::Quantum { plan, format })
            }
            Mode::Classical => {
                let (first, extra) = request
                    .algorithms
                    .split_first()
                    .ok_or(EngineError::NoAlgorithm)?;
                if !extra.is_empty() {
                    let message = format!(
                        "Classical mode applies one guard; ignoring {}",
                        extra.join(", ")
                    );
                    sink.emit(ObfuscationEvent::Warning { message });
                }
                let spec = GuardSpec::parse(first)?;
                spec.check()?;
                Ok(Resolved::Classical { spec })
            }
        }
    }

    fn transform_circuit(
        &self,
        request: &Request,
        plan: &LayerPlan,
        format: CircuitFormat,
        sink: &mut dyn EventSink,
    ) -> EngineResult<(Circuit, String)> {
        let format_error = |source| EngineError::Format {
            path: request.input.clone(),
            source,
        };

        let circuit = format.parse(&request.source).map_err(format_error)?;
        if circuit.num_qubits() > self.config.max_qubits {
            return Err(ValidationError::TooManyQubits {
                qubits: circuit.num_qubits(),
                limit: self.config.max_qubits,
            }
            .into());
        }
        let depth = circuit.depth();
        if depth > self.config.max_depth {
            sink.emit(ObfuscationEvent::Warning {
                message: format!(
                    "Circuit depth {depth} exceeds {}; obfuscation may be slow",
                    self.config.max_depth
                ),
            });
        }

        let obfuscated = plan.apply(&circuit, sink)?;
        let text = format.emit(&obfuscated).map_err(format_error)?;
        Ok((obfuscated, text))
    }

    fn transform_script(
        &self,
        request: &Request,
        spec: &GuardSpec,
        sink: &mut dyn EventSink,
    ) -> EngineResult<GuardedScript> {
        let header = ScriptHeader::now(file_name(&request.input));
        let simulator = self
            .config
            .verify_triggers
            .then_some(self.simulator.as_ref());
        Ok(guard_script(spec, &request.source, &header, simulator, sink)?)
    }

    fn advance(&mut self, next: EngineState, sink: &mut dyn EventSink) -> EngineResult<()> {
        if !self.state.can_advance_to(&next) {
            return Err(EngineError::InvalidTransition {
                from: self.state.name(),
                to: next.name(),
            });
        }
        debug!("{} -> {}", self.state.name(), next.name());
        sink.emit(ObfuscationEvent::StateChanged {
            from: self.state.name(),
            to: next.name(),
        });
        self.state = next;
        Ok(())
    }

    fn fail(&mut self, error: &EngineError, sink: &mut dyn EventSink) {
        warn!("Invocation failed in state {}: {}", self.state.name(), error);
        let failed = EngineState::Failed {
            reason: error.to_string(),
        };
        if self.state.can_advance_to(&failed) {
            sink.emit(ObfuscationEvent::StateChanged {
                from: self.state.name(),
                to: failed.name(),
            });
            self.state = failed;
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::MemoryWriter;
    use qobf_compile::RecordingSink;

    fn request(mode: Mode, input: &str, source: &str, algorithms: &[&str]) -> Request {
        Request {
            input: input.into(),
            source: source.into(),
            mode,
            algorithms: algorithms.iter().map(|s| s.to_string()).collect(),
            output: None,
        }
    }

    #[test]
    fn test_single_use() {
        let mut engine = Orchestrator::new(EngineConfig::default());
        let req = request(Mode::Classical, "a.py", "pass\n", &["shroud"]);
        engine.run(&req, &mut MemoryWriter::new(), &mut RecordingSink::new()).unwrap();

        let err = engine
            .run(&req, &mut MemoryWriter::new(), &mut RecordingSink::new())
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidTransition { from: "Written", .. }));
        assert!(engine.state().is_success());
    }

    #[test]
    fn test_no_algorithm() {
        let mut engine = Orchestrator::new(EngineConfig::default());
        let req = request(Mode::Classical, "a.py", "pass\n", &[]);
        let err = engine
            .run(&req, &mut MemoryWriter::new(), &mut RecordingSink::new())
            .unwrap_err();
        assert!(matches!(err, EngineError::NoAlgorithm));
        assert_eq!(engine.state().name(), "Failed");
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name(Path::new("dir/payload.py")), "payload.py");
    }
}
