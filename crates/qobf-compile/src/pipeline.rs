//! Layering pipeline.

use std::time::Instant;

use tracing::{debug, info, instrument};

use qobf_ir::Circuit;

use crate::algorithm::AlgorithmSpec;
use crate::error::{CompileError, CompileResult};
use crate::events::{EventSink, ObfuscationEvent};
use crate::seed::{circuit_seed, seeded_rng};
use crate::unitary::{Verification, verify_equivalence};

/// An ordered list of algorithms, applied left to right.
///
/// Each stage's output is the next stage's input. A stage's random stream is
/// derived from its own spec and its own input circuit only, so running
/// `[a, b]` gives the same circuit as running `[a]` and then `[b]` on the
/// result.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerPlan {
    stages: Vec<AlgorithmSpec>,
    verify: bool,
}

impl LayerPlan {
    /// The empty plan. Applying it returns the input unchanged.
    pub fn new() -> Self {
        Self {
            stages: Vec::new(),
            verify: true,
        }
    }

    /// Build a plan from already resolved specs.
    pub fn from_specs(stages: Vec<AlgorithmSpec>) -> CompileResult<Self> {
        let plan = Self {
            stages,
            ..Self::new()
        };
        plan.validate()?;
        Ok(plan)
    }

    /// Parse every spec text. Fails on the first invalid stage, naming its
    /// index.
    pub fn parse<I, S>(specs: I) -> CompileResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let stages = specs
            .into_iter()
            .enumerate()
            .map(|(index, text)| {
                AlgorithmSpec::parse(text.as_ref())
                    .map_err(|source| CompileError::InvalidStage { index, source })
            })
            .collect::<CompileResult<Vec<_>>>()?;
        Ok(Self {
            stages,
            ..Self::new()
        })
    }

    /// Turn the numeric equivalence check after each stage on or off.
    #[must_use]
    pub fn with_verification(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Append a stage.
    pub fn push(&mut self, stage: AlgorithmSpec) {
        self.stages.push(stage);
    }

    /// The stages, in order.
    pub fn stages(&self) -> &[AlgorithmSpec] {
        &self.stages
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Check if the plan has no stages.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Validate every stage, reporting the first failure.
    pub fn validate(&self) -> CompileResult<()> {
        for (index, stage) in self.stages.iter().enumerate() {
            stage
                .validate()
                .map_err(|source| CompileError::InvalidStage { index, source })?;
        }
        Ok(())
    }

    /// Run the plan over `circuit`.
    ///
    /// Every stage is validated before the first one runs. The input is never
    /// modified; on error no partial circuit escapes.
    #[instrument(skip_all, fields(stages = self.stages.len(), qubits = circuit.num_qubits()))]
    pub fn apply(&self, circuit: &Circuit, sink: &mut dyn EventSink) -> CompileResult<Circuit> {
        self.validate()?;

        info!(
            "Applying {} layers to circuit with {} qubits",
            self.stages.len(),
            circuit.num_qubits()
        );
        sink.emit(ObfuscationEvent::PipelineStarted {
            stages: self.stages.len(),
            qubits: circuit.num_qubits(),
            gates: circuit.gate_count(),
            depth: circuit.depth(),
        });

        let mut current = circuit.clone();
        for (index, stage) in self.stages.iter().enumerate() {
            current = self.run_stage(index, stage, &current, sink)?;
        }

        info!(
            "Pipeline completed, final depth: {}, gates: {}",
            current.depth(),
            current.gate_count()
        );
        sink.emit(ObfuscationEvent::PipelineFinished {
            gates: current.gate_count(),
            depth: current.depth(),
        });
        Ok(current)
    }

    fn run_stage(
        &self,
        index: usize,
        stage: &AlgorithmSpec,
        input: &Circuit,
        sink: &mut dyn EventSink,
    ) -> CompileResult<Circuit> {
        let pass = stage.pass();
        let params = pass.params();
        debug!("Running layer {}: {}:{}", index, pass.name(), params);
        sink.emit(ObfuscationEvent::StageStarted {
            index,
            algorithm: pass.name(),
            params: params.clone(),
        });

        let started = Instant::now();
        let mut rng = seeded_rng(circuit_seed(pass.name(), &params, input)?);
        let output = pass.run(input, &mut rng)?;

        if self.verify {
            match verify_equivalence(input, &output)? {
                Verification::Equivalent => {}
                Verification::Skipped { qubits } => {
                    sink.emit(ObfuscationEvent::VerificationSkipped { index, qubits });
                }
                Verification::Mismatch(detail) => {
                    return Err(CompileError::EquivalencePreservationFailure {
                        index,
                        algorithm: pass.name().to_string(),
                        detail,
                    });
                }
            }
        }

        sink.emit(ObfuscationEvent::StageFinished {
            index,
            algorithm: pass.name(),
            gates_before: input.gate_count(),
            gates_after: output.gate_count(),
            depth_before: input.depth(),
            depth_after: output.depth(),
            elapsed: started.elapsed(),
        });
        Ok(output)
    }
}

impl Default for LayerPlan {
    fn default() -> Self {
        Self::new()
    }
}
