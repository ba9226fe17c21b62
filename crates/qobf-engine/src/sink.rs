//! Event sink that forwards to `tracing`.

use tracing::{debug, info, warn};

use qobf_compile::{EventSink, ObfuscationEvent};

/// Turns every [`ObfuscationEvent`] into a `tracing` record with fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&mut self, event: ObfuscationEvent) {
        match event {
            ObfuscationEvent::PipelineStarted {
                stages,
                qubits,
                gates,
                depth,
            } => info!(stages, qubits, gates, depth, "pipeline started"),
            ObfuscationEvent::StageStarted {
                index,
                algorithm,
                params,
            } => info!(stage = index, algorithm, %params, "layer started"),
            ObfuscationEvent::StageFinished {
                index,
                algorithm,
                gates_before,
                gates_after,
                depth_before,
                depth_after,
                elapsed,
            } => info!(
                stage = index,
                algorithm,
                gates_before,
                gates_after,
                depth_before,
                depth_after,
                elapsed_ms = elapsed.as_secs_f64() * 1e3,
                "layer finished"
            ),
            ObfuscationEvent::VerificationSkipped { index, qubits } => {
                debug!(stage = index, qubits, "equivalence check skipped")
            }
            ObfuscationEvent::PipelineFinished { gates, depth } => {
                info!(gates, depth, "pipeline finished")
            }
            ObfuscationEvent::GuardSynthesized {
                algorithm,
                qubits,
                gates,
                predicate,
            } => info!(algorithm, qubits, gates, %predicate, "guard synthesized"),
            ObfuscationEvent::TriggerVerified {
                algorithm,
                outcomes,
            } => info!(algorithm, outcomes, "trigger verified"),
            ObfuscationEvent::StateChanged { from, to } => debug!(from, to, "state changed"),
            ObfuscationEvent::OutputWritten { path, bytes } => {
                info!(%path, bytes, "output written")
            }
            ObfuscationEvent::Warning { message } => warn!("{}", message),
            other => debug!(?other, "event"),
        }
    }
}

/// Forwards every event to two sinks.
pub struct Tee<'a> {
    first: &'a mut dyn EventSink,
    second: &'a mut dyn EventSink,
}

impl<'a> Tee<'a> {
    /// Combine two sinks.
    pub fn new(first: &'a mut dyn EventSink, second: &'a mut dyn EventSink) -> Self {
        Self { first, second }
    }
}

impl EventSink for Tee<'_> {
    fn emit(&mut self, event: ObfuscationEvent) {
        self.first.emit(event.clone());
        self.second.emit(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qobf_compile::RecordingSink;

    #[test]
    fn test_tee_forwards_to_both() {
        let mut a = RecordingSink::new();
        let mut b = RecordingSink::new();
        {
            let mut tee = Tee::new(&mut a, &mut b);
            tee.emit(ObfuscationEvent::Warning {
                message: "deep".into(),
            });
            TracingSink.emit(ObfuscationEvent::PipelineFinished { gates: 1, depth: 1 });
        }
        assert_eq!(a.warnings(), vec!["deep"]);
        assert_eq!(b.events().len(), 1);
    }
}
