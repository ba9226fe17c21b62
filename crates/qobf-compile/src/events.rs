//! Structured progress events.
//!
//! Components never format log lines for the user. They emit
//! [`ObfuscationEvent`] values into the [`EventSink`] they were handed, and
//! the caller decides how (or whether) to render them.

use std::time::Duration;

/// Something that happened during one invocation.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ObfuscationEvent {
    /// The layer plan is about to run.
    PipelineStarted {
        stages: usize,
        qubits: usize,
        gates: usize,
        depth: usize,
    },
    /// A stage is about to run.
    StageStarted {
        index: usize,
        algorithm: &'static str,
        params: String,
    },
    /// A stage finished and its output was accepted.
    StageFinished {
        index: usize,
        algorithm: &'static str,
        gates_before: usize,
        gates_after: usize,
        depth_before: usize,
        depth_after: usize,
        elapsed: Duration,
    },
    /// The numeric equivalence check was skipped for a stage.
    VerificationSkipped { index: usize, qubits: usize },
    /// Every stage ran.
    PipelineFinished { gates: usize, depth: usize },
    /// A trigger circuit was built.
    GuardSynthesized {
        algorithm: &'static str,
        qubits: usize,
        gates: usize,
        predicate: String,
    },
    /// The trigger was simulated and its predicate holds on every outcome.
    TriggerVerified {
        algorithm: &'static str,
        outcomes: usize,
    },
    /// The orchestrator moved to a new state.
    StateChanged {
        from: &'static str,
        to: &'static str,
    },
    /// Output was written.
    OutputWritten { path: String, bytes: usize },
    /// A non-fatal condition the user should know about.
    Warning { message: String },
}

/// Receives events as they happen.
pub trait EventSink {
    /// Handle one event.
    fn emit(&mut self, event: ObfuscationEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: ObfuscationEvent) {}
}

/// Keeps every event, in order.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    events: Vec<ObfuscationEvent>,
}

impl RecordingSink {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Events received so far.
    pub fn events(&self) -> &[ObfuscationEvent] {
        &self.events
    }

    /// Take the recorded events, leaving the recorder empty.
    pub fn take(&mut self) -> Vec<ObfuscationEvent> {
        std::mem::take(&mut self.events)
    }

    /// Warning messages received so far.
    pub fn warnings(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ObfuscationEvent::Warning { message } => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: ObfuscationEvent) {
        self.events.push(event);
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: ObfuscationEvent) {
        (**self).emit(event);
    }
}
