//! Guard a script end to end.

use tracing::{info, instrument};

use qobf_compile::seed::{GUARD_DOMAIN, derive_seed, seeded_rng};
use qobf_compile::{EventSink, ObfuscationEvent};
use qobf_hal::Simulator;

use crate::algorithm::GuardSpec;
use crate::decoy::DecoyGenerator;
use crate::error::GuardResult;
use crate::trigger::verify_trigger;
use crate::wrapper::{GuardedScript, ScriptHeader, wrap};

/// Build the guard described by `spec` and wrap `source` in it.
///
/// The seed comes from the spec and the script text, so the same input
/// always yields the same trigger and identifiers. When a simulator is
/// given, the trigger is checked to run the payload on every reachable
/// outcome before anything is wrapped.
#[instrument(skip_all, fields(algorithm = spec.name()))]
pub fn guard_script(
    spec: &GuardSpec,
    source: &str,
    header: &ScriptHeader,
    simulator: Option<&dyn Simulator>,
    sink: &mut dyn EventSink,
) -> GuardResult<GuardedScript> {
    spec.check()?;
    let guard = spec.guard();

    let seed = derive_seed(GUARD_DOMAIN, guard.name(), &guard.params(), source.as_bytes());
    let mut rng = seeded_rng(seed);
    let trigger = guard.synthesize(&mut rng)?;

    info!(
        "Synthesized {} trigger: {} qubits, {} gates",
        guard.name(),
        trigger.num_qubits(),
        trigger.circuit.gate_count()
    );
    sink.emit(ObfuscationEvent::GuardSynthesized {
        algorithm: guard.name(),
        qubits: trigger.num_qubits(),
        gates: trigger.circuit.gate_count(),
        predicate: trigger.predicate.to_string(),
    });

    if let Some(simulator) = simulator {
        let distribution = verify_trigger(guard.name(), &trigger, simulator)?;
        sink.emit(ObfuscationEvent::TriggerVerified {
            algorithm: guard.name(),
            outcomes: distribution.len(),
        });
    }

    let mut decoys = DecoyGenerator::new(rng);
    Ok(wrap(source, guard.name(), trigger, header, &mut decoys))
}
