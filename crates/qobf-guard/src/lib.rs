//! qobf Quantum Guards
//!
//! Wraps a classical Python script in a control-flow guard: a small trigger
//! circuit is simulated when the script starts, and the original code runs
//! only on the branches its outcome selects. Every guard is built so that a
//! correct simulation always reaches the payload.
//!
//! # Architecture
//!
//! ```text
//! "deterministic:checksum=01" ─→ GuardSpec ─→ Guard::check
//!                                                 │
//!   seed = Keccak256(algorithm, params, script) ──┤
//!                                                 ▼
//!                               Guard::synthesize ─→ TriggerCircuit
//!                                                    (circuit + BranchPredicate)
//!                                                 │
//!                        verify_trigger(Simulator) ┤ (optional)
//!                                                 ▼
//!                               wrap(script) ─→ GuardedScript
//! ```
//!
//! # Example
//!
//! ```rust
//! use qobf_compile::NullSink;
//! use qobf_guard::{GuardSpec, Route, ScriptHeader, guard_script};
//!
//! let spec = GuardSpec::parse("deterministic:checksum=01").unwrap();
//! let header = ScriptHeader::now("payload.py");
//! let guarded = guard_script(&spec, "print(1)\n", &header, None, &mut NullSink).unwrap();
//!
//! assert_eq!(guarded.route("01"), Route::Payload);
//! assert_eq!(guarded.route("10"), Route::Decoy);
//! assert!(guarded.text.contains("r'''print(1)\n'''"));
//! ```

pub mod algorithm;
pub mod decoy;
pub mod error;
pub mod guards;
pub mod predicate;
pub mod synth;
pub mod trigger;
pub mod wrapper;

pub use algorithm::GuardSpec;
pub use error::{GuardError, GuardResult};
pub use guards::Guard;
pub use predicate::{BranchPredicate, Route};
pub use synth::guard_script;
pub use trigger::{TriggerCircuit, verify_trigger};
pub use wrapper::{GuardedScript, ScriptHeader, wrap};
