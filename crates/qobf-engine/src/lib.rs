//! qobf Orchestrator
//!
//! Runs one obfuscation request end to end: picks the mode, resolves the
//! algorithm specs, transforms the input and hands the result to an
//! [`OutputWriter`]. Failures never reach the writer.
//!
//! # Example
//!
//! ```rust
//! use qobf_compile::RecordingSink;
//! use qobf_engine::{EngineConfig, MemoryWriter, Mode, Orchestrator, Request};
//!
//! let request = Request {
//!     input: "payload.py".into(),
//!     source: "print(1)\n".into(),
//!     mode: Mode::Classical,
//!     algorithms: vec!["deterministic:checksum=01".into()],
//!     output: None,
//! };
//!
//! let mut writer = MemoryWriter::new();
//! let mut engine = Orchestrator::new(EngineConfig::default());
//! let outcome = engine.run(&request, &mut writer, &mut RecordingSink::new()).unwrap();
//!
//! assert_eq!(outcome.path.to_str(), Some("payload_obf_deterministic.py"));
//! assert!(writer.get(&outcome.path).unwrap().contains("print(1)"));
//! ```

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod output;
pub mod sink;
pub mod state;

pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use orchestrator::{Artifact, Orchestrator, Outcome, Request};
pub use output::{FsWriter, MemoryWriter, OutputWriter, default_output_path};
pub use sink::{Tee, TracingSink};
pub use state::{EngineState, Mode};
