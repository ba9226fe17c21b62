//! Resolved guard algorithms.

use std::fmt;
use std::str::FromStr;

use qobf_compile::{RawAlgorithmSpec, ValidationError};

use crate::error::GuardResult;
use crate::guards::{Deterministic, Guard, Shroud, SimpleEntanglement, VariablePairs};

/// A guard synthesis algorithm with its typed configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardSpec {
    /// See [`SimpleEntanglement`].
    SimpleEntanglement(SimpleEntanglement),
    /// See [`VariablePairs`].
    VariablePairs(VariablePairs),
    /// See [`Shroud`].
    Shroud(Shroud),
    /// See [`Deterministic`].
    Deterministic(Deterministic),
}

impl GuardSpec {
    /// Names accepted by [`GuardSpec::from_raw`].
    pub const NAMES: [&'static str; 4] = [
        SimpleEntanglement::NAME,
        VariablePairs::NAME,
        Shroud::NAME,
        Deterministic::NAME,
    ];

    /// Resolve a raw spec into its typed configuration. Structural limits
    /// are checked separately by [`GuardSpec::check`].
    pub fn from_raw(raw: &RawAlgorithmSpec) -> Result<Self, ValidationError> {
        let mut reader = raw.reader();
        let spec = match raw.name.as_str() {
            SimpleEntanglement::NAME => {
                GuardSpec::SimpleEntanglement(SimpleEntanglement::read(&mut reader)?)
            }
            VariablePairs::NAME => GuardSpec::VariablePairs(VariablePairs::read(&mut reader)?),
            Shroud::NAME => GuardSpec::Shroud(Shroud::read(&mut reader)?),
            Deterministic::NAME => GuardSpec::Deterministic(Deterministic::read(&mut reader)?),
            other => {
                return Err(ValidationError::UnknownAlgorithm {
                    name: other.to_string(),
                    available: Self::NAMES.join(", "),
                });
            }
        };
        reader.finish()?;
        Ok(spec)
    }

    /// Parse and resolve spec text.
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        Self::from_raw(&RawAlgorithmSpec::parse(text)?)
    }

    /// The guard implementing this algorithm.
    pub fn guard(&self) -> &dyn Guard {
        match self {
            GuardSpec::SimpleEntanglement(g) => g,
            GuardSpec::VariablePairs(g) => g,
            GuardSpec::Shroud(g) => g,
            GuardSpec::Deterministic(g) => g,
        }
    }

    /// Spec name.
    pub fn name(&self) -> &'static str {
        self.guard().name()
    }

    /// Canonical parameter text.
    pub fn params(&self) -> String {
        self.guard().params()
    }

    /// Check ranges and structural requirements.
    pub fn check(&self) -> GuardResult<()> {
        self.guard().check()
    }
}

impl FromStr for GuardSpec {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for GuardSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name(), self.params())
    }
}
