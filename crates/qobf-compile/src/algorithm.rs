//! Resolved circuit algorithms.

use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::pass::Pass;
use crate::passes::{CloakedGates, CompositeGates, DelayedGates, InverseGates};
use crate::spec::RawAlgorithmSpec;

/// A circuit obfuscation algorithm with its validated configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum AlgorithmSpec {
    /// See [`CloakedGates`].
    Cloaked(CloakedGates),
    /// See [`InverseGates`].
    Inverse(InverseGates),
    /// See [`DelayedGates`].
    Delayed(DelayedGates),
    /// See [`CompositeGates`].
    Composite(CompositeGates),
}

impl AlgorithmSpec {
    /// Names accepted by [`AlgorithmSpec::from_raw`].
    pub const NAMES: [&'static str; 4] = [
        CloakedGates::NAME,
        InverseGates::NAME,
        DelayedGates::NAME,
        CompositeGates::NAME,
    ];

    /// Resolve a raw spec into its typed configuration.
    pub fn from_raw(raw: &RawAlgorithmSpec) -> Result<Self, ValidationError> {
        let mut reader = raw.reader();
        let spec = match raw.name.as_str() {
            CloakedGates::NAME => AlgorithmSpec::Cloaked(CloakedGates::read(&mut reader)?),
            InverseGates::NAME => AlgorithmSpec::Inverse(InverseGates::read(&mut reader)?),
            DelayedGates::NAME => AlgorithmSpec::Delayed(DelayedGates::read(&mut reader)?),
            CompositeGates::NAME => AlgorithmSpec::Composite(CompositeGates::read(&mut reader)?),
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

    /// The pass implementing this algorithm.
    pub fn pass(&self) -> &dyn Pass {
        match self {
            AlgorithmSpec::Cloaked(p) => p,
            AlgorithmSpec::Inverse(p) => p,
            AlgorithmSpec::Delayed(p) => p,
            AlgorithmSpec::Composite(p) => p,
        }
    }

    /// Algorithm name.
    pub fn name(&self) -> &'static str {
        self.pass().name()
    }

    /// Canonical parameter text.
    pub fn params(&self) -> String {
        self.pass().params()
    }

    /// Re-check the configuration. Succeeds again on an already valid spec.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.pass().validate()
    }
}

impl FromStr for AlgorithmSpec {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Canonical spec text; parses back to an equal spec.
impl fmt::Display for AlgorithmSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name(), self.params())
    }
}
