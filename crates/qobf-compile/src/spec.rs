//! Algorithm spec syntax: `name[:key=value[,key=value...]]`.
//!
//! Text is parsed once into a [`RawAlgorithmSpec`], then each algorithm reads
//! its typed configuration through a [`ParamReader`], which rejects unknown
//! keys, malformed values and out-of-range numbers.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::ValidationError;

/// An algorithm name with its unvalidated `key=value` parameters, in the
/// order given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAlgorithmSpec {
    /// Algorithm name.
    pub name: String,
    /// Parameters in the order given.
    pub params: Vec<(String, String)>,
}

impl RawAlgorithmSpec {
    /// Parse spec text.
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        let malformed = |reason: &str| ValidationError::MalformedSpec {
            spec: text.to_string(),
            reason: reason.to_string(),
        };

        let text_trimmed = text.trim();
        let (name, rest) = match text_trimmed.split_once(':') {
            Some((name, rest)) => (name.trim(), Some(rest)),
            None => (text_trimmed, None),
        };
        if name.is_empty() {
            return Err(malformed("missing algorithm name"));
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(malformed("algorithm name may only contain letters, digits and '_'"));
        }

        let mut params: Vec<(String, String)> = Vec::new();
        if let Some(rest) = rest {
            if rest.trim().is_empty() {
                return Err(malformed("empty parameter list after ':'"));
            }
            for pair in rest.split(',') {
                let Some((key, value)) = pair.split_once('=') else {
                    return Err(malformed(&format!("expected key=value, got '{}'", pair.trim())));
                };
                let (key, value) = (key.trim(), value.trim());
                if key.is_empty() || value.is_empty() {
                    return Err(malformed(&format!("expected key=value, got '{}'", pair.trim())));
                }
                if params.iter().any(|(k, _)| k == key) {
                    return Err(ValidationError::DuplicateParameter {
                        algorithm: name.to_string(),
                        key: key.to_string(),
                    });
                }
                params.push((key.to_string(), value.to_string()));
            }
        }

        Ok(Self {
            name: name.to_string(),
            params,
        })
    }

    /// Start reading typed parameters.
    pub fn reader(&self) -> ParamReader<'_> {
        ParamReader {
            algorithm: &self.name,
            params: &self.params,
            used: vec![false; self.params.len()],
        }
    }
}

impl FromStr for RawAlgorithmSpec {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RawAlgorithmSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for (i, (key, value)) in self.params.iter().enumerate() {
            let sep = if i == 0 { ':' } else { ',' };
            write!(f, "{sep}{key}={value}")?;
        }
        Ok(())
    }
}

/// Typed access to a spec's parameters.
///
/// Every getter marks its key as consumed; [`ParamReader::finish`] fails on
/// any key no getter asked for.
pub struct ParamReader<'a> {
    algorithm: &'a str,
    params: &'a [(String, String)],
    used: Vec<bool>,
}

impl ParamReader<'_> {
    fn lookup(&mut self, key: &str) -> Option<&str> {
        let index = self.params.iter().position(|(k, _)| k == key)?;
        self.used[index] = true;
        Some(self.params[index].1.as_str())
    }

    fn invalid(&self, key: &str, value: &str, expected: &str) -> ValidationError {
        ValidationError::InvalidValue {
            algorithm: self.algorithm.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            expected: expected.to_string(),
        }
    }

    /// A float in `range`.
    pub fn float(
        &mut self,
        key: &str,
        default: f64,
        range: RangeInclusive<f64>,
    ) -> Result<f64, ValidationError> {
        let Some(raw) = self.lookup(key).map(str::to_string) else {
            return Ok(default);
        };
        let value: f64 = raw
            .parse()
            .map_err(|_| self.invalid(key, &raw, "a number"))?;
        check_range(self.algorithm, key, value, &range)?;
        Ok(value)
    }

    /// A float in `[0, 1]`.
    pub fn fraction(&mut self, key: &str, default: f64) -> Result<f64, ValidationError> {
        self.float(key, default, 0.0..=1.0)
    }

    /// A non-negative integer. Structural range checks are the caller's.
    pub fn integer(&mut self, key: &str, default: u64) -> Result<u64, ValidationError> {
        Ok(self.optional_integer(key)?.unwrap_or(default))
    }

    /// A non-negative integer, if given.
    pub fn optional_integer(&mut self, key: &str) -> Result<Option<u64>, ValidationError> {
        let Some(raw) = self.lookup(key).map(str::to_string) else {
            return Ok(None);
        };
        raw.parse()
            .map(Some)
            .map_err(|_| self.invalid(key, &raw, "a non-negative integer"))
    }

    /// One of a fixed set of names.
    pub fn choice<T>(
        &mut self,
        key: &str,
        default: T,
        parse: impl Fn(&str) -> Option<T>,
        expected: &str,
    ) -> Result<T, ValidationError> {
        let Some(raw) = self.lookup(key).map(str::to_string) else {
            return Ok(default);
        };
        parse(&raw).ok_or_else(|| self.invalid(key, &raw, expected))
    }

    /// Free text.
    pub fn text(&mut self, key: &str, default: &str) -> String {
        self.lookup(key).unwrap_or(default).to_string()
    }

    /// Fail on the first parameter nobody asked for.
    pub fn finish(self) -> Result<(), ValidationError> {
        match self.used.iter().position(|used| !used) {
            Some(index) => Err(ValidationError::UnknownParameter {
                algorithm: self.algorithm.to_string(),
                key: self.params[index].0.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// Check `value` against `range`, rejecting NaN.
pub fn check_range(
    algorithm: &str,
    key: &str,
    value: f64,
    range: &RangeInclusive<f64>,
) -> Result<(), ValidationError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            algorithm: algorithm.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            range: format!("[{}, {}]", range.start(), range.end()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_name() {
        let spec = RawAlgorithmSpec::parse("cloaked").unwrap();
        assert_eq!(spec.name, "cloaked");
        assert!(spec.params.is_empty());
    }

    #[test]
    fn test_parse_params_keep_order() {
        let spec = RawAlgorithmSpec::parse(" inverse : level=heavy , density=0.5 ").unwrap();
        assert_eq!(spec.name, "inverse");
        assert_eq!(
            spec.params,
            vec![
                ("level".to_string(), "heavy".to_string()),
                ("density".to_string(), "0.5".to_string())
            ]
        );
        assert_eq!(spec.to_string(), "inverse:level=heavy,density=0.5");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", ":density=1", "inverse:", "inverse:density", "inverse:=1", "in-verse"] {
            assert!(
                matches!(
                    RawAlgorithmSpec::parse(bad),
                    Err(ValidationError::MalformedSpec { .. })
                ),
                "{bad:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_parse_rejects_duplicate() {
        assert!(matches!(
            RawAlgorithmSpec::parse("inverse:density=0.1,density=0.2"),
            Err(ValidationError::DuplicateParameter { .. })
        ));
    }

    #[test]
    fn test_reader_defaults_and_values() {
        let spec = RawAlgorithmSpec::parse("x:p=0.25,n=4").unwrap();
        let mut reader = spec.reader();
        assert_eq!(reader.fraction("p", 0.5).unwrap(), 0.25);
        assert_eq!(reader.fraction("q", 0.5).unwrap(), 0.5);
        assert_eq!(reader.integer("n", 1).unwrap(), 4);
        reader.finish().unwrap();
    }

    #[test]
    fn test_reader_rejects_bad_values() {
        let spec = RawAlgorithmSpec::parse("x:p=1.5,q=abc,r=nan,n=-1").unwrap();
        let mut reader = spec.reader();
        assert!(matches!(reader.fraction("p", 0.5), Err(ValidationError::OutOfRange { .. })));
        assert!(matches!(reader.fraction("q", 0.5), Err(ValidationError::InvalidValue { .. })));
        assert!(matches!(reader.fraction("r", 0.5), Err(ValidationError::OutOfRange { .. })));
        assert!(matches!(reader.integer("n", 1), Err(ValidationError::InvalidValue { .. })));
    }

    #[test]
    fn test_reader_reports_unknown_key() {
        let spec = RawAlgorithmSpec::parse("cloaked:probabilty=0.3").unwrap();
        let mut reader = spec.reader();
        reader.fraction("probability", 0.5).unwrap();
        let err = reader.finish().unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownParameter {
                algorithm: "cloaked".into(),
                key: "probabilty".into()
            }
        );
    }
}
