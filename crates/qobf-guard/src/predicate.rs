//! Branch predicates over trigger outcomes.
//!
//! Outcomes are bitstrings with classical bit 0 as the rightmost character,
//! the order Qiskit reports counts in.

use std::fmt;

/// Which branch of the guarded script an outcome selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// The main code path, running the payload.
    Payload,
    /// A second, structurally different code path that also runs the payload.
    PayloadAlternate,
    /// A decoy branch. The payload does not run.
    Decoy,
}

impl Route {
    /// Check if this route runs the payload.
    pub fn runs_payload(self) -> bool {
        !matches!(self, Route::Decoy)
    }
}

/// A condition on a trigger outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchPredicate {
    /// The outcome is exactly this bitstring.
    Equals(String),
    /// The outcome is one of these bitstrings, all of the same width.
    OneOf(Vec<String>),
    /// Every listed pair of classical bits reads the same value.
    PairsCorrelated {
        width: usize,
        pairs: Vec<(usize, usize)>,
    },
    /// Any outcome of this width. Even parity takes the main path, odd
    /// parity the alternate one.
    EitherParity { width: usize },
}

impl BranchPredicate {
    /// Number of classical bits the predicate reads.
    pub fn width(&self) -> usize {
        match self {
            BranchPredicate::Equals(expected) => expected.len(),
            BranchPredicate::OneOf(set) => set.first().map_or(0, String::len),
            BranchPredicate::PairsCorrelated { width, .. }
            | BranchPredicate::EitherParity { width } => *width,
        }
    }

    /// The branch `outcome` selects. Malformed outcomes always go to a decoy.
    pub fn route(&self, outcome: &str) -> Route {
        if outcome.len() != self.width() || !is_bitstring(outcome) {
            return Route::Decoy;
        }

        let accepted = match self {
            BranchPredicate::Equals(expected) => outcome == expected,
            BranchPredicate::OneOf(set) => set.iter().any(|s| s == outcome),
            BranchPredicate::PairsCorrelated { pairs, .. } => pairs
                .iter()
                .all(|&(a, b)| bit(outcome, a) == bit(outcome, b)),
            BranchPredicate::EitherParity { .. } => {
                let ones = outcome.bytes().filter(|&b| b == b'1').count();
                return if ones % 2 == 0 {
                    Route::Payload
                } else {
                    Route::PayloadAlternate
                };
            }
        };

        if accepted {
            Route::Payload
        } else {
            Route::Decoy
        }
    }

    /// Check if the payload runs on `outcome`.
    pub fn holds(&self, outcome: &str) -> bool {
        self.route(outcome).runs_payload()
    }
}

impl fmt::Display for BranchPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchPredicate::Equals(expected) => write!(f, "outcome == '{expected}'"),
            BranchPredicate::OneOf(set) => {
                let quoted: Vec<String> = set.iter().map(|s| format!("'{s}'")).collect();
                write!(f, "outcome in {{{}}}", quoted.join(", "))
            }
            BranchPredicate::PairsCorrelated { pairs, .. } => {
                let listed: Vec<String> = pairs.iter().map(|(a, b)| format!("c{a}=c{b}")).collect();
                write!(f, "{}", listed.join(" and "))
            }
            BranchPredicate::EitherParity { width } => {
                write!(f, "any {width}-bit outcome, parity selects the path")
            }
        }
    }
}

/// Classical bit `index` of a bitstring whose rightmost character is bit 0.
pub fn bit(outcome: &str, index: usize) -> Option<bool> {
    let bytes = outcome.as_bytes();
    let position = bytes.len().checked_sub(index + 1)?;
    Some(bytes[position] == b'1')
}

/// Check if `s` is a non-empty string of `0` and `1`.
pub fn is_bitstring(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b == b'0' || b == b'1')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_is_little_endian() {
        assert_eq!(bit("01", 0), Some(true));
        assert_eq!(bit("01", 1), Some(false));
        assert_eq!(bit("01", 2), None);
    }

    #[test]
    fn test_equals() {
        let p = BranchPredicate::Equals("01".into());
        assert_eq!(p.route("01"), Route::Payload);
        assert_eq!(p.route("10"), Route::Decoy);
        assert_eq!(p.route("001"), Route::Decoy);
    }

    #[test]
    fn test_one_of() {
        let p = BranchPredicate::OneOf(vec!["00".into(), "11".into()]);
        assert!(p.holds("00"));
        assert!(p.holds("11"));
        assert!(!p.holds("01"));
        assert_eq!(p.width(), 2);
    }

    #[test]
    fn test_pairs_correlated() {
        let p = BranchPredicate::PairsCorrelated {
            width: 4,
            pairs: vec![(0, 1), (2, 3)],
        };
        assert!(p.holds("1100"));
        assert!(p.holds("0011"));
        assert!(!p.holds("0110"));
        assert_eq!(p.to_string(), "c0=c1 and c2=c3");
    }

    #[test]
    fn test_either_parity() {
        let p = BranchPredicate::EitherParity { width: 3 };
        assert_eq!(p.route("000"), Route::Payload);
        assert_eq!(p.route("101"), Route::Payload);
        assert_eq!(p.route("100"), Route::PayloadAlternate);
        assert_eq!(p.route("1x0"), Route::Decoy);
    }

    #[test]
    fn test_display() {
        let p = BranchPredicate::OneOf(vec!["00".into(), "11".into()]);
        assert_eq!(p.to_string(), "outcome in {'00', '11'}");
        assert_eq!(
            BranchPredicate::Equals("101".into()).to_string(),
            "outcome == '101'"
        );
    }
}
