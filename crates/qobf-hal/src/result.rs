//! Measurement results.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Histogram of classical outcomes.
///
/// Keys are bitstrings in Qiskit order: the rightmost character is classical
/// bit 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    counts: FxHashMap<String, u64>,
}

impl Counts {
    /// Create empty counts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` occurrences of `bitstring`.
    pub fn insert(&mut self, bitstring: impl Into<String>, count: u64) {
        *self.counts.entry(bitstring.into()).or_insert(0) += count;
    }

    /// Occurrences of `bitstring` (zero if never seen).
    pub fn get(&self, bitstring: &str) -> u64 {
        self.counts.get(bitstring).copied().unwrap_or(0)
    }

    /// Total number of shots recorded.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Number of distinct outcomes.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// The most frequent outcome. Ties go to the smallest bitstring so the
    /// answer does not depend on hash order.
    pub fn most_frequent(&self) -> Option<(&str, u64)> {
        self.counts
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(k, v)| (k.as_str(), *v))
    }

    /// Outcomes sorted by bitstring.
    pub fn sorted(&self) -> Vec<(&str, u64)> {
        let mut entries: Vec<_> = self.counts.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        entries.sort_unstable();
        entries
    }

    /// Iterate over outcomes in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Render the low `width` bits of `value` as a Qiskit-order bitstring.
pub fn outcome_to_bitstring(value: usize, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    format!("{value:0width$b}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_accumulate() {
        let mut counts = Counts::new();
        counts.insert("00", 3);
        counts.insert("11", 5);
        counts.insert("00", 2);
        assert_eq!(counts.get("00"), 5);
        assert_eq!(counts.get("01"), 0);
        assert_eq!(counts.total(), 10);
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_most_frequent_tie_break() {
        let mut counts = Counts::new();
        counts.insert("11", 4);
        counts.insert("00", 4);
        assert_eq!(counts.most_frequent(), Some(("00", 4)));
        assert_eq!(Counts::new().most_frequent(), None);
    }

    #[test]
    fn test_bitstring_order() {
        // clbit 0 set is the rightmost character
        assert_eq!(outcome_to_bitstring(0b001, 3), "001");
        assert_eq!(outcome_to_bitstring(0b110, 3), "110");
        assert_eq!(outcome_to_bitstring(5, 0), "");
    }
}
