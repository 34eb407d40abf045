//! Pattern matching of stored property sets.
//!
//! A pattern is just another [`Properties`] mapping. Every pair in the
//! pattern must appear verbatim in the stored mapping. [`MatchMode::Exact`]
//! additionally requires both mappings to have the same number of entries.

use crate::Properties;

/// How strictly a pattern is compared against a stored property set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MatchMode {
    /// The stored set may hold properties the pattern does not mention.
    #[default]
    Subset,
    /// The stored set must hold exactly the pattern's properties.
    Exact,
}

impl MatchMode {
    /// Returns `true` for [`MatchMode::Exact`].
    #[must_use]
    pub const fn is_strict(self) -> bool {
        matches!(self, Self::Exact)
    }
}

impl From<bool> for MatchMode {
    /// `true` selects [`MatchMode::Exact`].
    fn from(strict: bool) -> Self {
        if strict { Self::Exact } else { Self::Subset }
    }
}

/// Checks `stored` against `expected` under `mode`.
///
/// In exact mode a size mismatch fails immediately, before any values are
/// compared. A pattern name missing from `stored` is a non-match.
#[must_use]
pub fn matches(stored: &Properties, expected: &Properties, mode: MatchMode) -> bool {
    if mode.is_strict() && stored.len() != expected.len() {
        return false;
    }

    expected
        .iter()
        .all(|(name, value)| stored.get(name) == Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> Properties {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_empty_pattern_matches_subset() {
        let stored = props(&[("state", "idle"), ("hp", "10")]);
        assert!(matches(&stored, &Properties::new(), MatchMode::Subset));
    }

    #[test]
    fn test_empty_pattern_fails_exact_on_non_empty() {
        let stored = props(&[("state", "idle")]);
        assert!(!matches(&stored, &Properties::new(), MatchMode::Exact));
        assert!(matches(&Properties::new(), &Properties::new(), MatchMode::Exact));
    }

    #[test]
    fn test_subset_allows_extra_stored_properties() {
        let stored = props(&[("state", "idle"), ("hp", "10")]);
        assert!(matches(&stored, &props(&[("state", "idle")]), MatchMode::Subset));
        assert!(!matches(&stored, &props(&[("state", "idle")]), MatchMode::Exact));
    }

    #[test]
    fn test_value_mismatch() {
        let stored = props(&[("state", "idle")]);
        assert!(!matches(&stored, &props(&[("state", "alert")]), MatchMode::Subset));
    }

    #[test]
    fn test_missing_name_is_non_match() {
        let stored = props(&[("state", "idle"), ("hp", "10")]);
        let expected = props(&[("state", "idle"), ("mana", "3")]);
        assert!(!matches(&stored, &expected, MatchMode::Subset));
        assert!(!matches(&stored, &expected, MatchMode::Exact));
    }

    #[test]
    fn test_exact_size_mismatch_fails_even_when_pairs_match() {
        let stored = props(&[("state", "alert")]);
        let expected = props(&[("state", "alert"), ("x", "1")]);
        assert!(!matches(&stored, &expected, MatchMode::Exact));
    }

    #[test]
    fn test_mode_from_bool() {
        assert_eq!(MatchMode::from(true), MatchMode::Exact);
        assert_eq!(MatchMode::from(false), MatchMode::Subset);
        assert_eq!(MatchMode::default(), MatchMode::Subset);
    }
}
