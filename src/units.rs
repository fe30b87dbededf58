//! Latency unit normalization.
//!
//! Older load generator builds wrote latencies with a Go duration suffix
//! (`"812ns"`, `"1.5µs"`). Newer builds write bare nanosecond values. All
//! values leave this module in nanoseconds.

use crate::error::{AnalysisError, Result};
use std::collections::BTreeSet;

/// A latency unit found in raw measurement files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Nanos,
    Micros,
}

impl Unit {
    /// Look up a two character unit marker.
    ///
    /// Both the micro sign (U+00B5) and the Greek small letter mu (U+03BC)
    /// are accepted, as is the ASCII spelling `us`.
    pub fn from_marker(marker: &str) -> Option<Unit> {
        match marker {
            "ns" => Some(Unit::Nanos),
            "µs" | "μs" | "us" => Some(Unit::Micros),
            _ => None,
        }
    }

    pub fn marker(&self) -> &'static str {
        match self {
            Unit::Nanos => "ns",
            Unit::Micros => "µs",
        }
    }

    /// Multiplier that converts a value in this unit to nanoseconds.
    pub fn factor(&self) -> f64 {
        match self {
            Unit::Nanos => 1.0,
            Unit::Micros => 1_000.0,
        }
    }
}

/// Converts raw latency tokens to nanoseconds and records the unit markers
/// seen along the way.
#[derive(Debug, Default)]
pub struct UnitNormalizer {
    suffixed: bool,
    seen: BTreeSet<String>,
}

impl UnitNormalizer {
    /// Create a normalizer. When `suffixed` is false tokens are bare numbers
    /// already in nanoseconds.
    pub fn new(suffixed: bool) -> Self {
        Self {
            suffixed,
            seen: BTreeSet::new(),
        }
    }

    /// Normalize a single trimmed token to nanoseconds.
    ///
    /// Parse failures are reported as line 0; the loader rewrites the line
    /// number.
    pub fn normalize(&mut self, token: &str) -> Result<f64> {
        if !self.suffixed {
            return parse_float(token);
        }

        let (number, marker) = split_marker(token);
        let unit = Unit::from_marker(marker).ok_or_else(|| AnalysisError::UnknownUnit {
            marker: marker.to_string(),
        })?;
        self.seen.insert(marker.to_string());

        Ok(parse_float(number)? * unit.factor())
    }

    /// The distinct unit markers observed so far.
    pub fn units_seen(&self) -> &BTreeSet<String> {
        &self.seen
    }

    pub fn into_units_seen(self) -> BTreeSet<String> {
        self.seen
    }
}

/// Split a token into its numeric part and its trailing two characters.
///
/// Characters, not bytes: the micro sign is two bytes in UTF-8.
fn split_marker(token: &str) -> (&str, &str) {
    let idx = token
        .char_indices()
        .rev()
        .nth(1)
        .map(|(idx, _)| idx)
        .unwrap_or(0);
    token.split_at(idx)
}

/// Parse a finite measurement. `NaN` and infinities are rejected.
pub(crate) fn parse_float(text: &str) -> Result<f64> {
    let value = text
        .trim()
        .parse::<f64>()
        .map_err(|e| AnalysisError::parse(0, text, e))?;
    if !value.is_finite() {
        return Err(AnalysisError::parse(0, text, "non-finite value"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_tokens() {
        let mut n = UnitNormalizer::new(false);
        assert_eq!(n.normalize("1500").unwrap(), 1500.0);
        assert_eq!(n.normalize("2.5").unwrap(), 2.5);
        assert!(n.units_seen().is_empty());
    }

    #[test]
    fn test_suffixed_tokens() {
        let mut n = UnitNormalizer::new(true);
        assert_eq!(n.normalize("812ns").unwrap(), 812.0);
        assert_eq!(n.normalize("1.5µs").unwrap(), 1500.0);
        assert_eq!(n.normalize("3us").unwrap(), 3000.0);
        assert_eq!(n.normalize("2μs").unwrap(), 2000.0);

        let seen: Vec<&str> = n.units_seen().iter().map(|s| s.as_str()).collect();
        assert_eq!(seen, vec!["ns", "us", "µs", "μs"]);
    }

    #[test]
    fn test_micro_is_thousand_nanos() {
        for x in [0.0, 1.0, 42.5, 1e6] {
            let mut n = UnitNormalizer::new(true);
            assert_eq!(n.normalize(&format!("{x}µs")).unwrap(), 1000.0 * x);
            assert_eq!(n.normalize(&format!("{x}ns")).unwrap(), x);
        }
    }

    #[test]
    fn test_unknown_unit() {
        let mut n = UnitNormalizer::new(true);
        let err = n.normalize("12ms").unwrap_err();
        assert!(matches!(err, AnalysisError::UnknownUnit { ref marker } if marker == "ms"));
        assert!(n.units_seen().is_empty());
    }

    #[test]
    fn test_suffix_in_plain_mode() {
        let mut n = UnitNormalizer::new(false);
        assert!(matches!(
            n.normalize("100ns"),
            Err(AnalysisError::Parse { .. })
        ));
    }

    #[test]
    fn test_non_finite_tokens() {
        let mut plain = UnitNormalizer::new(false);
        for token in ["NaN", "inf", "-infinity"] {
            assert!(matches!(
                plain.normalize(token),
                Err(AnalysisError::Parse { .. })
            ));
        }

        let mut suffixed = UnitNormalizer::new(true);
        assert!(matches!(
            suffixed.normalize("infns"),
            Err(AnalysisError::Parse { .. })
        ));
    }

    #[test]
    fn test_short_tokens() {
        let mut n = UnitNormalizer::new(true);
        assert!(matches!(n.normalize("ns"), Err(AnalysisError::Parse { .. })));
        assert!(matches!(
            n.normalize("5"),
            Err(AnalysisError::UnknownUnit { .. })
        ));
    }
}
