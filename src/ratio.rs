//! Elementwise ratio of one keyed series to a baseline.

use crate::error::{AnalysisError, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Display;

/// One entry of a ratio report.
#[derive(Debug)]
pub struct RatioEntry<K> {
    pub key: K,
    pub ratio: Result<f64>,
}

/// Ratios for every key of the baseline, in key order.
///
/// Keys are evaluated independently: a zero baseline fails that entry
/// alone.
#[derive(Debug)]
pub struct RatioReport<K> {
    pub entries: Vec<RatioEntry<K>>,
}

impl<K: Ord + Clone> RatioReport<K> {
    /// The entries that produced a ratio.
    pub fn ok_values(&self) -> BTreeMap<K, f64> {
        self.entries
            .iter()
            .filter_map(|e| e.ratio.as_ref().ok().map(|r| (e.key.clone(), *r)))
            .collect()
    }

    pub fn errors(&self) -> Vec<(&K, &AnalysisError)> {
        self.entries
            .iter()
            .filter_map(|e| e.ratio.as_ref().err().map(|err| (&e.key, err)))
            .collect()
    }

    pub fn get(&self, key: &K) -> Option<&Result<f64>> {
        self.entries.iter().find(|e| &e.key == key).map(|e| &e.ratio)
    }

    /// Collapse the report, failing on the first degenerate entry.
    pub fn into_result(self) -> Result<BTreeMap<K, f64>> {
        self.entries
            .into_iter()
            .map(|e| e.ratio.map(|r| (e.key, r)))
            .collect()
    }
}

/// Compute `numerator.get(key, 0) / baseline[key]` for every baseline key.
///
/// Keys only in `numerator` are not reported.
pub fn ratio_report<K>(numerator: &BTreeMap<K, f64>, baseline: &BTreeMap<K, f64>) -> RatioReport<K>
where
    K: Ord + Clone + Display,
{
    let entries = baseline
        .iter()
        .map(|(key, &base)| {
            let ratio = if base == 0.0 {
                tracing::warn!(key = %key, "zero baseline, ratio is undefined");
                Err(AnalysisError::DegenerateRatio {
                    key: key.to_string(),
                })
            } else {
                Ok(numerator.get(key).copied().unwrap_or(0.0) / base)
            };
            RatioEntry {
                key: key.clone(),
                ratio,
            }
        })
        .collect();

    RatioReport { entries }
}

/// Serializable view of a report, with failures rendered as messages.
#[derive(Debug, Serialize)]
pub struct RatioSummary {
    pub numerator: String,
    pub baseline: String,
    pub ratios: BTreeMap<String, f64>,
    pub errors: BTreeMap<String, String>,
}

impl RatioSummary {
    pub fn new<K: Ord + Clone + Display>(
        numerator: &str,
        baseline: &str,
        report: &RatioReport<K>,
    ) -> Self {
        let mut ratios = BTreeMap::new();
        let mut errors = BTreeMap::new();
        for entry in &report.entries {
            match &entry.ratio {
                Ok(r) => {
                    ratios.insert(entry.key.to_string(), *r);
                }
                Err(e) => {
                    errors.insert(entry.key.to_string(), e.to_string());
                }
            }
        }
        Self {
            numerator: numerator.to_string(),
            baseline: baseline.to_string(),
            ratios,
            errors,
        }
    }
}
