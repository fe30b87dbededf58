//! Summary statistics over sample sequences and run-keyed observations.

use crate::error::{AnalysisError, Result};
use serde::Serialize;
use std::collections::HashMap;

/// Compute the `p`-th percentile (0..=100) using linear interpolation
/// between the closest order statistics.
///
/// The fractional rank is `p / 100 * (n - 1)`, the same definition numpy
/// uses by default, so `percentile(s, 0)` is the minimum and
/// `percentile(s, 100)` is the maximum.
pub fn percentile(samples: &[f64], p: f64) -> Result<f64> {
    if !(0.0..=100.0).contains(&p) {
        return Err(AnalysisError::InvalidPercentile(p));
    }
    if samples.is_empty() {
        return Err(AnalysisError::EmptyInput {
            statistic: "percentile",
        });
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    Ok(interpolate(&sorted, p))
}

/// Percentile over an already sorted, non-empty slice.
fn interpolate(sorted: &[f64], p: f64) -> f64 {
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;

    if lower == upper {
        sorted[lower]
    } else {
        sorted[lower] + (sorted[upper] - sorted[lower]) * weight
    }
}

/// Arithmetic mean.
pub fn mean(samples: &[f64]) -> Result<f64> {
    if samples.is_empty() {
        return Err(AnalysisError::EmptyInput { statistic: "mean" });
    }
    Ok(samples.iter().sum::<f64>() / samples.len() as f64)
}

pub fn max(samples: &[f64]) -> Result<f64> {
    samples
        .iter()
        .copied()
        .max_by(f64::total_cmp)
        .ok_or(AnalysisError::EmptyInput { statistic: "max" })
}

pub fn min(samples: &[f64]) -> Result<f64> {
    samples
        .iter()
        .copied()
        .min_by(f64::total_cmp)
        .ok_or(AnalysisError::EmptyInput { statistic: "min" })
}

/// Summary of one sample sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub p50: f64,
    pub p90: f64,
    pub p99: f64,
    pub p999: f64,
}

impl Summary {
    pub fn from_samples(samples: &[f64]) -> Result<Self> {
        let mean = mean(samples)?;

        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);

        Ok(Self {
            count: sorted.len(),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            mean,
            p50: interpolate(&sorted, 50.0),
            p90: interpolate(&sorted, 90.0),
            p99: interpolate(&sorted, 99.0),
            p999: interpolate(&sorted, 99.9),
        })
    }
}

/// Observations grouped by run identifier (target rate or time bucket).
///
/// Repeated keys append; earlier observations are never dropped or
/// reordered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunObservations {
    runs: HashMap<u64, Vec<f64>>,
}

impl RunObservations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: u64, value: f64) {
        self.runs.entry(key).or_default().push(value);
    }

    pub fn get(&self, key: u64) -> Option<&[f64]> {
        self.runs.get(&key).map(|v| v.as_slice())
    }

    /// Run keys in ascending order.
    pub fn keys(&self) -> Vec<u64> {
        let mut keys: Vec<u64> = self.runs.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// Number of distinct runs.
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Total observations across all runs.
    pub fn observations(&self) -> usize {
        self.runs.values().map(|v| v.len()).sum()
    }
}

/// Reduce each requested run to its maximum observed value.
///
/// Results follow the order of `keys`. Runs present in `observations` but
/// not requested are ignored. A requested run with no observations means
/// the benchmark is incomplete and is an error.
pub fn max_per_run(observations: &RunObservations, keys: &[u64]) -> Result<Vec<(u64, f64)>> {
    keys.iter()
        .map(|&key| {
            let values = observations
                .get(key)
                .filter(|v| !v.is_empty())
                .ok_or(AnalysisError::MissingRun { key })?;
            Ok((key, max(values)?))
        })
        .collect()
}
