//! Runs configured comparisons end to end: load, aggregate, build grids.
//!
//! Results are returned to the caller. Writing charts and summaries is the
//! driver's decision.

use crate::config::{Config, LatencyExperiment, RatioExperiment, ThroughputExperiment};
use crate::error::{AnalysisError, Result};
use crate::grid::{self, ExperimentGrid, GridBuilder};
use crate::loader;
use crate::ratio::{RatioSummary, ratio_report};
use crate::stats::{self, Summary};
use std::collections::{BTreeMap, HashMap};

/// Every selected experiment, computed before anything is printed or written.
#[derive(Debug)]
pub struct Report<'a> {
    pub latency: Vec<(&'a LatencyExperiment, LatencyOutcome)>,
    pub throughput: Vec<(&'a ThroughputExperiment, ExperimentGrid)>,
    pub ratio: Vec<(&'a RatioExperiment, RatioOutcome)>,
}

/// Run every experiment whose name passes `selected`. The first failure
/// aborts the whole run.
pub fn run_selected<'a>(
    config: &'a Config,
    selected: impl Fn(&str) -> bool,
) -> Result<Report<'a>> {
    let latency = config
        .latency
        .iter()
        .filter(|e| selected(&e.name))
        .map(|e| run_latency(e).map(|outcome| (e, outcome)))
        .collect::<Result<Vec<_>>>()?;
    let throughput = config
        .throughput
        .iter()
        .filter(|e| selected(&e.name))
        .map(|e| run_throughput(e).map(|grid| (e, grid)))
        .collect::<Result<Vec<_>>>()?;
    let ratio = config
        .ratio
        .iter()
        .filter(|e| selected(&e.name))
        .map(|e| run_ratio(e).map(|outcome| (e, outcome)))
        .collect::<Result<Vec<_>>>()?;

    Ok(Report {
        latency,
        throughput,
        ratio,
    })
}

/// Output of a latency comparison.
#[derive(Debug)]
pub struct LatencyOutcome {
    /// The configured percentile per (series, axis value).
    pub grid: ExperimentGrid,
    /// Full sample summary behind every cell, keyed by label then axis value.
    pub summaries: BTreeMap<String, BTreeMap<u64, Summary>>,
}

/// Percentile latency for every (series, axis value) pair.
pub fn run_latency(exp: &LatencyExperiment) -> Result<LatencyOutcome> {
    tracing::info!(
        experiment = %exp.name,
        percentile = exp.percentile,
        series = exp.series.len(),
        "running latency comparison"
    );

    let mut builder = GridBuilder::new();
    let mut summaries = BTreeMap::new();
    for series in &exp.series {
        let mut values = HashMap::with_capacity(exp.axis.len());
        let mut cells = BTreeMap::new();
        for &axis in &exp.axis {
            let path = series.path_for(axis);
            let loaded = loader::load_samples(&path, series.format, series.units)?;
            let value =
                stats::percentile(&loaded.samples, exp.percentile).map_err(|e| e.in_file(&path))?;
            let summary = Summary::from_samples(&loaded.samples).map_err(|e| e.in_file(&path))?;
            values.insert(axis, value);
            cells.insert(axis, summary);
        }
        builder = builder.series_from_map(series.label.as_str(), &exp.axis, &values)?;
        summaries.insert(series.label.clone(), cells);
    }

    Ok(LatencyOutcome {
        grid: builder.build(),
        summaries,
    })
}

/// Maximum throughput per target rate for every series.
pub fn run_throughput(exp: &ThroughputExperiment) -> Result<ExperimentGrid> {
    tracing::info!(
        experiment = %exp.name,
        rates = exp.rates.len(),
        series = exp.series.len(),
        "running throughput comparison"
    );

    let mut builder = GridBuilder::new();
    for series in &exp.series {
        let observations = loader::load_run_keyed_file(&series.path)?;
        let maxima: HashMap<u64, f64> = stats::max_per_run(&observations, &exp.rates)
            .map_err(|e| e.in_file(&series.path))?
            .into_iter()
            .collect();
        builder = builder.series_from_map(series.label.as_str(), &exp.rates, &maxima)?;
    }

    Ok(builder.build())
}

/// Output of a ratio experiment.
#[derive(Debug)]
pub struct RatioOutcome {
    /// Dense per-second counts for the baseline and every numerator.
    pub counts: ExperimentGrid,
    /// Ratios that could be computed, one series per numerator.
    pub ratios: ExperimentGrid,
    pub summaries: Vec<RatioSummary>,
}

impl RatioOutcome {
    /// Number of entries with an undefined ratio.
    pub fn degenerate(&self) -> usize {
        self.summaries.iter().map(|s| s.errors.len()).sum()
    }
}

/// Per-second counts of each numerator relative to the baseline.
pub fn run_ratio(exp: &RatioExperiment) -> Result<RatioOutcome> {
    tracing::info!(
        experiment = %exp.name,
        baseline = %exp.baseline,
        numerators = exp.numerators.len(),
        "running ratio report"
    );

    let maps = loader::load_bucket_map_file(&exp.path)?;
    let lookup = |label: &str| {
        maps.get(label).ok_or_else(|| {
            AnalysisError::Config(format!("{}: no count map labelled '{}'", exp.name, label))
                .in_file(&exp.path)
        })
    };

    let baseline = lookup(exp.baseline.as_str())?;
    let numerators = exp
        .numerators
        .iter()
        .map(|label| lookup(label.as_str()).map(|m| (label.as_str(), m)))
        .collect::<Result<Vec<_>>>()?;

    let max_key = grid::max_bucket(
        std::iter::once(baseline).chain(numerators.iter().map(|(_, m)| *m)),
    )
    .unwrap_or(0);
    let buckets: Vec<u64> = (0..=max_key).collect();

    let mut counts = GridBuilder::new().series_from_map(
        exp.baseline.as_str(),
        &buckets,
        &grid::fill_buckets(baseline, max_key),
    )?;
    let mut ratios = GridBuilder::new();
    let mut summaries = Vec::with_capacity(numerators.len());

    for (label, numerator) in numerators {
        counts = counts.series_from_map(label, &buckets, &grid::fill_buckets(numerator, max_key))?;

        let report = ratio_report(numerator, baseline);
        let ok: HashMap<u64, f64> = report.ok_values().into_iter().collect();
        let keys: Vec<u64> = report
            .entries
            .iter()
            .filter(|e| e.ratio.is_ok())
            .map(|e| e.key)
            .collect();
        ratios = ratios.series_from_map(label, &keys, &ok)?;

        summaries.push(RatioSummary::new(label, &exp.baseline, &report));
    }

    Ok(RatioOutcome {
        counts: counts.build(),
        ratios: ratios.build(),
        summaries,
    })
}
