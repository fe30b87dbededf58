//! Persistence of analysis results.
//!
//! Nothing in the pipeline writes files on its own. The driver calls these
//! writers explicitly after a grid or report has been built.

pub mod format;

use crate::error::Result;
use crate::experiment::LatencyOutcome;
use crate::grid::ExperimentGrid;
use crate::ratio::RatioSummary;
use crate::stats::Summary;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// A grid with the metadata needed to interpret it later.
#[derive(Debug, Serialize)]
pub struct GridExport<'a> {
    pub name: &'a str,
    pub statistic: &'a str,
    pub generated_at: DateTime<Utc>,
    pub grid: &'a ExperimentGrid,
    /// Per-cell sample summaries, keyed by label then axis value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summaries: Option<&'a BTreeMap<String, BTreeMap<u64, Summary>>>,
}

/// Write a grid as pretty-printed JSON.
pub fn write_grid_json(
    path: &Path,
    name: &str,
    statistic: &str,
    grid: &ExperimentGrid,
) -> Result<()> {
    let export = GridExport {
        name,
        statistic,
        generated_at: Utc::now(),
        grid,
        summaries: None,
    };
    write(path, serde_json::to_string_pretty(&export).map_err(std::io::Error::other)?)
}

/// Write a latency grid together with the summary behind every cell.
pub fn write_latency_json(
    path: &Path,
    name: &str,
    statistic: &str,
    outcome: &LatencyOutcome,
) -> Result<()> {
    let export = GridExport {
        name,
        statistic,
        generated_at: Utc::now(),
        grid: &outcome.grid,
        summaries: Some(&outcome.summaries),
    };
    write(path, serde_json::to_string_pretty(&export).map_err(std::io::Error::other)?)
}

/// Write a set of ratio summaries as pretty-printed JSON.
pub fn write_ratio_json(path: &Path, summaries: &[RatioSummary]) -> Result<()> {
    write(path, serde_json::to_string_pretty(summaries).map_err(std::io::Error::other)?)
}

/// Write a rendered chart page.
pub fn write_chart(path: &Path, html: &str) -> Result<()> {
    write(path, html.to_string())
}

fn write(path: &Path, contents: String) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    tracing::info!(path = %path.display(), "wrote output");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridBuilder;

    #[test]
    fn test_write_grid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("grid.json");
        let grid = GridBuilder::new()
            .series("cycle", &[1, 10], |x| Ok(x as f64))
            .unwrap()
            .build();

        write_grid_json(&path, "replicas", "p90", &grid).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["name"], "replicas");
        assert_eq!(value["grid"]["series"][0]["label"], "cycle");
        assert_eq!(value["grid"]["series"][0]["cells"][1]["axis"], 10);
        assert!(value.get("summaries").is_none());
    }

    #[test]
    fn test_write_latency_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latency.json");
        let grid = GridBuilder::new()
            .series("cycle", &[10], |_| Ok(300.0))
            .unwrap()
            .build();
        let summary = Summary::from_samples(&[100.0, 200.0, 300.0]).unwrap();
        let outcome = LatencyOutcome {
            grid,
            summaries: BTreeMap::from([(
                "cycle".to_string(),
                BTreeMap::from([(10, summary)]),
            )]),
        };

        write_latency_json(&path, "replicas", "p99", &outcome).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["summaries"]["cycle"]["10"]["count"], 3);
        assert_eq!(value["summaries"]["cycle"]["10"]["mean"], 200.0);
    }
}
