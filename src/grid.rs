//! Experiment grids: aggregated cells arranged by series and axis value.
//!
//! A grid is the hand-off between aggregation and rendering. Building one
//! never touches the filesystem; callers load and aggregate first, then
//! hand the builder a lookup per series.

use crate::error::{AnalysisError, Result};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// One aggregated data point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Cell {
    pub axis: u64,
    pub value: f64,
}

/// Cells sharing a label, in caller-supplied axis order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub label: String,
    pub cells: Vec<Cell>,
}

impl Series {
    pub fn value_at(&self, axis: u64) -> Option<f64> {
        self.cells.iter().find(|c| c.axis == axis).map(|c| c.value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExperimentGrid {
    pub series: Vec<Series>,
}

impl ExperimentGrid {
    pub fn labels(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.label.as_str()).collect()
    }

    pub fn get(&self, label: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.label == label)
    }

    /// Every axis value in first-seen order across series.
    pub fn axis_values(&self) -> Vec<u64> {
        let mut values = Vec::new();
        for cell in self.series.iter().flat_map(|s| &s.cells) {
            if !values.contains(&cell.axis) {
                values.push(cell.axis);
            }
        }
        values
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Assembles an [`ExperimentGrid`] one series at a time.
///
/// Axis order is exactly what the caller passes. Nothing is sorted.
#[derive(Debug, Default)]
pub struct GridBuilder {
    series: Vec<Series>,
}

impl GridBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a series whose cells are computed by `value_of` for each axis
    /// value. The first error aborts the series.
    pub fn series<F>(
        mut self,
        label: impl Into<String>,
        axis: &[u64],
        mut value_of: F,
    ) -> Result<Self>
    where
        F: FnMut(u64) -> Result<f64>,
    {
        let cells = axis
            .iter()
            .map(|&axis| value_of(axis).map(|value| Cell { axis, value }))
            .collect::<Result<Vec<_>>>()?;

        self.series.push(Series {
            label: label.into(),
            cells,
        });
        Ok(self)
    }

    /// Add a series from a pre-computed map. A requested axis value absent
    /// from the map is a missing run.
    pub fn series_from_map(
        self,
        label: impl Into<String>,
        axis: &[u64],
        values: &HashMap<u64, f64>,
    ) -> Result<Self> {
        self.series(label, axis, |key| {
            values
                .get(&key)
                .copied()
                .ok_or(AnalysisError::MissingRun { key })
        })
    }

    pub fn build(self) -> ExperimentGrid {
        ExperimentGrid {
            series: self.series,
        }
    }
}

/// Dense per-second buckets `0..=max_key`, zero where `counts` has no
/// entry.
pub fn fill_buckets(counts: &BTreeMap<u64, f64>, max_key: u64) -> HashMap<u64, f64> {
    (0..=max_key)
        .map(|key| (key, counts.get(&key).copied().unwrap_or(0.0)))
        .collect()
}

/// Largest key across a set of bucket maps.
pub fn max_bucket<'a>(maps: impl IntoIterator<Item = &'a BTreeMap<u64, f64>>) -> Option<u64> {
    maps.into_iter()
        .filter_map(|m| m.keys().next_back().copied())
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_order_preserved() {
        let axis = [1000, 1, 100, 10];
        let grid = GridBuilder::new()
            .series("kademlia", &axis, |x| Ok(x as f64 * 2.0))
            .unwrap()
            .build();

        let cells = &grid.get("kademlia").unwrap().cells;
        assert_eq!(
            cells.iter().map(|c| c.axis).collect::<Vec<_>>(),
            vec![1000, 1, 100, 10]
        );
        assert_eq!(cells[0].value, 2000.0);
    }

    #[test]
    fn test_multiple_series() {
        let axis = [1, 10, 100];
        let ring: HashMap<u64, f64> = [(1, 5.0), (10, 6.0), (100, 9.0), (1000, 12.0)]
            .into_iter()
            .collect();

        let grid = GridBuilder::new()
            .series("kademlia", &axis, |_| Ok(1.0))
            .unwrap()
            .series_from_map("cycle", &axis, &ring)
            .unwrap()
            .build();

        assert_eq!(grid.labels(), vec!["kademlia", "cycle"]);
        let cycle = grid.get("cycle").unwrap();
        assert_eq!(cycle.cells.len(), 3);
        assert_eq!(cycle.value_at(100), Some(9.0));
        assert_eq!(cycle.value_at(1000), None);
        assert_eq!(grid.axis_values(), vec![1, 10, 100]);
    }

    #[test]
    fn test_missing_map_entry() {
        let values: HashMap<u64, f64> = [(1, 5.0)].into_iter().collect();
        let result = GridBuilder::new().series_from_map("cycle", &[1, 10], &values);
        assert!(matches!(result, Err(AnalysisError::MissingRun { key: 10 })));
    }

    #[test]
    fn test_fill_buckets() {
        let sparse: BTreeMap<u64, f64> = [(2, 88.0), (4, 385.0)].into_iter().collect();
        let other: BTreeMap<u64, f64> = [(0, 1.0), (6, 1.0)].into_iter().collect();

        let max_key = max_bucket([&sparse, &other]).unwrap();
        assert_eq!(max_key, 6);

        let dense = fill_buckets(&sparse, max_key);
        assert_eq!(dense.len(), 7);
        assert_eq!(dense[&0], 0.0);
        assert_eq!(dense[&2], 88.0);
        assert_eq!(dense[&6], 0.0);

        assert_eq!(max_bucket(Vec::<&BTreeMap<u64, f64>>::new()), None);
    }

    #[test]
    fn test_error_aborts_series() {
        let mut calls = 0;
        let result = GridBuilder::new().series("a", &[1, 2, 3], |x| {
            calls += 1;
            if x == 2 {
                Err(AnalysisError::EmptyInput { statistic: "mean" })
            } else {
                Ok(0.0)
            }
        });
        assert!(result.is_err());
        assert_eq!(calls, 2);
    }
}
