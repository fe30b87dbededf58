//! Analysis of benchmark results from consistent hashing overlay experiments.
//!
//! Raw files written by the load generators flow through four stages:
//!
//! - [`loader`] parses flat latency files (optionally unit suffixed, see
//!   [`units`]), CSV sample files, run-keyed throughput files and printed
//!   per-second count maps.
//! - [`stats`] reduces samples to percentiles, means and per-run maxima.
//! - [`grid`] arranges aggregated values by series and caller-ordered axis.
//! - [`render`] and [`ratio`] turn grids and keyed maps into charts, tables
//!   and ratio reports.
//!
//! [`experiment`] wires the stages together for the comparisons declared in
//! a [`config::Config`].

pub mod config;
pub mod error;
pub mod experiment;
pub mod grid;
pub mod loader;
pub mod logging;
pub mod output;
pub mod ratio;
pub mod render;
pub mod stats;
pub mod units;

pub use config::Config;
pub use error::{AnalysisError, Result};
pub use grid::{Cell, ExperimentGrid, GridBuilder, Series};
pub use loader::{LatencySamples, SampleFormat};
pub use ratio::{RatioReport, ratio_report};
pub use render::{ChartOptions, Scale, StyleMap};
pub use stats::{RunObservations, Summary, max_per_run, mean, percentile};
pub use units::{Unit, UnitNormalizer};
