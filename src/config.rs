//! Experiment configuration.
//!
//! Axis values, file name templates and chart settings for every
//! comparison live in a TOML file rather than in code.
//!
//! ```toml
//! [output]
//! directory = "results"
//!
//! [[latency]]
//! name = "kademlia-vs-cycle"
//! percentile = 90.0
//! axis = [1, 10, 100, 1000]
//! x_scale = "log"
//!
//! [[latency.series]]
//! label = "kademlia"
//! path = "kademlia_vs_cycle/kademlia/latency_{axis}_replicas.csv"
//! format = "csv"
//! ```

use crate::error::{AnalysisError, Result};
use crate::loader::SampleFormat;
use crate::render::{ChartOptions, Scale, Threshold};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Placeholder replaced by the axis value in latency file templates.
pub const AXIS_PLACEHOLDER: &str = "{axis}";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub latency: Vec<LatencyExperiment>,
    #[serde(default)]
    pub throughput: Vec<ThroughputExperiment>,
    #[serde(default)]
    pub ratio: Vec<RatioExperiment>,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Log format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include timestamps.
    #[serde(default = "LoggingConfig::default_timestamps")]
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            format: LogFormat::default(),
            timestamps: Self::default_timestamps(),
        }
    }
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }

    fn default_timestamps() -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory for charts and JSON summaries.
    #[serde(default = "OutputConfig::default_directory")]
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: Self::default_directory(),
        }
    }
}

impl OutputConfig {
    fn default_directory() -> PathBuf {
        PathBuf::from("results")
    }
}

/// Chart settings shared by every experiment kind.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartConfig {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub axis_title: Option<String>,
    #[serde(default)]
    pub value_title: Option<String>,
    #[serde(default)]
    pub x_scale: Scale,
    #[serde(default)]
    pub y_scale: Scale,
    #[serde(default)]
    pub threshold: Option<Threshold>,
}

impl ChartConfig {
    pub fn options(&self, name: &str, axis_title: &str, value_title: &str) -> ChartOptions {
        ChartOptions {
            title: self.title.clone().unwrap_or_else(|| name.to_string()),
            x_title: self.axis_title.clone().unwrap_or_else(|| axis_title.to_string()),
            y_title: self.value_title.clone().unwrap_or_else(|| value_title.to_string()),
            x_scale: self.x_scale,
            y_scale: self.y_scale,
            threshold: self.threshold.clone(),
        }
    }
}

/// Percentile latency per axis value, one series per overlay kind.
#[derive(Debug, Clone, Deserialize)]
pub struct LatencyExperiment {
    pub name: String,
    #[serde(default = "LatencyExperiment::default_percentile")]
    pub percentile: f64,
    pub axis: Vec<u64>,
    #[serde(flatten)]
    pub chart: ChartConfig,
    pub series: Vec<LatencySeries>,
}

impl LatencyExperiment {
    fn default_percentile() -> f64 {
        99.0
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LatencySeries {
    pub label: String,
    /// File template; `{axis}` is replaced by each axis value.
    pub path: String,
    #[serde(default)]
    pub format: SampleFormat,
    /// Lines carry a unit suffix (`ns`, `µs`).
    #[serde(default)]
    pub units: bool,
}

impl LatencySeries {
    pub fn path_for(&self, axis: u64) -> PathBuf {
        PathBuf::from(self.path.replace(AXIS_PLACEHOLDER, &axis.to_string()))
    }
}

/// Maximum throughput per target rate, one series per node-count variant.
#[derive(Debug, Clone, Deserialize)]
pub struct ThroughputExperiment {
    pub name: String,
    pub rates: Vec<u64>,
    #[serde(flatten)]
    pub chart: ChartConfig,
    pub series: Vec<ThroughputSeries>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThroughputSeries {
    pub label: String,
    /// Run-keyed file: `<rate> <throughput>` per line.
    pub path: PathBuf,
}

/// Ratios of per-second counts against a baseline map.
#[derive(Debug, Clone, Deserialize)]
pub struct RatioExperiment {
    pub name: String,
    /// Load generator log holding the printed count maps.
    pub path: PathBuf,
    pub baseline: String,
    pub numerators: Vec<String>,
    #[serde(flatten)]
    pub chart: ChartConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        config.validate()?;
        Ok(config)
    }

    /// Make relative data paths relative to the config file's directory.
    pub fn resolve_paths(&mut self, base: &Path) {
        let join = |p: &str| -> String {
            if Path::new(p).is_absolute() {
                p.to_string()
            } else {
                base.join(p).to_string_lossy().into_owned()
            }
        };
        for exp in &mut self.latency {
            for series in &mut exp.series {
                series.path = join(&series.path);
            }
        }
        for exp in &mut self.throughput {
            for series in &mut exp.series {
                series.path = PathBuf::from(join(&series.path.to_string_lossy()));
            }
        }
        for exp in &mut self.ratio {
            exp.path = PathBuf::from(join(&exp.path.to_string_lossy()));
        }
        if self.output.directory.is_relative() {
            self.output.directory = base.join(&self.output.directory);
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        let all_names = self
            .latency
            .iter()
            .map(|e| &e.name)
            .chain(self.throughput.iter().map(|e| &e.name))
            .chain(self.ratio.iter().map(|e| &e.name));
        for name in all_names {
            if !names.insert(name) {
                return Err(invalid(format!("experiment name '{}' is used twice", name)));
            }
        }

        for exp in &self.latency {
            if !(0.0..=100.0).contains(&exp.percentile) {
                return Err(invalid(format!(
                    "{}: percentile {} must be within 0..=100",
                    exp.name, exp.percentile
                )));
            }
            check_axis(&exp.name, "axis", &exp.axis, &exp.chart)?;
            check_labels(&exp.name, exp.series.iter().map(|s| s.label.as_str()))?;
            if exp.axis.len() > 1 {
                if let Some(s) = exp.series.iter().find(|s| !s.path.contains(AXIS_PLACEHOLDER)) {
                    return Err(invalid(format!(
                        "{}: series '{}' path has no {} placeholder",
                        exp.name, s.label, AXIS_PLACEHOLDER
                    )));
                }
            }
        }

        for exp in &self.throughput {
            check_axis(&exp.name, "rates", &exp.rates, &exp.chart)?;
            check_labels(&exp.name, exp.series.iter().map(|s| s.label.as_str()))?;
        }

        for exp in &self.ratio {
            if exp.numerators.is_empty() {
                return Err(invalid(format!("{}: no numerators", exp.name)));
            }
            if exp.numerators.contains(&exp.baseline) {
                return Err(invalid(format!(
                    "{}: baseline '{}' is also a numerator",
                    exp.name, exp.baseline
                )));
            }
            check_labels(&exp.name, exp.numerators.iter().map(|s| s.as_str()))?;
            if exp.chart.x_scale == Scale::Log {
                return Err(invalid(format!(
                    "{}: timestamp buckets start at 0, x_scale cannot be log",
                    exp.name
                )));
            }
        }

        Ok(())
    }

    pub fn experiment_names(&self) -> Vec<&str> {
        self.latency
            .iter()
            .map(|e| e.name.as_str())
            .chain(self.throughput.iter().map(|e| e.name.as_str()))
            .chain(self.ratio.iter().map(|e| e.name.as_str()))
            .collect()
    }
}

fn check_axis(name: &str, field: &str, axis: &[u64], chart: &ChartConfig) -> Result<()> {
    if axis.is_empty() {
        return Err(invalid(format!("{}: {} must not be empty", name, field)));
    }
    let mut seen = HashSet::new();
    if let Some(dup) = axis.iter().find(|v| !seen.insert(**v)) {
        return Err(invalid(format!("{}: {} value {} repeats", name, field, dup)));
    }
    if chart.x_scale == Scale::Log && axis.contains(&0) {
        return Err(invalid(format!(
            "{}: {} contains 0 but x_scale is log",
            name, field
        )));
    }
    Ok(())
}

fn check_labels<'a>(name: &str, labels: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    let mut count = 0;
    for label in labels {
        count += 1;
        if !seen.insert(label) {
            return Err(invalid(format!("{}: series label '{}' repeats", name, label)));
        }
    }
    if count == 0 {
        return Err(invalid(format!("{}: no series configured", name)));
    }
    Ok(())
}

fn invalid(msg: String) -> AnalysisError {
    AnalysisError::Config(msg)
}
