//! Error types for measurement loading and aggregation.

use std::path::PathBuf;

/// Errors raised by the analysis pipeline.
///
/// Every variant is fatal for the stage that produced it. Loads never return
/// partial results.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// A line or field could not be converted to a number.
    #[error("line {line}: cannot parse {text:?}: {reason}")]
    Parse {
        line: usize,
        text: String,
        reason: String,
    },

    /// A unit marker with no known conversion factor.
    #[error("unit {marker:?} does not have a conversion factor")]
    UnknownUnit { marker: String },

    /// Statistics requested over zero samples.
    #[error("cannot compute {statistic} over an empty sample sequence")]
    EmptyInput { statistic: &'static str },

    /// A percentile outside 0..=100.
    #[error("invalid percentile {0} (expected 0..=100)")]
    InvalidPercentile(f64),

    /// A requested run has no recorded observations.
    #[error("run {key} has no recorded observations")]
    MissingRun { key: u64 },

    /// A ratio whose baseline is zero.
    #[error("baseline for key {key} is zero, ratio is undefined")]
    DegenerateRatio { key: String },

    /// A failure while loading a specific file.
    #[error("{}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: Box<AnalysisError>,
    },

    /// Invalid experiment configuration.
    #[error("config error: {0}")]
    Config(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalysisError {
    pub(crate) fn parse(line: usize, text: &str, reason: impl ToString) -> Self {
        Self::Parse {
            line,
            text: text.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Attach the path of the file being loaded.
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        Self::File {
            path: path.into(),
            source: Box::new(self),
        }
    }

    /// The underlying error with any file context removed.
    pub fn root(&self) -> &AnalysisError {
        match self {
            Self::File { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<toml::de::Error> for AnalysisError {
    fn from(e: toml::de::Error) -> Self {
        Self::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_context() {
        let err = AnalysisError::MissingRun { key: 100 }.in_file("runs.txt");
        assert_eq!(err.to_string(), "runs.txt: run 100 has no recorded observations");
        assert!(matches!(err.root(), AnalysisError::MissingRun { key: 100 }));
    }

    #[test]
    fn test_parse_message() {
        let err = AnalysisError::parse(3, "abc", "invalid float literal");
        assert_eq!(
            err.to_string(),
            "line 3: cannot parse \"abc\": invalid float literal"
        );
    }
}
