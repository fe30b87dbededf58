//! Structured logging initialization.
//!
//! The RUST_LOG environment variable takes precedence over configuration file
//! settings. Logs go to stderr so that tables and statistics on stdout stay
//! clean for piping.

use crate::config::{LogFormat, LoggingConfig};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize the logging subsystem.
///
/// # Example
///
/// ```ignore
/// use hashring_eval::config::LoggingConfig;
/// use hashring_eval::logging;
///
/// logging::init(&LoggingConfig::default());
/// tracing::info!("analysis starting");
/// ```
pub fn init(config: &LoggingConfig) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(config.level.as_str())
    };

    let registry = tracing_subscriber::registry().with(filter);

    match (config.format, config.timestamps) {
        (LogFormat::Pretty, true) => {
            registry
                .with(fmt::layer().with_writer(std::io::stderr).with_ansi(true))
                .init();
        }
        (LogFormat::Pretty, false) => {
            registry
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_ansi(true)
                        .without_time(),
                )
                .init();
        }
        (LogFormat::Compact, true) => {
            registry
                .with(fmt::layer().with_writer(std::io::stderr).compact())
                .init();
        }
        (LogFormat::Compact, false) => {
            registry
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .compact()
                        .without_time(),
                )
                .init();
        }
        (LogFormat::Json, true) => {
            registry
                .with(fmt::layer().with_writer(std::io::stderr).json())
                .init();
        }
        (LogFormat::Json, false) => {
            registry
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .json()
                        .without_time(),
                )
                .init();
        }
    }
}
