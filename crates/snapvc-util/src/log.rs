//! Logging setup using tracing.
//!
//! This module provides consistent logging configuration across snapvc.
//! Logs always go to stderr so that stdout stays reserved for command output
//! such as snapshot fingerprints.

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Crates whose log output is controlled by the configured level.
const CRATE_TARGETS: &[&str] = &["snapvc", "snapvc_snapshot", "snapvc_storage", "snapvc_util"];

/// Log level configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// Log level for the snapvc crates.
    pub level: LogLevel,
    /// Raise the level to at least `debug` and tag lines with file and line.
    pub verbose: bool,
}

impl LogConfig {
    /// The effective level after applying `verbose`.
    pub fn effective_level(&self) -> LogLevel {
        match (self.verbose, self.level) {
            (true, LogLevel::Trace) => LogLevel::Trace,
            (true, _) => LogLevel::Debug,
            (false, level) => level,
        }
    }

    /// Build the `EnvFilter` directive string, e.g. `snapvc=info,snapvc_snapshot=info`.
    pub fn filter_directive(&self) -> String {
        let level = self.effective_level().as_str();
        CRATE_TARGETS
            .iter()
            .map(|target| format!("{target}={level}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Initialize logging with the given configuration.
///
/// `RUST_LOG` takes precedence over the configured level when set.
/// This should be called once at application startup.
pub fn init(config: LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.filter_directive()));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_file(config.verbose)
        .with_line_number(config.verbose);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_defaults_to_warn() {
        assert_eq!(LogLevel::default(), LogLevel::Warn);
        assert_eq!(LogConfig::default().level, LogLevel::default());
    }

    #[test]
    fn test_log_level_as_str() {
        assert_eq!(LogLevel::Debug.as_str(), "debug");
        assert_eq!(LogLevel::Error.as_str(), "error");
    }

    #[test]
    fn test_log_level_deserializes_lowercase() {
        let level: LogLevel = serde_json::from_str("\"trace\"").unwrap();
        assert_eq!(level, LogLevel::Trace);
    }

    #[test]
    fn test_default_log_config() {
        let config = LogConfig::default();
        assert!(!config.verbose);
        assert_eq!(config.effective_level(), LogLevel::Warn);
    }

    #[test]
    fn test_verbose_raises_level() {
        let config = LogConfig {
            level: LogLevel::Error,
            verbose: true,
        };
        assert_eq!(config.effective_level(), LogLevel::Debug);

        let config = LogConfig {
            level: LogLevel::Trace,
            verbose: true,
        };
        assert_eq!(config.effective_level(), LogLevel::Trace);
    }

    #[test]
    fn test_filter_directive_covers_all_crates() {
        let config = LogConfig {
            level: LogLevel::Info,
            ..LogConfig::default()
        };
        let directive = config.filter_directive();
        assert!(directive.starts_with("snapvc=info,"));
        assert!(directive.contains("snapvc_snapshot=info"));
        assert!(directive.contains("snapvc_storage=info"));
    }
}
