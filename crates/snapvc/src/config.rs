//! Configuration loading and management.
//!
//! Configuration is loaded from multiple sources with the following precedence
//! (later sources override earlier):
//! 1. Global config: `~/.config/snapvc/config.json`
//! 2. Environment variable: `SNAPVC_CONFIG_CONTENT`
//! 3. Project config: `snapvc.json` in the working-tree root
//! 4. Command-line overrides such as `--store-dir`

use serde::{Deserialize, Serialize};
use snapvc_snapshot::SnapshotConfig;
use snapvc_util::path::is_safe_relative;
use snapvc_util::{LogConfig, LogLevel};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the project config file.
pub const PROJECT_CONFIG_FILE: &str = "snapvc.json";

/// Environment variable holding inline JSON configuration.
pub const CONFIG_CONTENT_ENV: &str = "SNAPVC_CONFIG_CONTENT";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {source_name}: {message}")]
    InvalidJson {
        source_name: String,
        message: String,
    },

    #[error("Invalid store directory {0:?}: must be a relative path without `..`")]
    InvalidStoreDir(PathBuf),
}

/// Main configuration structure.
///
/// Every field is optional so that partial files merge cleanly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Store directory, relative to the working-tree root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_dir: Option<PathBuf>,

    /// Default log level when `RUST_LOG` is not set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<LogLevel>,
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Returns the merged configuration and a description of each source that
    /// contributed to it.
    pub fn load(project_dir: &Path) -> Result<(Self, Vec<String>), ConfigError> {
        let global = global_config_dir().map(|dir| dir.join("config.json"));
        let inline = std::env::var(CONFIG_CONTENT_ENV).ok();
        Self::load_from(global.as_deref(), inline.as_deref(), project_dir)
    }

    fn load_from(
        global_file: Option<&Path>,
        inline: Option<&str>,
        project_dir: &Path,
    ) -> Result<(Self, Vec<String>), ConfigError> {
        let mut config = Config::default();
        let mut sources = Vec::new();

        // 1. Global config
        if let Some(path) = global_file.filter(|p| p.is_file()) {
            config = config.merge(Self::load_file(path)?);
            sources.push(path.display().to_string());
        }

        // 2. Environment variable
        if let Some(content) = inline {
            config = config.merge(Self::parse(content, CONFIG_CONTENT_ENV)?);
            sources.push(format!("${CONFIG_CONTENT_ENV}"));
        }

        // 3. Project config
        let path = project_dir.join(PROJECT_CONFIG_FILE);
        if path.is_file() {
            config = config.merge(Self::load_file(&path)?);
            sources.push(path.display().to_string());
        }

        config.validate()?;
        Ok((config, sources))
    }

    /// Load configuration from a single file.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Parse configuration text. `source_name` is used in error messages.
    pub fn parse(content: &str, source_name: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|e| ConfigError::InvalidJson {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })
    }

    /// Merge another config into this one. Values set in `other` win.
    pub fn merge(mut self, other: Self) -> Self {
        if other.store_dir.is_some() {
            self.store_dir = other.store_dir;
        }
        if other.log_level.is_some() {
            self.log_level = other.log_level;
        }
        self
    }

    /// Reject values that would place the store outside the working tree.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.store_dir {
            Some(dir) if !is_safe_relative(dir) => Err(ConfigError::InvalidStoreDir(dir.clone())),
            _ => Ok(()),
        }
    }

    pub fn snapshot_config(&self) -> SnapshotConfig {
        match &self.store_dir {
            Some(dir) => SnapshotConfig {
                store_dir: dir.clone(),
            },
            None => SnapshotConfig::default(),
        }
    }

    pub fn log_config(&self, verbose: bool) -> LogConfig {
        LogConfig {
            level: self.log_level.unwrap_or_default(),
            verbose,
        }
    }
}

/// Get the global config directory.
///
/// On Unix, prefers `~/.config/snapvc` when it exists, then falls back to
/// the platform config directory.
pub fn global_config_dir() -> Option<PathBuf> {
    #[cfg(unix)]
    {
        if let Some(home) = dirs::home_dir() {
            let xdg_config = home.join(".config").join("snapvc");
            if xdg_config.exists() {
                return Some(xdg_config);
            }
        }
    }

    snapvc_util::path::config_dir()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let (config, sources) = Config::load_from(None, None, Path::new("/nonexistent")).unwrap();
        assert_eq!(config, Config::default());
        assert!(sources.is_empty());
        assert_eq!(config.snapshot_config().store_dir, PathBuf::from(".snapvc"));
        assert_eq!(config.log_config(false).level, LogLevel::Warn);
    }

    #[test]
    fn test_merge_later_wins() {
        let base = Config {
            store_dir: Some(PathBuf::from("one")),
            log_level: Some(LogLevel::Info),
        };
        let over = Config {
            store_dir: Some(PathBuf::from("two")),
            log_level: None,
        };

        let merged = base.merge(over);
        assert_eq!(merged.store_dir, Some(PathBuf::from("two")));
        assert_eq!(merged.log_level, Some(LogLevel::Info));
    }

    #[test]
    fn test_source_precedence() {
        let global = TempDir::new().unwrap();
        let global_file = global.path().join("config.json");
        fs::write(&global_file, r#"{"store_dir": "global", "log_level": "error"}"#).unwrap();

        let project = TempDir::new().unwrap();
        fs::write(project.path().join(PROJECT_CONFIG_FILE), r#"{"store_dir": "project"}"#).unwrap();

        let (config, sources) = Config::load_from(
            Some(&global_file),
            Some(r#"{"log_level": "debug"}"#),
            project.path(),
        )
        .unwrap();

        assert_eq!(config.store_dir, Some(PathBuf::from("project")));
        assert_eq!(config.log_level, Some(LogLevel::Debug));
        assert_eq!(sources.len(), 3);
        assert_eq!(sources[1], "$SNAPVC_CONFIG_CONTENT");
    }

    #[test]
    fn test_invalid_json_names_source() {
        let err = Config::parse("{ nope", "inline").unwrap_err();
        assert!(err.to_string().contains("inline"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(Config::parse(r#"{"stor_dir": "x"}"#, "inline").is_err());
    }

    #[test]
    fn test_escaping_store_dir_rejected() {
        for bad in ["../elsewhere", "/abs/store", ""] {
            let config = Config {
                store_dir: Some(PathBuf::from(bad)),
                log_level: None,
            };
            assert!(
                matches!(config.validate(), Err(ConfigError::InvalidStoreDir(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_verbose_raises_level() {
        let config = Config {
            store_dir: None,
            log_level: Some(LogLevel::Error),
        };
        assert_eq!(config.log_config(true).effective_level(), LogLevel::Debug);
    }
}
