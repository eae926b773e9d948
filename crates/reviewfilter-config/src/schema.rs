//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// DevTools endpoint of the browser hosting the review pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_endpoint() -> String {
    "http://localhost:9222".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

/// Where the session and global records live.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Defaults to `~/.reviewfilter`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl StorageConfig {
    /// Resolved storage directory.
    pub fn resolved_dir(&self) -> PathBuf {
        match &self.dir {
            Some(dir) => PathBuf::from(crate::ConfigLoader::expand_path(&dir.to_string_lossy())),
            None => default_data_dir(),
        }
    }
}

/// Default data directory: `~/.reviewfilter`, or `./.reviewfilter` without a home.
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".reviewfilter")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Also write daily log files under `<storage dir>/logs`.
    #[serde(default = "default_true")]
    pub file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_true(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.browser.endpoint, "http://localhost:9222");
        assert_eq!(config.browser.request_timeout_secs, 30);
        assert!(config.storage.dir.is_none());
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.file);
    }

    #[test]
    fn test_resolved_dir_default() {
        let dir = StorageConfig::default().resolved_dir();
        assert!(dir.ends_with(".reviewfilter"));
    }

    #[test]
    fn test_resolved_dir_expands_tilde() {
        let storage = StorageConfig {
            dir: Some(PathBuf::from("~/filters")),
        };
        let dir = storage.resolved_dir();
        assert!(!dir.to_string_lossy().starts_with('~'));
        assert!(dir.ends_with("filters"));
    }
}
