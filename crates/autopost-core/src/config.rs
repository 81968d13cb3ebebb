//! Configuration module
//!
//! Watch configurations are owned by whoever stores the settings (a JSON file
//! for the bundled binary). Every other component treats them as read-only
//! snapshots handed out by a [`crate::ConfigProvider`].

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

// Common constants
const DEFAULT_WATCH_INTERVAL_SECS: u64 = 10;
const DEFAULT_LOG_BUFFER_SIZE: usize = 100;

/// Upload byte budget enforced by the image store before delivery.
pub const MAX_UPLOAD_BYTES: u64 = 8_000_000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config file {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value for {name}: {value}")]
    InvalidEnv { name: &'static str, value: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// One watched directory and where its screenshots go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub webhook_url: String,
    /// Overrides the posting identity when set.
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default = "default_true")]
    pub watermark: bool,
    /// New uploads wait in `Pending` for a review decision.
    #[serde(default)]
    pub hold_uploads: bool,
    /// Paths containing any of these substrings are ignored.
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl WatchConfig {
    pub fn new(path: impl Into<PathBuf>, webhook_url: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            webhook_url: webhook_url.into(),
            username: None,
            watermark: true,
            hold_uploads: false,
            exclude: Vec::new(),
        }
    }

    pub fn has_webhook(&self) -> bool {
        !self.webhook_url.trim().is_empty()
    }

    /// Username override, ignoring blank values.
    pub fn username_override(&self) -> Option<&str> {
        self.username
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// True if `path` contains any configured exclusion substring.
    pub fn is_excluded(&self, path: &Path) -> bool {
        let path = path.to_string_lossy();
        self.exclude
            .iter()
            .filter(|pattern| !pattern.is_empty())
            .any(|pattern| path.contains(pattern.as_str()))
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_watch_interval")]
    pub watch_interval_secs: u64,
    #[serde(default = "default_log_buffer_size")]
    pub log_buffer_size: usize,
    #[serde(default)]
    pub watchers: Vec<WatchConfig>,
}

fn default_watch_interval() -> u64 {
    DEFAULT_WATCH_INTERVAL_SECS
}

fn default_log_buffer_size() -> usize {
    DEFAULT_LOG_BUFFER_SIZE
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            watch_interval_secs: DEFAULT_WATCH_INTERVAL_SECS,
            log_buffer_size: DEFAULT_LOG_BUFFER_SIZE,
            watchers: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Build configuration from the environment.
    ///
    /// `AUTOPOST_CONFIG` names a JSON file to load (defaults apply when unset);
    /// `AUTOPOST_WATCH_INTERVAL_SECS` overrides the scan interval.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut config = match env::var("AUTOPOST_CONFIG") {
            Ok(path) if !path.trim().is_empty() => Self::load(path.trim())?,
            _ => Self::default(),
        };

        if let Ok(value) = env::var("AUTOPOST_WATCH_INTERVAL_SECS") {
            config.watch_interval_secs =
                value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidEnv {
                        name: "AUTOPOST_WATCH_INTERVAL_SECS",
                        value,
                    })?;
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.watch_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "watch_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.log_buffer_size == 0 {
            return Err(ConfigError::Invalid(
                "log_buffer_size must be greater than zero".to_string(),
            ));
        }
        for (index, watcher) in self.watchers.iter().enumerate() {
            if watcher.path.as_os_str().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "watcher {} has an empty path",
                    index
                )));
            }
            if !watcher.has_webhook() {
                tracing::warn!(
                    path = %watcher.path.display(),
                    "Watcher has no webhook URL configured, uploads will wait"
                );
            }
        }
        Ok(())
    }

    pub fn watch_interval(&self) -> Duration {
        Duration::from_secs(self.watch_interval_secs)
    }
}
