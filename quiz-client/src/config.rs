//! Configuration loading for quizsync.
//!
//! Configuration is loaded from a TOML file (default: `quizsync.toml`).
//! Every section and field is optional.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Remote question bank.
    #[serde(default)]
    pub server: ServerConfig,
    /// Local question cache.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Pending-submission queue.
    #[serde(default)]
    pub queue: QueueConfig,
}

/// Remote question bank configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Service base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Scheme placed before the session id in `Authorization`.
    #[serde(default = "default_auth_scheme")]
    pub auth_scheme: String,
    /// Per-request timeout in seconds (default: 10).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Local cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database: PathBuf,
    /// Overlay budget in serialized bytes (default: 50MB).
    #[serde(default = "default_overlay_budget")]
    pub overlay_budget_bytes: usize,
}

/// Pending-queue configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct QueueConfig {
    /// Path to the queue file.
    #[serde(default = "default_queue_path")]
    pub path: PathBuf,
}

fn default_base_url() -> String {
    "https://sweng-quiz.appspot.com".to_string()
}

fn default_auth_scheme() -> String {
    "Tequila".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_database_path() -> PathBuf {
    PathBuf::from("quizsync.db")
}

fn default_overlay_budget() -> usize {
    quiz_store::DEFAULT_OVERLAY_BUDGET
}

fn default_queue_path() -> PathBuf {
    PathBuf::from("pending.queue")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            auth_scheme: default_auth_scheme(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            database: default_database_path(),
            overlay_budget_bytes: default_overlay_budget(),
        }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            path: default_queue_path(),
        }
    }
}

impl ServerConfig {
    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Resolve relative data paths against `dir`.
    pub fn with_data_dir(mut self, dir: &Path) -> Self {
        if self.cache.database.is_relative() {
            self.cache.database = dir.join(&self.cache.database);
        }
        if self.queue.path.is_relative() {
            self.queue.path = dir.join(&self.queue.path);
        }
        self
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
}
