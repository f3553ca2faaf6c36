// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the comment intake service.
//!
//! Values are read from an optional TOML file, then overridden by
//! environment variables. Every field has a default so an empty file (or no
//! file at all) yields a working service.

use crate::handlers::BUILTIN_ROUTES;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming the TOML config file.
pub const CONFIG_PATH_ENV: &str = "COMMENT_INTAKE_CONFIG";

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration for the comment intake service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Submission validation limits
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Spam heuristic thresholds
    #[serde(default)]
    pub spam: SpamConfig,

    /// Comment storage backend
    #[serde(default)]
    pub storage: StorageConfig,

    /// Post content location
    #[serde(default)]
    pub content: ContentConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Fixed-window rate limiting for comment submissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum submissions per window per client (default: 5)
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Window length in milliseconds (default: 60000)
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    /// Interval between expired-entry sweeps in seconds (default: 60)
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
}

/// Field limits applied to submissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Maximum author name length in characters (default: 100)
    #[serde(default = "default_max_name_len")]
    pub max_name_len: usize,

    /// Maximum comment body length in characters (default: 1000)
    #[serde(default = "default_max_comment_len")]
    pub max_comment_len: usize,
}

/// Thresholds for the text heuristics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpamConfig {
    /// Uppercase ratio above which a body is rejected (default: 0.5)
    #[serde(default = "default_max_uppercase_ratio")]
    pub max_uppercase_ratio: f64,

    /// Bodies at or below this length skip the caps check (default: 20)
    #[serde(default = "default_caps_min_length")]
    pub caps_min_length: usize,

    /// Longest allowed run of one character (default: 10)
    #[serde(default = "default_max_char_run")]
    pub max_char_run: usize,
}

/// Comment store selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// `memory`, `surreal:memory`, or a RocksDB directory (default: memory)
    #[serde(default = "default_storage_path")]
    pub path: String,
}

/// Location of the post files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Directory holding `.mdx`/`.md` posts (default: content)
    #[serde(default = "default_content_dir")]
    pub posts_dir: PathBuf,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_max_requests() -> u32 {
    5
}

fn default_window_ms() -> u64 {
    60_000
}

fn default_cleanup_interval_secs() -> u64 {
    60
}

fn default_max_name_len() -> usize {
    100
}

fn default_max_comment_len() -> usize {
    1000
}

fn default_max_uppercase_ratio() -> f64 {
    0.5
}

fn default_caps_min_length() -> usize {
    20
}

fn default_max_char_run() -> usize {
    10
}

fn default_storage_path() -> String {
    "memory".to_string()
}

fn default_content_dir() -> PathBuf {
    PathBuf::from("content")
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            rate_limit: RateLimitConfig::default(),
            validation: ValidationConfig::default(),
            spam: SpamConfig::default(),
            storage: StorageConfig::default(),
            content: ContentConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_ms: default_window_ms(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_name_len: default_max_name_len(),
            max_comment_len: default_max_comment_len(),
        }
    }
}

impl Default for SpamConfig {
    fn default() -> Self {
        Self {
            max_uppercase_ratio: default_max_uppercase_ratio(),
            caps_min_length: default_caps_min_length(),
            max_char_run: default_max_char_run(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            posts_dir: default_content_dir(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl RateLimitConfig {
    /// Get the rate window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    /// Get the sweep interval
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

impl Config {
    /// Parse a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file from disk.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Load the file named by [`CONFIG_PATH_ENV`] (if set) and apply
    /// environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Override fields from a key lookup (the process environment in
    /// production). Unparseable numbers are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(max) = lookup("RATE_LIMIT_MAX").and_then(|v| v.parse().ok()) {
            self.rate_limit.max_requests = max;
        }
        if let Some(window) = lookup("RATE_LIMIT_WINDOW_MS").and_then(|v| v.parse().ok()) {
            self.rate_limit.window_ms = window;
        }
        if let Some(path) = lookup("STORAGE_PATH") {
            self.storage.path = path;
        }
        if let Some(dir) = lookup("CONTENT_DIR") {
            self.content.posts_dir = PathBuf::from(dir);
        }
    }

    /// Reject settings that would disable or break the pipeline.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rate_limit.max_requests == 0 {
            return Err(ConfigError::Invalid(
                "rate_limit.max_requests must be at least 1".to_string(),
            ));
        }
        if self.rate_limit.window_ms == 0 {
            return Err(ConfigError::Invalid(
                "rate_limit.window_ms must be positive".to_string(),
            ));
        }
        if self.rate_limit.cleanup_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "rate_limit.cleanup_interval_secs must be positive".to_string(),
            ));
        }
        if self.validation.max_name_len == 0 || self.validation.max_comment_len == 0 {
            return Err(ConfigError::Invalid(
                "validation length limits must be positive".to_string(),
            ));
        }
        let ratio = self.spam.max_uppercase_ratio;
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "spam.max_uppercase_ratio must be in (0, 1], got {ratio}"
            )));
        }

        let path = self.metrics.path.as_str();
        if !path.starts_with('/') || path.contains(['{', '}', '*']) {
            return Err(ConfigError::Invalid(format!(
                "metrics.path must be a literal path starting with '/', got {path:?}"
            )));
        }
        if BUILTIN_ROUTES.contains(&path) {
            return Err(ConfigError::Invalid(format!(
                "metrics.path {path} collides with a built-in route"
            )));
        }
        Ok(())
    }
}
