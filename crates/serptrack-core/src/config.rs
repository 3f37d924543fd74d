//! Configuration management for serptrack.
//!
//! Provides TOML-based configuration with a working-directory file, an
//! XDG-compliant fallback path and environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name looked up in the working directory before the XDG path.
pub const LOCAL_CONFIG_FILE: &str = "serptrack.toml";

/// Main application configuration.
///
/// Every field has a default, so an absent or partial file is fine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Search engine query and pagination settings
    pub search: SearchConfig,
    /// HTTP client settings
    pub http: HttpConfig,
    /// Input/output files and worker pool settings
    pub run: RunConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// `./serptrack.toml` wins over `~/.config/serptrack/config.toml`.
    ///
    /// # Errors
    /// Returns error if a file exists but cannot be read or is not valid TOML.
    pub fn load() -> ConfigResult<Self> {
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            return Self::load_from(&local);
        }

        match Self::config_path() {
            Ok(path) if path.exists() => Self::load_from(&path),
            Ok(_) | Err(ConfigError::NoConfigDir) => {
                tracing::debug!("Config file not found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Load configuration from a specific TOML file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        tracing::debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides, then validate.
    ///
    /// Supports the following environment variables:
    /// - `SERPTRACK_MAX_PAGES`: Override pages fetched per keyword
    /// - `SERPTRACK_MAX_WORKERS`: Override worker pool size
    /// - `SERPTRACK_OUTPUT_DIR`: Override CSV output directory
    /// - `SERPTRACK_TIMEOUT_SECS`: Override per-request timeout
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup. Unparseable values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(pages) = lookup("SERPTRACK_MAX_PAGES").and_then(|v| v.parse().ok()) {
            self.search.max_pages = pages;
            tracing::debug!("Override search.max_pages from env: {}", pages);
        }

        if let Some(workers) = lookup("SERPTRACK_MAX_WORKERS").and_then(|v| v.parse().ok()) {
            self.run.max_workers = workers;
            tracing::debug!("Override run.max_workers from env: {}", workers);
        }

        if let Some(dir) = lookup("SERPTRACK_OUTPUT_DIR") {
            tracing::debug!("Override run.output_dir from env: {}", dir);
            self.run.output_dir = PathBuf::from(dir);
        }

        if let Some(secs) = lookup("SERPTRACK_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.http.timeout_secs = secs;
            tracing::debug!("Override http.timeout_secs from env: {}", secs);
        }
    }

    /// Check value ranges that would make the pipeline misbehave.
    pub fn validate(&self) -> ConfigResult<()> {
        fn invalid(field: &str, reason: &str) -> ConfigError {
            ConfigError::InvalidValue {
                field: field.to_string(),
                reason: reason.to_string(),
            }
        }

        if self.search.max_pages == 0 {
            return Err(invalid("search.max_pages", "must be at least 1"));
        }
        if self.search.results_per_page == 0 {
            return Err(invalid("search.results_per_page", "must be at least 1"));
        }
        if self.search.delay_min_ms > self.search.delay_max_ms {
            return Err(invalid(
                "search.delay_min_ms",
                "must not exceed search.delay_max_ms",
            ));
        }
        if url::Url::parse(&self.search.endpoint).is_err() {
            return Err(invalid("search.endpoint", "must be an absolute URL"));
        }
        if self.http.timeout_secs == 0 {
            return Err(invalid("http.timeout_secs", "must be at least 1"));
        }
        let factor = self.http.retry.backoff_factor;
        if !factor.is_finite() || factor < 0.0 {
            return Err(invalid(
                "http.retry.backoff_factor",
                "must be a finite, non-negative number",
            ));
        }
        if self.run.max_workers == 0 {
            return Err(invalid("run.max_workers", "must be at least 1"));
        }
        Ok(())
    }

    /// Get the path to the user configuration file.
    ///
    /// Uses XDG base directories: `~/.config/serptrack/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("com", "serptrack", "serptrack").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Search engine query and pagination settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Query endpoint; `q` and `first` are appended as query parameters
    pub endpoint: String,
    /// Maximum result pages fetched per keyword
    pub max_pages: u32,
    /// Offset stride for the `first` parameter
    pub results_per_page: u32,
    /// Lower bound of the randomized delay between pages, in milliseconds
    pub delay_min_ms: u64,
    /// Upper bound of the randomized delay between pages, in milliseconds
    pub delay_max_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://www.bing.com/search".to_string(),
            max_pages: 50,
            results_per_page: 10,
            delay_min_ms: 1000,
            delay_max_ms: 3000,
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// User agent string sent with every request
    pub user_agent: String,
    /// Automatic retry policy
    pub retry: RetryConfig,
}

impl HttpConfig {
    /// Per-request timeout as a `Duration`.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            retry: RetryConfig::default(),
        }
    }
}

/// Automatic retry policy for transient HTTP failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total retries allowed across connection errors and retryable statuses
    pub total: u32,
    /// Exponential backoff factor in seconds
    pub backoff_factor: f64,
    /// Upper bound on a single backoff sleep, in seconds
    pub backoff_max_secs: u64,
    /// Response statuses that trigger a retry
    pub status_forcelist: Vec<u16>,
    /// Methods eligible for status-based retries
    pub allowed_methods: Vec<String>,
    /// Honour `Retry-After` on 429/503 responses
    pub respect_retry_after: bool,
}

impl RetryConfig {
    /// Whether a response status should be retried for `method`.
    #[must_use]
    pub fn is_retryable(&self, method: &str, status: u16) -> bool {
        self.status_forcelist.contains(&status)
            && self
                .allowed_methods
                .iter()
                .any(|m| m.eq_ignore_ascii_case(method))
    }

    /// Sleep before the `retry`-th retry (1-based).
    ///
    /// The first retry is immediate; later ones wait
    /// `backoff_factor * 2^(retry - 1)` seconds, capped at `backoff_max_secs`.
    #[must_use]
    pub fn backoff(&self, retry: u32) -> Duration {
        if retry <= 1 {
            return Duration::ZERO;
        }
        let exponent = i32::try_from(retry - 1).unwrap_or(i32::MAX);
        let secs = self.backoff_factor * 2f64.powi(exponent);
        #[allow(clippy::cast_precision_loss)]
        let capped = secs.min(self.backoff_max_secs as f64).max(0.0);
        Duration::try_from_secs_f64(capped).unwrap_or(Duration::MAX)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            total: 5,
            backoff_factor: 0.5,
            backoff_max_secs: 120,
            status_forcelist: vec![429, 500, 502, 503, 504],
            allowed_methods: vec!["HEAD".to_string(), "GET".to_string(), "OPTIONS".to_string()],
            respect_retry_after: true,
        }
    }
}

/// Input/output files and worker pool settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Keyword list, one per line
    pub keywords_file: PathBuf,
    /// Whitelisted domains, one per line
    pub whitelist_file: PathBuf,
    /// Directory receiving one CSV per keyword
    pub output_dir: PathBuf,
    /// Upper bound on concurrently processed keywords
    pub max_workers: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            keywords_file: PathBuf::from("keywords.txt"),
            whitelist_file: PathBuf::from("whitelist.txt"),
            output_dir: PathBuf::from("."),
            max_workers: 10,
        }
    }
}
