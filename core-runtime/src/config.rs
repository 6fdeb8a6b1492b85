//! # Exporter Configuration Module
//!
//! Provides the per-run configuration for the link exporter.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct an
//! `ExporterConfig` value. The value is built once (normally in `main`, from
//! CLI flags and environment variables) and passed by reference into every
//! component at construction. Library crates never read the environment.
//!
//! ## Usage
//!
//! ```
//! use core_runtime::config::ExporterConfig;
//!
//! let config = ExporterConfig::builder()
//!     .api_key("secret-token")
//!     .remote("Musicals")
//!     .output_dir("./data")
//!     .build()
//!     .expect("valid config");
//!
//! assert_eq!(config.per_page, 500);
//! assert!(config.snapshot_path().ends_with("collection.json"));
//! ```
//!
//! ## Error Handling
//!
//! The builder validates its inputs and returns `Error::Config` with an
//! actionable message:
//!
//! ```should_panic
//! use core_runtime::config::ExporterConfig;
//!
//! // Panics: no API key was provided
//! let config = ExporterConfig::builder()
//!     .build()
//!     .expect("Should fail - missing API key");
//! ```

use crate::error::{Error, Result};
use crate::logging::redact_if_sensitive;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Collection endpoint used when none is configured
pub const DEFAULT_API_BASE_URL: &str = "https://encora.it/api/collection";

/// Records requested per page
pub const DEFAULT_PER_PAGE: u32 = 500;

/// rclone remote listed when none is configured
pub const DEFAULT_REMOTE: &str = "Musicals";

/// Directory holding the collection snapshot
pub const DEFAULT_OUTPUT_DIR: &str = "./data";

/// rclone configuration file
pub const DEFAULT_RCLONE_CONFIG: &str = "./data/rclone.conf";

/// rclone executable, resolved through `PATH`
pub const DEFAULT_RCLONE_BINARY: &str = "rclone";

/// File name of the snapshot inside the output directory
pub const SNAPSHOT_FILE_NAME: &str = "collection.json";

/// How the fetcher reacts to HTTP 429 responses
///
/// The server-provided delay is honored, clamped to `max_delay`. After
/// `max_retries` consecutive rate-limited attempts on the same page the
/// fetcher gives up on pagination and keeps what it already has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Consecutive 429 responses tolerated for a single page
    pub max_retries: u32,

    /// Delay used when the server sends no usable retry header
    pub default_delay: Duration,

    /// Upper bound for any single wait
    pub max_delay: Duration,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            max_retries: 20,
            default_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(300),
        }
    }
}

impl RateLimitPolicy {
    /// Delay to wait for a given server hint, in whole seconds
    pub fn delay_for(&self, retry_after_secs: Option<u64>) -> Duration {
        retry_after_secs
            .map(Duration::from_secs)
            .unwrap_or(self.default_delay)
            .min(self.max_delay)
    }
}

/// Which folder wins when two folders carry the same recording identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// The folder listed last replaces earlier ones
    #[default]
    LastWins,

    /// The folder listed first is kept
    FirstWins,
}

/// Whether new-candidate folders already present in the collection are appended again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CandidatePolicy {
    /// Skip candidates whose share link already exists on a `recording: null` entry
    #[default]
    SkipExisting,

    /// Append every candidate, even if an identical entry exists
    AppendAlways,
}

/// Configuration for a single export run.
///
/// Use [`ExporterConfigBuilder`] to construct instances.
#[derive(Clone, PartialEq, Eq)]
pub struct ExporterConfig {
    /// Remote collection endpoint (first page)
    pub api_base_url: String,

    /// Bearer credential for the collection API
    pub api_key: String,

    /// Page size requested from the collection API
    pub per_page: u32,

    /// Per-request HTTP timeout
    pub http_timeout: Duration,

    /// Rate-limit backoff behavior
    pub rate_limit: RateLimitPolicy,

    /// rclone remote name, without the trailing colon
    pub remote: String,

    /// rclone configuration file
    pub rclone_config: PathBuf,

    /// rclone executable
    pub rclone_binary: PathBuf,

    /// Directory holding `collection.json`
    pub output_dir: PathBuf,

    /// Identifier collision handling
    pub collision_policy: CollisionPolicy,

    /// New-candidate de-duplication
    pub candidate_policy: CandidatePolicy,
}

impl std::fmt::Debug for ExporterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExporterConfig")
            .field("api_base_url", &self.api_base_url)
            .field("api_key", &redact_if_sensitive("api_key", &self.api_key))
            .field("per_page", &self.per_page)
            .field("http_timeout", &self.http_timeout)
            .field("rate_limit", &self.rate_limit)
            .field("remote", &self.remote)
            .field("rclone_config", &self.rclone_config)
            .field("rclone_binary", &self.rclone_binary)
            .field("output_dir", &self.output_dir)
            .field("collision_policy", &self.collision_policy)
            .field("candidate_policy", &self.candidate_policy)
            .finish()
    }
}

impl ExporterConfig {
    /// Creates a new builder for constructing an `ExporterConfig`.
    pub fn builder() -> ExporterConfigBuilder {
        ExporterConfigBuilder::default()
    }

    /// Location of the persisted collection snapshot
    pub fn snapshot_path(&self) -> PathBuf {
        self.output_dir.join(SNAPSHOT_FILE_NAME)
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - API key is present
    /// - Page size is non-zero
    /// - Base URL is an absolute http(s) URL
    /// - Remote name and output directory are not empty
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::Config(
                "API key is required. Set ENCORA_API_KEY or pass --api-key.".to_string(),
            ));
        }

        if self.per_page == 0 {
            return Err(Error::Config(
                "Page size must be greater than 0".to_string(),
            ));
        }

        let url = Url::parse(&self.api_base_url).map_err(|e| {
            Error::Config(format!(
                "Invalid API base URL '{}': {}",
                self.api_base_url, e
            ))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "API base URL must use http or https, got '{}'",
                url.scheme()
            )));
        }

        if self.remote.trim().is_empty() {
            return Err(Error::Config("Remote name cannot be empty".to_string()));
        }

        if self.output_dir.as_os_str().is_empty() {
            return Err(Error::Config("Output directory cannot be empty".to_string()));
        }

        Ok(())
    }
}

/// Builder for constructing [`ExporterConfig`] instances.
///
/// Every field except the API key has a default; call
/// [`build()`](ExporterConfigBuilder::build) to validate and produce the
/// final config.
#[derive(Debug, Default)]
pub struct ExporterConfigBuilder {
    api_base_url: Option<String>,
    api_key: Option<String>,
    per_page: Option<u32>,
    http_timeout: Option<Duration>,
    rate_limit: Option<RateLimitPolicy>,
    remote: Option<String>,
    rclone_config: Option<PathBuf>,
    rclone_binary: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    collision_policy: CollisionPolicy,
    candidate_policy: CandidatePolicy,
}

impl ExporterConfigBuilder {
    /// Sets the collection endpoint.
    ///
    /// Default: `https://encora.it/api/collection`
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Sets the bearer credential (required).
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the page size.
    ///
    /// Default: 500
    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    /// Sets the per-request HTTP timeout.
    ///
    /// Default: 30 seconds
    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = Some(timeout);
        self
    }

    /// Sets the rate-limit backoff policy.
    pub fn rate_limit(mut self, policy: RateLimitPolicy) -> Self {
        self.rate_limit = Some(policy);
        self
    }

    /// Sets the rclone remote name.
    ///
    /// Default: `Musicals`
    pub fn remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = Some(remote.into());
        self
    }

    /// Sets the rclone configuration file.
    ///
    /// Default: `./data/rclone.conf`
    pub fn rclone_config<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.rclone_config = Some(path.into());
        self
    }

    /// Sets the rclone executable.
    ///
    /// Default: `rclone` from `PATH`
    pub fn rclone_binary<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.rclone_binary = Some(path.into());
        self
    }

    /// Sets the directory holding the snapshot.
    ///
    /// Default: `./data`
    pub fn output_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Sets the identifier collision policy.
    pub fn collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision_policy = policy;
        self
    }

    /// Sets the new-candidate de-duplication policy.
    pub fn candidate_policy(mut self, policy: CandidatePolicy) -> Self {
        self.candidate_policy = policy;
        self
    }

    /// Builds the final [`ExporterConfig`].
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the API key is missing or any value fails
    /// [`ExporterConfig::validate`].
    pub fn build(self) -> Result<ExporterConfig> {
        let config = ExporterConfig {
            api_base_url: self
                .api_base_url
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            api_key: self.api_key.unwrap_or_default(),
            per_page: self.per_page.unwrap_or(DEFAULT_PER_PAGE),
            http_timeout: self.http_timeout.unwrap_or(Duration::from_secs(30)),
            rate_limit: self.rate_limit.unwrap_or_default(),
            remote: self.remote.unwrap_or_else(|| DEFAULT_REMOTE.to_string()),
            rclone_config: self
                .rclone_config
                .unwrap_or_else(|| PathBuf::from(DEFAULT_RCLONE_CONFIG)),
            rclone_binary: self
                .rclone_binary
                .unwrap_or_else(|| PathBuf::from(DEFAULT_RCLONE_BINARY)),
            output_dir: self
                .output_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            collision_policy: self.collision_policy,
            candidate_policy: self.candidate_policy,
        };

        config.validate()?;
        Ok(config)
    }
}
