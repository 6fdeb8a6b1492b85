use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use core_runtime::config::{
    CandidatePolicy, CollisionPolicy, ExporterConfig, RateLimitPolicy, DEFAULT_API_BASE_URL,
    DEFAULT_OUTPUT_DIR, DEFAULT_PER_PAGE, DEFAULT_RCLONE_BINARY, DEFAULT_RCLONE_CONFIG,
    DEFAULT_REMOTE,
};
use core_runtime::logging::{LogFormat, LogLevel, LoggingConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "link-exporter", version)]
#[command(
    about = "Attach storage folder share links to the recordings of a remote collection",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Bearer token for the collection API
    #[arg(long, env = "ENCORA_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Collection endpoint
    #[arg(long, env = "ENCORA_API_URL", default_value = DEFAULT_API_BASE_URL, global = true)]
    pub api_url: String,

    /// Records requested per page
    #[arg(long, default_value_t = DEFAULT_PER_PAGE, global = true)]
    pub per_page: u32,

    /// rclone remote holding the recording folders
    #[arg(long, env = "RCLONE_REMOTE", default_value = DEFAULT_REMOTE, global = true)]
    pub remote: String,

    /// rclone configuration file
    #[arg(long, env = "RCLONE_CONFIG", default_value = DEFAULT_RCLONE_CONFIG, global = true)]
    pub rclone_config: PathBuf,

    /// rclone executable
    #[arg(long = "rclone-bin", env = "RCLONE_BIN", default_value = DEFAULT_RCLONE_BINARY, global = true)]
    pub rclone_binary: PathBuf,

    /// Directory receiving collection.json
    #[arg(long, env = "OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR, global = true)]
    pub output_dir: PathBuf,

    /// Consecutive 429 responses tolerated per page
    #[arg(long, global = true)]
    pub max_rate_limit_retries: Option<u32>,

    /// Keep the first folder listed for a duplicated identifier
    #[arg(long, global = true)]
    pub keep_first_link: bool,

    /// Append new-candidate folders even if the snapshot already has them
    #[arg(long, global = true)]
    pub append_duplicate_candidates: bool,

    /// Exit with an error when pagination stopped early
    #[arg(long, global = true)]
    pub fail_on_partial: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormatArg::Compact, global = true)]
    pub log_format: LogFormatArg,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Raw tracing filter, overrides --verbose
    #[arg(long, env = "RUST_LOG", global = true)]
    pub log_filter: Option<String>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Command {
    /// Fetch the collection, then link folders into it (default)
    #[default]
    Run,

    /// Fetch the collection and write the snapshot only
    Fetch,

    /// Link folders into the existing snapshot without fetching
    Link,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormatArg {
    Pretty,
    Json,
    Compact,
}

impl Cli {
    pub fn subcommand(&self) -> Command {
        self.command.unwrap_or_default()
    }

    pub fn logging_config(&self) -> LoggingConfig {
        let format = match self.log_format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Json => LogFormat::Json,
            LogFormatArg::Compact => LogFormat::Compact,
        };
        let level = match self.verbose {
            0 => LogLevel::Info,
            1 => LogLevel::Debug,
            _ => LogLevel::Trace,
        };

        let config = LoggingConfig::default().with_format(format).with_level(level);
        match &self.log_filter {
            Some(filter) if !filter.trim().is_empty() => config.with_filter(filter.clone()),
            _ => config,
        }
    }

    pub fn exporter_config(&self) -> core_runtime::Result<ExporterConfig> {
        let mut rate_limit = RateLimitPolicy::default();
        if let Some(max_retries) = self.max_rate_limit_retries {
            rate_limit.max_retries = max_retries;
        }

        let mut builder = ExporterConfig::builder()
            .api_base_url(&self.api_url)
            .per_page(self.per_page)
            .remote(&self.remote)
            .rclone_config(&self.rclone_config)
            .rclone_binary(&self.rclone_binary)
            .output_dir(&self.output_dir)
            .rate_limit(rate_limit);

        if let Some(key) = &self.api_key {
            builder = builder.api_key(key);
        }
        if self.keep_first_link {
            builder = builder.collision_policy(CollisionPolicy::FirstWins);
        }
        if self.append_duplicate_candidates {
            builder = builder.candidate_policy(CandidatePolicy::AppendAlways);
        }

        builder.build()
    }
}
