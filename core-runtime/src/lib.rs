//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the link exporter:
//! - Logging and tracing infrastructure
//! - Per-run configuration with validated defaults
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that other crates depend on. It
//! establishes the logging conventions and the configuration value that is
//! built once in `main` and handed to every component at construction.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{
    CandidatePolicy, CollisionPolicy, ExporterConfig, ExporterConfigBuilder, RateLimitPolicy,
};
pub use error::{Error, Result};
