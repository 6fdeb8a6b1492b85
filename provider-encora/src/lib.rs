//! # Encora Collection Provider
//!
//! Fetches the full recording collection from the Encora collection API.
//!
//! ## Overview
//!
//! This module provides:
//! - Cursor-style pagination following `next_page_url`
//! - Page-size pinning: every request carries the configured `per_page`
//! - Bounded rate-limit backoff honoring the server's retry header
//! - Best-effort results: a failed page ends pagination but keeps earlier pages

pub mod connector;
pub mod error;
pub mod pagination;
pub mod types;

pub use connector::EncoraConnector;
pub use error::{EncoraError, Result};
pub use types::{AbortReason, FetchCompletion, FetchOutcome};
