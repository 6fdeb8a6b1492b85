//! # Host Bridge Traits
//!
//! Abstraction traits for the capabilities the exporter core needs from its
//! host: talking HTTP and listing folders on a storage remote.
//!
//! ## Overview
//!
//! This crate defines the contract between the core crates and the concrete
//! adapters in `bridge-desktop`. Core crates depend only on these traits, so
//! they can be exercised in tests with mocks instead of a network or an
//! `rclone` binary.
//!
//! ## Traits
//!
//! - [`HttpClient`](http::HttpClient) - Async HTTP round trips
//! - [`FolderLister`](storage::FolderLister) - Flat listing of a storage remote
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type.
//! Implementations should:
//!
//! - Convert platform-specific errors to `BridgeError`
//! - Provide actionable error messages
//! - Include error context (e.g., command, exit status, URL)
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds so they can be shared behind
//! an `Arc` across async tasks.

pub mod error;
pub mod http;
pub mod storage;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use storage::{FolderEntry, FolderLister};
