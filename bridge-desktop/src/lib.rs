//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop and server hosts
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest`
//! - `FolderLister` by shelling out to `rclone lsjson`
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{RcloneFolderLister, ReqwestHttpClient};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let http_client = ReqwestHttpClient::with_timeout(Duration::from_secs(30))?;
//!     let lister = RcloneFolderLister::new("rclone", "./data/rclone.conf", "Musicals");
//!
//!     // Hand both to the link export coordinator
//! }
//! ```

mod http;
mod lister;

pub use http::ReqwestHttpClient;
pub use lister::RcloneFolderLister;
