//! # Collection Library Module
//!
//! Owns the recording collection data model and its on-disk snapshot.
//!
//! ## Overview
//!
//! This module manages:
//! - The opaque `CollectionRecord` wrapper around API records
//! - `NewCandidateEntry` records for folders without a known recording
//! - The ordered `Collection` that is persisted as one unit
//! - `SnapshotStore`, which reads and atomically rewrites `collection.json`

pub mod error;
pub mod models;
pub mod snapshot;

pub use error::{LibraryError, Result};
pub use models::{Collection, CollectionRecord, NewCandidateEntry, RecordingId};
pub use snapshot::SnapshotStore;
