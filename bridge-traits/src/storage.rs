//! Remote Storage Abstractions
//!
//! Provides the folder-listing contract used to discover share-link targets
//! on a cloud storage remote.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A single object reported by a remote storage listing
///
/// Field names follow the JSON emitted by `rclone lsjson`. Extra fields such
/// as `Size` or `ModTime` are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderEntry {
    /// Whether the object is a directory
    #[serde(rename = "IsDir", default)]
    pub is_directory: bool,

    /// Leaf name of the object
    #[serde(rename = "Name")]
    pub name: String,

    /// Storage-system identifier (for Google Drive, the folder ID)
    ///
    /// rclone omits `ID` when the backend has none, so it defaults to empty.
    #[serde(rename = "ID", default)]
    pub id: String,

    /// Path relative to the remote root
    #[serde(rename = "Path")]
    pub path: String,
}

impl FolderEntry {
    /// Build a directory entry
    pub fn directory(
        name: impl Into<String>,
        id: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            is_directory: true,
            name: name.into(),
            id: id.into(),
            path: path.into(),
        }
    }
}

/// Remote folder listing trait
///
/// Produces a flat, ordered listing of every object on a remote. The order
/// is significant to callers: later entries win identifier collisions.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::FolderLister;
///
/// async fn count_dirs(lister: &dyn FolderLister) -> Result<usize> {
///     let entries = lister.list_folders().await?;
///     Ok(entries.iter().filter(|e| e.is_directory).count())
/// }
/// ```
#[async_trait]
pub trait FolderLister: Send + Sync {
    /// List every entry on the remote
    ///
    /// # Errors
    ///
    /// Returns error if the listing cannot be produced or parsed. A failed
    /// listing is never reported as an empty one.
    async fn list_folders(&self) -> Result<Vec<FolderEntry>>;
}
