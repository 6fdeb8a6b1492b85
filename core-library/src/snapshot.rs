//! Collection snapshot persistence
//!
//! The snapshot is a pretty-printed JSON array (2-space indent, UTF-8,
//! non-ASCII characters written verbatim). Saving goes through a temporary
//! file in the same directory followed by an atomic rename, so a crash while
//! writing leaves the previous snapshot intact.

use crate::error::{LibraryError, Result};
use crate::models::Collection;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};

/// Reads and writes the collection snapshot at a fixed path
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the collection
    ///
    /// # Errors
    ///
    /// - `MissingSnapshot` if the file does not exist
    /// - `InvalidSnapshot` if it is not a JSON array
    /// - `Io` for any other read failure
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> Result<Collection> {
        let bytes = fs::read(&self.path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                LibraryError::MissingSnapshot {
                    path: self.path.clone(),
                }
            } else {
                LibraryError::Io {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;

        let collection: Collection =
            serde_json::from_slice(&bytes).map_err(|source| LibraryError::InvalidSnapshot {
                path: self.path.clone(),
                source,
            })?;

        debug!(records = collection.len(), "Loaded snapshot");
        Ok(collection)
    }

    /// Replace the snapshot with `collection`
    ///
    /// Creates the parent directory if needed. The temporary file is removed
    /// on every error path when it is dropped. On unix an existing snapshot
    /// keeps its permissions and a new one is created `0644`.
    #[instrument(skip(self, collection), fields(path = %self.path.display(), records = collection.len()))]
    pub fn save(&self, collection: &Collection) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|source| self.io_error(source))?;

        let temp = NamedTempFile::new_in(&dir).map_err(|source| self.io_error(source))?;
        {
            let mut writer = BufWriter::new(temp.as_file());
            serde_json::to_writer_pretty(&mut writer, collection)?;
            writer.flush().map_err(|source| self.io_error(source))?;
        }
        temp.as_file()
            .sync_all()
            .map_err(|source| self.io_error(source))?;

        // Temp files are created 0600; keep the mode of the file being replaced
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = match fs::metadata(&self.path) {
                Ok(metadata) => metadata.permissions(),
                Err(_) => fs::Permissions::from_mode(0o644),
            };
            temp.as_file()
                .set_permissions(permissions)
                .map_err(|source| self.io_error(source))?;
        }

        temp.persist(&self.path)
            .map_err(|e| self.io_error(e.error))?;

        info!("Snapshot written");
        Ok(())
    }

    fn io_error(&self, source: io::Error) -> LibraryError {
        LibraryError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CollectionRecord, NewCandidateEntry};
    use serde_json::json;
    use tempfile::TempDir;

    fn sample() -> Collection {
        let mut collection = Collection::new();
        collection.push(CollectionRecord::new(json!({
            "recording": {"id": 7, "title": "Les Misérables"},
        })));
        collection.push(NewCandidateEntry {
            share_link: "https://drive.google.com/drive/folders/zzz".to_string(),
            source_path: "/x/y".to_string(),
            source_folder: "Bootleg {ne}".to_string(),
        });
        collection
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let store = SnapshotStore::new(temp.path().join("collection.json"));

        store.save(&sample()).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_missing_snapshot() {
        let temp = TempDir::new().unwrap();
        let store = SnapshotStore::new(temp.path().join("collection.json"));

        let err = store.load().unwrap_err();
        assert!(matches!(err, LibraryError::MissingSnapshot { .. }));
    }

    #[test]
    fn test_invalid_snapshot() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("collection.json");
        fs::write(&path, "{\"not\": \"an array\"}").unwrap();

        let err = SnapshotStore::new(&path).load().unwrap_err();
        assert!(matches!(err, LibraryError::InvalidSnapshot { .. }));
    }

    #[test]
    fn test_save_creates_output_dir() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("data").join("collection.json");
        let store = SnapshotStore::new(&path);

        store.save(&Collection::new()).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn test_pretty_printed_utf8() {
        let temp = TempDir::new().unwrap();
        let store = SnapshotStore::new(temp.path().join("collection.json"));

        store.save(&sample()).unwrap();
        let text = fs::read_to_string(store.path()).unwrap();

        assert!(text.starts_with("[\n  {\n    \"recording\": {\n      \"id\": 7,"));
        assert!(text.contains("Les Misérables"));
        assert!(!text.contains("\\u00e9"));
    }

    #[test]
    fn test_overwrite_leaves_no_temp_files() {
        let temp = TempDir::new().unwrap();
        let store = SnapshotStore::new(temp.path().join("collection.json"));

        store.save(&sample()).unwrap();
        store.save(&Collection::new()).unwrap();

        let names: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec!["collection.json"]);
        assert!(store.load().unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_new_snapshot_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let store = SnapshotStore::new(temp.path().join("collection.json"));

        store.save(&sample()).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[cfg(unix)]
    #[test]
    fn test_overwrite_keeps_existing_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("collection.json");
        fs::write(&path, "[]").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

        let store = SnapshotStore::new(&path);
        store.save(&sample()).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
        assert_eq!(store.load().unwrap(), sample());
    }
}
