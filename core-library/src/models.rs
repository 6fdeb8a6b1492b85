//! Domain models for the recording collection
//!
//! Records fetched from the collection API are kept as opaque JSON so that
//! every field the API returns survives a round trip through the snapshot.
//! Only the two fields the exporter cares about are interpreted:
//! `recording.id` (read) and `share_link` (written).

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::fmt;

/// Field holding the folder share link
pub const SHARE_LINK_FIELD: &str = "share_link";

// =============================================================================
// ID Types
// =============================================================================

/// Identifier of a recording in the remote collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordingId(pub u64);

impl fmt::Display for RecordingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Records
// =============================================================================

/// One element of the collection
///
/// Either a record returned by the collection API (possibly augmented with a
/// `share_link`) or an appended [`NewCandidateEntry`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionRecord(Value);

impl CollectionRecord {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The nested `recording.id`, if present and a non-negative integer
    ///
    /// A missing or `null` `recording`, a missing `id`, or an `id` of any
    /// other JSON type all yield `None`.
    pub fn recording_id(&self) -> Option<RecordingId> {
        self.0
            .get("recording")
            .and_then(|recording| recording.get("id"))
            .and_then(Value::as_u64)
            .map(RecordingId)
    }

    /// Current share link, if one was attached
    pub fn share_link(&self) -> Option<&str> {
        self.0.get(SHARE_LINK_FIELD).and_then(Value::as_str)
    }

    /// Set or overwrite the share link
    ///
    /// Returns `false` (and leaves the record untouched) when the record is
    /// not a JSON object.
    pub fn set_share_link(&mut self, link: impl Into<String>) -> bool {
        match self.0.as_object_mut() {
            Some(object) => {
                object.insert(SHARE_LINK_FIELD.to_string(), Value::String(link.into()));
                true
            }
            None => false,
        }
    }

    /// Whether this record was appended for a folder with no known recording
    pub fn is_new_candidate(&self) -> bool {
        matches!(self.0.get("recording"), Some(Value::Null)) && self.share_link().is_some()
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for CollectionRecord {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// A folder marked as new that has no recording in the collection yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCandidateEntry {
    pub share_link: String,
    pub source_path: String,
    pub source_folder: String,
}

impl From<NewCandidateEntry> for CollectionRecord {
    fn from(entry: NewCandidateEntry) -> Self {
        Self(json!({
            "recording": null,
            "share_link": entry.share_link,
            "source_path": entry.source_path,
            "source_folder": entry.source_folder,
        }))
    }
}

// =============================================================================
// Collection
// =============================================================================

/// Ordered sequence of records persisted as a single JSON array
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection {
    records: Vec<CollectionRecord>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<CollectionRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[CollectionRecord] {
        &self.records
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, CollectionRecord> {
        self.records.iter_mut()
    }

    pub fn push(&mut self, record: impl Into<CollectionRecord>) {
        self.records.push(record.into());
    }

    /// Share links already carried by appended new-candidate entries
    pub fn candidate_links(&self) -> HashSet<String> {
        self.records
            .iter()
            .filter(|record| record.is_new_candidate())
            .filter_map(|record| record.share_link().map(str::to_string))
            .collect()
    }
}

impl Extend<CollectionRecord> for Collection {
    fn extend<T: IntoIterator<Item = CollectionRecord>>(&mut self, iter: T) {
        self.records.extend(iter);
    }
}
