//! Folder name classification
//!
//! Folder names on the remote carry one of two markers:
//! - `{e-<digits>}` ties the folder to an existing recording by identifier
//! - `{ne}` flags a folder with no recording yet
//!
//! Markers are case-sensitive and may appear anywhere in the name. When a name
//! carries both, the identifier marker wins.

use core_library::RecordingId;
use regex::Regex;
use tracing::warn;

use crate::error::Result;

/// Share link prefix for storage folders
pub const SHARE_LINK_BASE: &str = "https://drive.google.com/drive/folders/";

const IDENTIFIER_PATTERN: &str = r"\{e-(\d+)\}";

const NEW_CANDIDATE_MARKER: &str = "{ne}";

/// Classification of a single folder name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderClass {
    /// Carries an identifier marker
    Identified(RecordingId),

    /// Carries the new-candidate marker only
    NewCandidate,

    /// Carries no usable marker
    Unmatched,
}

/// Classifies folder names by their embedded markers
#[derive(Debug, Clone)]
pub struct FolderNameMatcher {
    identifier: Regex,
}

impl FolderNameMatcher {
    pub fn new() -> Result<Self> {
        Ok(Self {
            identifier: Regex::new(IDENTIFIER_PATTERN)?,
        })
    }

    /// Classify `name`
    ///
    /// Only the first identifier marker is considered. An identifier too
    /// large for a `u64` makes the name `Unmatched`.
    pub fn classify(&self, name: &str) -> FolderClass {
        if let Some(captures) = self.identifier.captures(name) {
            let digits = &captures[1];
            return match digits.parse::<u64>() {
                Ok(id) => FolderClass::Identified(RecordingId(id)),
                Err(e) => {
                    warn!(folder = name, digits, error = %e, "Identifier out of range, ignoring folder");
                    FolderClass::Unmatched
                }
            };
        }

        if name.contains(NEW_CANDIDATE_MARKER) {
            FolderClass::NewCandidate
        } else {
            FolderClass::Unmatched
        }
    }
}

/// Share link for a storage folder identifier
pub fn share_link_for(folder_id: &str) -> String {
    format!("{}{}", SHARE_LINK_BASE, folder_id)
}
