//! Merge folder share links into the collection
//!
//! Reconciliation runs in two steps:
//! 1. [`Reconciler::build_link_plan`] classifies every directory of the folder
//!    listing and produces a [`LinkPlan`]: an identifier to share-link map plus
//!    the new-candidate entries, in listing order.
//! 2. [`Reconciler::merge`] attaches links to records whose `recording.id` is
//!    in the map and appends the candidates at the end of the collection.
//!
//! Existing records are never removed or reordered. Only their `share_link`
//! field is written.

use bridge_traits::storage::FolderEntry;
use core_library::{Collection, NewCandidateEntry, RecordingId};
use core_runtime::config::{CandidatePolicy, CollisionPolicy};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

use crate::error::Result;
use crate::matcher::{share_link_for, FolderClass, FolderNameMatcher};

/// Share link per recording identifier
pub type LinkMap = HashMap<RecordingId, String>;

/// Links and candidates derived from one folder listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkPlan {
    pub links: LinkMap,

    /// New-candidate entries in listing order
    pub candidates: Vec<NewCandidateEntry>,

    /// Identified folders whose identifier was already taken
    pub collisions: usize,
}

/// Counts reported after a merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Distinct identifiers with a share link
    pub matched_links: usize,

    /// Candidate folders found in the listing
    pub new_candidates: usize,

    /// Candidates appended to the collection
    pub appended: usize,

    /// Candidates skipped because the collection already had them
    pub skipped_candidates: usize,

    /// Records that received a share link
    pub updated_records: usize,

    /// Identified folders whose identifier was already taken
    pub collisions: usize,

    /// Collection size after the merge
    pub total_records: usize,
}

/// Builds link plans and merges them into collections
#[derive(Debug, Clone)]
pub struct Reconciler {
    matcher: FolderNameMatcher,
    collision_policy: CollisionPolicy,
    candidate_policy: CandidatePolicy,
}

impl Reconciler {
    pub fn new(collision_policy: CollisionPolicy, candidate_policy: CandidatePolicy) -> Result<Self> {
        Ok(Self {
            matcher: FolderNameMatcher::new()?,
            collision_policy,
            candidate_policy,
        })
    }

    /// Classify directory entries into links and candidates
    ///
    /// Non-directory entries, directories without a storage ID and unmatched
    /// names are ignored.
    #[instrument(skip_all, fields(entries = entries.len()))]
    pub fn build_link_plan(&self, entries: &[FolderEntry]) -> LinkPlan {
        let mut plan = LinkPlan::default();

        for entry in entries.iter().filter(|entry| entry.is_directory) {
            if entry.id.is_empty() {
                warn!(folder = %entry.path, "Directory has no storage ID, skipping");
                continue;
            }

            match self.matcher.classify(&entry.name) {
                FolderClass::Identified(id) => {
                    let link = share_link_for(&entry.id);
                    match plan.links.entry(id) {
                        Entry::Vacant(slot) => {
                            slot.insert(link);
                        }
                        Entry::Occupied(mut slot) => {
                            plan.collisions += 1;
                            debug!(
                                recording_id = %id,
                                kept = ?self.collision_policy,
                                existing = %slot.get(),
                                incoming = %link,
                                "Identifier collision"
                            );
                            if self.collision_policy == CollisionPolicy::LastWins {
                                slot.insert(link);
                            }
                        }
                    }
                }
                FolderClass::NewCandidate => plan.candidates.push(NewCandidateEntry {
                    share_link: share_link_for(&entry.id),
                    source_path: entry.path.clone(),
                    source_folder: entry.name.clone(),
                }),
                FolderClass::Unmatched => {}
            }
        }

        info!(
            matched_links = plan.links.len(),
            new_candidates = plan.candidates.len(),
            collisions = plan.collisions,
            "Folder listing classified"
        );
        plan
    }

    /// Apply `plan` to `collection`
    #[instrument(skip_all, fields(records = collection.len()))]
    pub fn merge(&self, collection: &mut Collection, plan: LinkPlan) -> ReconcileSummary {
        let mut summary = ReconcileSummary {
            matched_links: plan.links.len(),
            new_candidates: plan.candidates.len(),
            collisions: plan.collisions,
            ..ReconcileSummary::default()
        };

        for record in collection.iter_mut() {
            let Some(link) = record.recording_id().and_then(|id| plan.links.get(&id)) else {
                continue;
            };
            if record.set_share_link(link.as_str()) {
                summary.updated_records += 1;
            }
        }

        let existing = match self.candidate_policy {
            CandidatePolicy::SkipExisting => collection.candidate_links(),
            CandidatePolicy::AppendAlways => Default::default(),
        };

        for candidate in plan.candidates {
            if existing.contains(&candidate.share_link) {
                debug!(share_link = %candidate.share_link, "Candidate already present, skipping");
                summary.skipped_candidates += 1;
                continue;
            }
            collection.push(candidate);
            summary.appended += 1;
        }

        summary.total_records = collection.len();

        info!(
            updated_records = summary.updated_records,
            appended = summary.appended,
            skipped_candidates = summary.skipped_candidates,
            total_records = summary.total_records,
            "Collection reconciled"
        );
        summary
    }
}
