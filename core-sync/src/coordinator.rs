//! # Link Export Coordinator
//!
//! Runs the export pipeline end to end.
//!
//! ## Workflow
//!
//! ### Full run
//! 1. Fetch every page of the collection API
//! 2. Write the fetched collection to the snapshot, even if pagination stopped early
//! 3. List the storage remote
//! 4. Classify folders and merge links and candidates into the fetched collection
//! 5. Write the merged collection to the snapshot
//!
//! ### Link only
//! 1. Load the existing snapshot (fails if there is none)
//! 2. Steps 3 to 5 of the full run
//!
//! Phases never overlap. A failed listing aborts the run after the fetched
//! snapshot has been written.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_sync::LinkExportCoordinator;
//!
//! let coordinator = LinkExportCoordinator::new(http_client, folder_lister, &config)?;
//! let report = coordinator.run().await?;
//! if report.is_partial() {
//!     eprintln!("collection is incomplete");
//! }
//! ```

use bridge_traits::{FolderLister, HttpClient};
use chrono::{DateTime, Utc};
use core_library::{Collection, SnapshotStore};
use core_runtime::config::ExporterConfig;
use provider_encora::{EncoraConnector, FetchCompletion, FetchOutcome};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::error::Result;
use crate::reconciler::{ReconcileSummary, Reconciler};

/// Fetch phase results without the records themselves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSummary {
    pub records: usize,
    pub pages: u32,
    pub completion: FetchCompletion,
}

impl FetchSummary {
    pub fn is_complete(&self) -> bool {
        self.completion == FetchCompletion::Complete
    }
}

impl From<&FetchOutcome> for FetchSummary {
    fn from(outcome: &FetchOutcome) -> Self {
        Self {
            records: outcome.collection.len(),
            pages: outcome.pages,
            completion: outcome.completion.clone(),
        }
    }
}

/// Outcome of a full run
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub fetch: FetchSummary,
    pub reconcile: ReconcileSummary,
    pub snapshot_path: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ExportReport {
    /// Whether pagination stopped before the last page
    pub fn is_partial(&self) -> bool {
        !self.fetch.is_complete()
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Coordinates fetching, listing, reconciliation and persistence
pub struct LinkExportCoordinator {
    connector: EncoraConnector,
    folder_lister: Arc<dyn FolderLister>,
    reconciler: Reconciler,
    store: SnapshotStore,
}

impl LinkExportCoordinator {
    /// Create a coordinator for one run of `config`
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Pattern` if the folder name matcher cannot be built.
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        folder_lister: Arc<dyn FolderLister>,
        config: &ExporterConfig,
    ) -> Result<Self> {
        Ok(Self {
            connector: EncoraConnector::new(http_client, config),
            folder_lister,
            reconciler: Reconciler::new(config.collision_policy, config.candidate_policy)?,
            store: SnapshotStore::new(config.snapshot_path()),
        })
    }

    pub fn snapshot_path(&self) -> &Path {
        self.store.path()
    }

    /// Fetch, persist, link and persist again
    #[instrument(skip(self), fields(snapshot = %self.store.path().display()))]
    pub async fn run(&self) -> Result<ExportReport> {
        let started_at = Utc::now();

        let outcome = self.fetch_only().await?;
        let fetch = FetchSummary::from(&outcome);

        let mut collection = outcome.collection;
        let reconcile = self.link(&mut collection).await?;

        let report = ExportReport {
            fetch,
            reconcile,
            snapshot_path: self.store.path().to_path_buf(),
            started_at,
            finished_at: Utc::now(),
        };

        if report.is_partial() {
            warn!(
                records = report.fetch.records,
                total_records = report.reconcile.total_records,
                "Export finished with a partial collection"
            );
        } else {
            info!(
                records = report.fetch.records,
                total_records = report.reconcile.total_records,
                elapsed_ms = report.elapsed().num_milliseconds(),
                "Export finished"
            );
        }

        Ok(report)
    }

    /// Fetch the collection and overwrite the snapshot with it
    ///
    /// The snapshot is written even when pagination stopped early.
    #[instrument(skip(self))]
    pub async fn fetch_only(&self) -> Result<FetchOutcome> {
        let outcome = self.connector.fetch_collection().await?;
        self.store.save(&outcome.collection)?;

        info!(
            records = outcome.collection.len(),
            pages = outcome.pages,
            "Fetched collection saved"
        );
        Ok(outcome)
    }

    /// Link the folders of the remote into the existing snapshot
    ///
    /// # Errors
    ///
    /// Fails with `LibraryError::MissingSnapshot` if no snapshot was written yet.
    #[instrument(skip(self))]
    pub async fn link_existing(&self) -> Result<ReconcileSummary> {
        let mut collection = self.store.load()?;
        info!(records = collection.len(), "Loaded snapshot");

        self.link(&mut collection).await
    }

    async fn link(&self, collection: &mut Collection) -> Result<ReconcileSummary> {
        let entries = self.folder_lister.list_folders().await?;
        info!(entries = entries.len(), "Remote listed");

        let plan = self.reconciler.build_link_plan(&entries);
        let summary = self.reconciler.merge(collection, plan);

        self.store.save(collection)?;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provider_encora::AbortReason;

    fn report(completion: FetchCompletion) -> ExportReport {
        let now = Utc::now();
        ExportReport {
            fetch: FetchSummary {
                records: 3,
                pages: 1,
                completion,
            },
            reconcile: ReconcileSummary::default(),
            snapshot_path: PathBuf::from("data/collection.json"),
            started_at: now,
            finished_at: now + chrono::Duration::seconds(2),
        }
    }

    #[test]
    fn test_report_partial() {
        assert!(!report(FetchCompletion::Complete).is_partial());
        assert!(report(FetchCompletion::Aborted(AbortReason::RateLimitExhausted {
            attempts: 21
        }))
        .is_partial());
    }

    #[test]
    fn test_report_elapsed() {
        assert_eq!(report(FetchCompletion::Complete).elapsed().num_seconds(), 2);
    }
}
