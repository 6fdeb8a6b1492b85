//! # Link Export Pipeline
//!
//! Attaches storage folder share links to the records of the remote
//! collection.
//!
//! ## Components
//!
//! - **Matcher** (`matcher`): Classifies folder names by their `{e-<id>}` or `{ne}` marker
//! - **Reconciler** (`reconciler`): Builds the link plan and merges it into a collection
//! - **Coordinator** (`coordinator`): Runs fetch, listing, merge and persistence in order

pub mod coordinator;
pub mod error;
pub mod matcher;
pub mod reconciler;

pub use coordinator::{ExportReport, FetchSummary, LinkExportCoordinator};
pub use error::{Result, SyncError};
pub use matcher::{share_link_for, FolderClass, FolderNameMatcher, SHARE_LINK_BASE};
pub use reconciler::{LinkMap, LinkPlan, ReconcileSummary, Reconciler};
