//! Sync module - moves content between the local working copy and GitHub.
//!
//! Edits land in the working copy first and are marked pending. `publish`
//! commits the whole working copy in one commit; `pull` replaces it with
//! the repository's current content.

mod coordinator;
#[cfg(test)]
mod coordinator_test;
mod error;
mod status;
mod working_copy;

pub use coordinator::{
    DEFAULT_PUBLISH_MESSAGE, Outcome, PublishOutcome, PublishReport, PullOutcome, PullReport,
    SyncCoordinator,
};
pub use error::{FailureKind, SyncError, SyncResult};
pub use status::{SyncPhase, SyncRecord, SyncStatus};
pub use working_copy::{
    ExportBundle, LOCATION_KEY, PROJECTS_KEY, SITE_CONFIG_KEY, SYNC_STATUS_KEY, WorkingCopy,
};
