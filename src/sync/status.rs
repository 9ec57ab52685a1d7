//! Sync bookkeeping and the per-session state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Persisted bookkeeping. Survives restarts via the working-copy store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRecord {
    #[serde(default)]
    pub pending_changes: bool,
    #[serde(default)]
    pub last_published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_pulled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_commit_url: Option<String>,
}

/// What the UI sees: the persisted record plus whether a repository is set up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub is_configured: bool,
    pub pending_changes: bool,
    pub last_published_at: Option<DateTime<Utc>>,
    pub last_pulled_at: Option<DateTime<Utc>>,
    pub last_commit_url: Option<String>,
}

impl SyncStatus {
    pub fn from_record(record: SyncRecord, is_configured: bool) -> Self {
        Self {
            is_configured,
            pending_changes: record.pending_changes,
            last_published_at: record.last_published_at,
            last_pulled_at: record.last_pulled_at,
            last_commit_url: record.last_commit_url,
        }
    }
}

/// Where the content area is in its sync lifecycle.
///
/// ```text
/// Clean --edit--> Dirty --publish--> Publishing --ok--> Clean
///                                      \--err--> Dirty
/// Clean|Dirty --pull--> Pulling --ok--> Clean
///                         \--err--> (unchanged, or Dirty after a partial write)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    Clean,
    Dirty,
    Publishing,
    Pulling,
}

impl SyncPhase {
    pub fn from_pending(pending_changes: bool) -> Self {
        if pending_changes {
            SyncPhase::Dirty
        } else {
            SyncPhase::Clean
        }
    }
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SyncPhase::Clean => "clean",
            SyncPhase::Dirty => "dirty",
            SyncPhase::Publishing => "publishing",
            SyncPhase::Pulling => "pulling",
        };
        f.write_str(s)
    }
}
