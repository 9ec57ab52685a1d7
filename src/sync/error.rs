//! Sync error types and their classification for the UI layer.

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

use crate::content::ContentError;
use crate::github::TransportError;
use crate::store::StoreError;

/// Errors that can occur during pull, publish or working-copy access.
#[derive(Error, Diagnostic, Debug)]
pub enum SyncError {
    #[error("GitHub integration is not configured")]
    #[diagnostic(
        code(folio::sync::not_configured),
        help("Run `folio setup` with a token, owner and repository.")
    )]
    NotConfigured,

    #[error(transparent)]
    #[diagnostic(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error("Working copy entry '{key}' is not valid: {source}")]
    #[diagnostic(
        code(folio::sync::malformed_working_copy),
        help("Fix the entry with `folio edit`, or discard local edits with `folio reset`.")
    )]
    MalformedWorkingCopy {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Coarse failure category, enough for the UI to pick an actionable message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Credentials or repository missing: prompt for setup.
    NotConfigured,
    /// Remote changed underneath us: pull first, then retry.
    Conflict,
    /// Host unreachable or timed out.
    Network,
    /// The API answered with an error status or an unexpected body.
    Remote,
    /// A document failed to parse.
    MalformedContent,
    /// Local persistence failed.
    Local,
}

impl SyncError {
    pub fn kind(&self) -> FailureKind {
        match self {
            SyncError::NotConfigured => FailureKind::NotConfigured,
            SyncError::Content(ContentError::Transport(transport)) => match transport {
                TransportError::NotConfigured => FailureKind::NotConfigured,
                TransportError::VersionConflict { .. } => FailureKind::Conflict,
                TransportError::Network { .. } => FailureKind::Network,
                TransportError::Status { .. } | TransportError::Decode { .. } => {
                    FailureKind::Remote
                }
            },
            SyncError::Content(ContentError::PublishConflict { .. }) => FailureKind::Conflict,
            SyncError::Content(ContentError::MalformedContent { .. })
            | SyncError::MalformedWorkingCopy { .. } => FailureKind::MalformedContent,
            SyncError::Content(ContentError::Serialize(_) | ContentError::Io { .. })
            | SyncError::Store(_) => FailureKind::Local,
        }
    }
}

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;
