//! Content layer error types.

use miette::Diagnostic;
use thiserror::Error;

use crate::github::TransportError;

/// Errors raised while reading, writing or generating content documents.
#[derive(Error, Diagnostic, Debug)]
pub enum ContentError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Transport(#[from] TransportError),

    #[error("Malformed content in '{path}': {source}")]
    #[diagnostic(
        code(folio::content::malformed),
        help("The file is not valid for this document. Fix it in the repository; it is never replaced with defaults automatically.")
    )]
    MalformedContent {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not save '{path}': the remote file kept changing after {retries} retries")]
    #[diagnostic(
        code(folio::content::publish_conflict),
        help("Someone else is writing to the repository. Pull the latest content, then publish again.")
    )]
    PublishConflict { path: String, retries: u32 },

    #[error("Failed to serialize content: {0}")]
    #[diagnostic(code(folio::content::serialize))]
    Serialize(#[from] serde_json::Error),

    #[error("IO error on '{path}': {source}")]
    #[diagnostic(code(folio::content::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for content operations.
pub type ContentResult<T> = Result<T, ContentError>;
