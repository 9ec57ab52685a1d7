//! Transport error types.
//!
//! HTTP outcomes are translated into this taxonomy and handed back to the
//! caller untouched. A missing file is not an error: `fetch_file` returns
//! `Ok(None)` for a 404.

use miette::Diagnostic;
use thiserror::Error;

/// Errors surfaced by a [`GitTransport`](super::GitTransport).
#[derive(Error, Diagnostic, Debug)]
pub enum TransportError {
    #[error("GitHub repository is not configured")]
    #[diagnostic(
        code(folio::github::not_configured),
        help("Run `folio setup --owner <owner> --repo <repo> --token <token>` first.")
    )]
    NotConfigured,

    #[error("Version conflict while writing '{path}': the remote file changed")]
    #[diagnostic(code(folio::github::version_conflict))]
    VersionConflict { path: String },

    #[error("GitHub API error ({status}): {message}")]
    #[diagnostic(code(folio::github::status))]
    Status { status: u16, message: String },

    #[error("Network error talking to GitHub")]
    #[diagnostic(
        code(folio::github::network),
        help("Check your connection. Requests that exceed the configured timeout also end up here.")
    )]
    Network {
        #[source]
        source: reqwest::Error,
    },

    #[error("Unexpected response from GitHub: {message}")]
    #[diagnostic(code(folio::github::decode))]
    Decode { message: String },
}

impl TransportError {
    /// HTTP status code carried by the error, if the server answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            TransportError::VersionConflict { .. } => Some(409),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            TransportError::Decode {
                message: e.to_string(),
            }
        } else {
            TransportError::Network { source: e }
        }
    }
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;
