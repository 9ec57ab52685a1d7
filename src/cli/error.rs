use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

use crate::content::ContentError;
use crate::github::TransportError;
use crate::settings::SettingsError;
use crate::store::StoreError;
use crate::sync::SyncError;

#[derive(Error, Diagnostic, Debug)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Settings(#[from] SettingsError),

    #[error("Repository location is incomplete: missing {missing}")]
    #[diagnostic(
        code(folio::cli::incomplete_location),
        help("Pass --token, --owner and --repo, or set FOLIO_GITHUB_TOKEN, FOLIO_GITHUB_OWNER and FOLIO_GITHUB_REPO.")
    )]
    IncompleteLocation { missing: String },

    #[error("Repository access check failed: {message}")]
    #[diagnostic(
        code(folio::cli::access_denied),
        help("Check that the token has the `repo` scope and the owner/repo names are right.")
    )]
    AccessDenied { message: String },

    #[error("Failed to read or write {}: {source}", path.display())]
    #[diagnostic(code(folio::cli::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid document in {}: {source}", path.display())]
    #[diagnostic(
        code(folio::cli::invalid_input),
        help("The file must hold the document's JSON form, as printed by `folio show`.")
    )]
    InvalidInput {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Content(ContentError::Serialize(e))
    }
}

pub type CliResult<T> = Result<T, CliError>;
