//! GitHub transport - typed access to the REST contents API and the Git
//! Data API (refs, commits, trees).

mod error;
#[cfg(test)]
pub(crate) mod memory;
mod transport;
mod types;

pub use error::{TransportError, TransportResult};
#[cfg(test)]
pub use transport::MockGitTransport;
pub use transport::{
    DEFAULT_API_BASE_URL, DEFAULT_TIMEOUT, GitTransport, HttpTransport, TransportOptions,
};
pub use types::{
    AccessReport, CommitResult, DEFAULT_BRANCH, FileCommit, FileUpdateRequest, RemoteFile,
    RepoPermissions, RepositoryLocation,
};
