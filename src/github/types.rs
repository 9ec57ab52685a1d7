//! Types exchanged with the Git hosting API.
//!
//! The public types are what callers see. The `Wire*` types mirror the JSON
//! bodies GitHub sends and expects and stay private to the transport.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default branch used when none is given.
pub const DEFAULT_BRANCH: &str = "main";

/// Where the content lives and how to authenticate against it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryLocation {
    pub token: String,
    pub owner: String,
    pub repo: String,
    #[serde(default = "default_branch")]
    pub branch: String,
}

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

impl RepositoryLocation {
    pub fn new(
        token: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            owner: owner.into(),
            repo: repo.into(),
            branch: branch.into(),
        }
    }

    /// True iff every field is non-empty.
    pub fn is_complete(&self) -> bool {
        !self.token.is_empty()
            && !self.owner.is_empty()
            && !self.repo.is_empty()
            && !self.branch.is_empty()
    }

    /// `owner/repo` slug used in URLs and log lines.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

impl Default for RepositoryLocation {
    fn default() -> Self {
        Self {
            token: String::new(),
            owner: String::new(),
            repo: String::new(),
            branch: default_branch(),
        }
    }
}

impl fmt::Debug for RepositoryLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = if self.token.is_empty() { "" } else { "***" };
        f.debug_struct("RepositoryLocation")
            .field("token", &token)
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .finish()
    }
}

/// A file as read from the repository.
///
/// `blob_sha` is the optimistic-concurrency token for single-file updates.
/// It goes stale as soon as anyone else writes, so a `RemoteFile` must not
/// outlive the operation that fetched it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub path: String,
    pub content: String,
    pub blob_sha: String,
}

/// One entry of an atomic multi-file commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpdateRequest {
    pub path: String,
    pub content: String,
}

impl FileUpdateRequest {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Outcome of a successful commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitResult {
    pub commit_sha: String,
    pub commit_url: String,
    pub files_updated: usize,
}

/// Outcome of a single-file write: the commit plus the new blob SHA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCommit {
    pub path: String,
    pub blob_sha: String,
    pub commit: CommitResult,
}

/// Result of probing the repository with the configured credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccessReport {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<RepoPermissions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AccessReport {
    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

/// Permissions the token holds on the repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoPermissions {
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub push: bool,
    #[serde(default)]
    pub pull: bool,
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct WireRepository {
    pub name: String,
    pub html_url: String,
    #[serde(default)]
    pub permissions: Option<RepoPermissions>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireContent {
    pub path: String,
    pub sha: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct WirePutContent<'a> {
    pub message: &'a str,
    pub content: String,
    pub branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WirePutContentResponse {
    pub content: WireContentRef,
    pub commit: WireCommit,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireContentRef {
    pub path: String,
    pub sha: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireRef {
    pub object: WireObject,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireObject {
    pub sha: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireCommit {
    pub sha: String,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub tree: Option<WireObject>,
}

/// Create-tree response. Its `tree` entry list is not needed.
#[derive(Debug, Deserialize)]
pub(crate) struct WireTree {
    pub sha: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireTreeEntry<'a> {
    pub path: &'a str,
    pub mode: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub content: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireCreateTree<'a> {
    pub base_tree: &'a str,
    pub tree: Vec<WireTreeEntry<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireCreateCommit<'a> {
    pub message: &'a str,
    pub tree: &'a str,
    pub parents: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireUpdateRef<'a> {
    pub sha: &'a str,
    pub force: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireError {
    #[serde(default)]
    pub message: String,
}
