//! Typed client for the GitHub REST and Git Data APIs.
//!
//! This layer is a pure protocol client: it knows nothing about projects or
//! site configuration, never retries, and translates every HTTP outcome into
//! [`TransportError`]. The trait is the seam the content layer is tested
//! against.

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

#[cfg(test)]
use mockall::automock;

use super::error::{TransportError, TransportResult};
use super::types::{
    AccessReport, CommitResult, FileCommit, FileUpdateRequest, RemoteFile, RepositoryLocation,
    WireCommit, WireContent, WireCreateCommit, WireCreateTree, WireError, WirePutContent,
    WirePutContentResponse, WireRef, WireRepository, WireTree, WireTreeEntry, WireUpdateRef,
};

/// Public GitHub API endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const BLOB_MODE: &str = "100644";

/// Operations against a hosted Git repository. Can be mocked in tests.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GitTransport: Send + Sync {
    /// True iff token, owner, repository and branch are all set.
    fn is_configured(&self) -> bool;

    /// Read a file and its blob SHA. `Ok(None)` means the file does not exist.
    async fn fetch_file(&self, path: &str) -> TransportResult<Option<RemoteFile>>;

    /// Create (`expected_sha == None`) or update a single file.
    ///
    /// Fails with [`TransportError::VersionConflict`] when `expected_sha` no
    /// longer matches the remote file.
    async fn put_file(
        &self,
        path: &str,
        content: &str,
        message: &str,
        expected_sha: Option<String>,
    ) -> TransportResult<FileCommit>;

    /// Commit all `updates` in one commit on top of the branch head.
    ///
    /// Either every file lands or none does: the branch ref update is the
    /// only externally visible step.
    async fn put_files(
        &self,
        updates: &[FileUpdateRequest],
        message: &str,
    ) -> TransportResult<CommitResult>;

    /// Check access to the repository with the configured credentials. No side effects.
    async fn validate_access(&self) -> AccessReport;
}

/// HTTP settings for [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct TransportOptions {
    pub api_base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("folio/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// reqwest-backed [`GitTransport`].
pub struct HttpTransport {
    location: RepositoryLocation,
    options: TransportOptions,
    client: Client,
}

impl HttpTransport {
    /// Build a transport for `location`. No network traffic happens here.
    pub fn new(location: RepositoryLocation, options: TransportOptions) -> TransportResult<Self> {
        // reqwest is built without a bundled crypto provider.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let client = Client::builder()
            .user_agent(options.user_agent.clone())
            .timeout(options.timeout)
            .build()?;

        Ok(Self {
            location,
            options,
            client,
        })
    }

    /// Replace the repository location. Last call wins.
    pub fn configure(&mut self, location: RepositoryLocation) {
        self.location = location;
    }

    pub fn location(&self) -> &RepositoryLocation {
        &self.location
    }

    fn ensure_configured(&self) -> TransportResult<()> {
        if self.location.is_complete() {
            Ok(())
        } else {
            Err(TransportError::NotConfigured)
        }
    }

    fn repo_url(&self, suffix: &str) -> String {
        format!(
            "{}/repos/{}/{}{}",
            self.options.api_base_url.trim_end_matches('/'),
            self.location.owner,
            self.location.repo,
            suffix
        )
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        debug!(%method, url, "GitHub request");
        self.client
            .request(method, url)
            .bearer_auth(&self.location.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    /// Turn a non-2xx response into [`TransportError::Status`].
    async fn error_from(response: Response) -> TransportError {
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<WireError>(&text)
            .map(|e| e.message)
            .ok()
            .filter(|m| !m.is_empty())
            .unwrap_or(text);
        TransportError::Status { status, message }
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> TransportResult<T> {
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        response.json().await.map_err(|e| TransportError::Decode {
            message: e.to_string(),
        })
    }

    fn commit_url(&self, commit: &WireCommit) -> String {
        commit.html_url.clone().unwrap_or_else(|| {
            format!(
                "https://github.com/{}/commit/{}",
                self.location.slug(),
                commit.sha
            )
        })
    }

    async fn head_commit_sha(&self) -> TransportResult<String> {
        let url = self.repo_url(&format!("/git/refs/heads/{}", self.location.branch));
        let head: WireRef = Self::send_json(self.request(Method::GET, &url)).await?;
        Ok(head.object.sha)
    }

    async fn commit_tree_sha(&self, commit_sha: &str) -> TransportResult<String> {
        let url = self.repo_url(&format!("/git/commits/{}", commit_sha));
        let commit: WireCommit = Self::send_json(self.request(Method::GET, &url)).await?;
        commit
            .tree
            .map(|tree| tree.sha)
            .ok_or_else(|| TransportError::Decode {
                message: format!("commit {} has no tree", commit_sha),
            })
    }
}

/// Decode GitHub's base64 content envelope (which wraps lines) into text.
pub(crate) fn decode_content(encoded: &str) -> TransportResult<String> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| TransportError::Decode {
            message: format!("invalid base64 content: {}", e),
        })?;
    String::from_utf8(bytes).map_err(|e| TransportError::Decode {
        message: format!("content is not UTF-8: {}", e),
    })
}

fn is_sha_mismatch(status: u16, message: &str) -> bool {
    status == StatusCode::CONFLICT.as_u16()
        || (status == StatusCode::UNPROCESSABLE_ENTITY.as_u16()
            && message.to_ascii_lowercase().contains("sha"))
}

#[async_trait]
impl GitTransport for HttpTransport {
    fn is_configured(&self) -> bool {
        self.location.is_complete()
    }

    #[instrument(skip(self))]
    async fn fetch_file(&self, path: &str) -> TransportResult<Option<RemoteFile>> {
        self.ensure_configured()?;

        let url = self.repo_url(&format!("/contents/{}", path));
        let response = self
            .request(Method::GET, &url)
            .query(&[("ref", self.location.branch.as_str())])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(path, "file does not exist yet");
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let wire: WireContent = response.json().await.map_err(|e| TransportError::Decode {
            message: e.to_string(),
        })?;
        if let Some(encoding) = wire.encoding.as_deref()
            && encoding != "base64"
        {
            return Err(TransportError::Decode {
                message: format!("unsupported content encoding '{}'", encoding),
            });
        }
        let content = decode_content(wire.content.as_deref().unwrap_or_default())?;

        Ok(Some(RemoteFile {
            path: wire.path,
            content,
            blob_sha: wire.sha,
        }))
    }

    #[instrument(skip(self, content, message))]
    async fn put_file(
        &self,
        path: &str,
        content: &str,
        message: &str,
        expected_sha: Option<String>,
    ) -> TransportResult<FileCommit> {
        self.ensure_configured()?;

        let url = self.repo_url(&format!("/contents/{}", path));
        let body = WirePutContent {
            message,
            content: STANDARD.encode(content.as_bytes()),
            branch: &self.location.branch,
            sha: expected_sha.as_deref(),
        };

        let response = self.request(Method::PUT, &url).json(&body).send().await?;
        if !response.status().is_success() {
            let error = Self::error_from(response).await;
            if let TransportError::Status { status, message } = &error
                && is_sha_mismatch(*status, message)
            {
                warn!(path, status, "remote file changed underneath us");
                return Err(TransportError::VersionConflict {
                    path: path.to_string(),
                });
            }
            return Err(error);
        }

        let wire: WirePutContentResponse =
            response.json().await.map_err(|e| TransportError::Decode {
                message: e.to_string(),
            })?;
        let commit_url = self.commit_url(&wire.commit);
        info!(path, commit = %wire.commit.sha, "file committed");

        Ok(FileCommit {
            path: wire.content.path,
            blob_sha: wire.content.sha,
            commit: CommitResult {
                commit_sha: wire.commit.sha,
                commit_url,
                files_updated: 1,
            },
        })
    }

    #[instrument(skip(self, updates, message), fields(files = updates.len()))]
    async fn put_files(
        &self,
        updates: &[FileUpdateRequest],
        message: &str,
    ) -> TransportResult<CommitResult> {
        self.ensure_configured()?;

        let head_sha = self.head_commit_sha().await?;
        let base_tree_sha = self.commit_tree_sha(&head_sha).await?;
        debug!(head = %head_sha, base_tree = %base_tree_sha, "resolved branch head");

        let tree_body = WireCreateTree {
            base_tree: &base_tree_sha,
            tree: updates
                .iter()
                .map(|update| WireTreeEntry {
                    path: &update.path,
                    mode: BLOB_MODE,
                    kind: "blob",
                    content: &update.content,
                })
                .collect(),
        };
        let tree: WireTree = Self::send_json(
            self.request(Method::POST, &self.repo_url("/git/trees"))
                .json(&tree_body),
        )
        .await?;
        debug!(tree = %tree.sha, "created tree");

        let commit_body = WireCreateCommit {
            message,
            tree: &tree.sha,
            parents: vec![&head_sha],
        };
        let commit: WireCommit = Self::send_json(
            self.request(Method::POST, &self.repo_url("/git/commits"))
                .json(&commit_body),
        )
        .await?;
        debug!(commit = %commit.sha, "created commit");

        // Until the ref moves, the new tree and commit are unreachable.
        let ref_url = self.repo_url(&format!("/git/refs/heads/{}", self.location.branch));
        let ref_body = WireUpdateRef {
            sha: &commit.sha,
            force: false,
        };
        let _: WireRef =
            Self::send_json(self.request(Method::PATCH, &ref_url).json(&ref_body)).await?;

        info!(commit = %commit.sha, files = updates.len(), "branch fast-forwarded");
        Ok(CommitResult {
            commit_url: self.commit_url(&commit),
            commit_sha: commit.sha,
            files_updated: updates.len(),
        })
    }

    #[instrument(skip(self))]
    async fn validate_access(&self) -> AccessReport {
        if !self.is_configured() {
            return AccessReport::invalid("API not configured");
        }

        let url = self.repo_url("");
        let response = match self.request(Method::GET, &url).send().await {
            Ok(response) => response,
            Err(e) => return AccessReport::invalid(format!("Network error: {}", e)),
        };

        if !response.status().is_success() {
            let status = response.status();
            return AccessReport::invalid(format!(
                "Repository access failed: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or_default()
            ));
        }

        match response.json::<WireRepository>().await {
            Ok(repo) => AccessReport {
                valid: true,
                repo_name: Some(repo.name),
                repo_url: Some(repo.html_url),
                permissions: repo.permissions,
                error: None,
            },
            Err(e) => AccessReport::invalid(format!("Unexpected repository response: {}", e)),
        }
    }
}
