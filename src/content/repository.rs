//! Content repository - maps documents onto repository files.
//!
//! Reads go straight to the transport every time. Nothing is cached: a blob
//! SHA read earlier in the session may already be stale.

use tracing::{debug, info, instrument, warn};

use crate::github::{CommitResult, FileUpdateRequest, GitTransport, TransportError};

use super::document::{Document, DocumentKind, ProjectList, SiteConfig};
use super::error::{ContentError, ContentResult};

/// Retries after the first attempt when a single-file write hits a stale SHA.
pub const MAX_CONFLICT_RETRIES: u32 = 3;

/// Document-level access to the content files of one repository.
pub struct ContentRepository<T: GitTransport> {
    transport: T,
}

impl<T: GitTransport> ContentRepository<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn is_configured(&self) -> bool {
        self.transport.is_configured()
    }

    /// Fetch and parse a document. `Ok(None)` when its JSON file is absent.
    ///
    /// A file that exists but does not parse is an error, never a default.
    #[instrument(skip(self), fields(kind = %D::KIND))]
    pub async fn read_document<D: Document>(&self) -> ContentResult<Option<D>> {
        let path = D::KIND.json_path();
        let Some(file) = self.transport.fetch_file(path).await? else {
            debug!(path, "document not present in repository");
            return Ok(None);
        };

        D::from_json(&file.content)
            .map(Some)
            .map_err(|source| ContentError::MalformedContent {
                path: path.to_string(),
                source,
            })
    }

    /// Write a document's JSON form as a single-file commit.
    ///
    /// The file's SHA is re-read right before every attempt. A version
    /// conflict is retried up to [`MAX_CONFLICT_RETRIES`] times; if the file
    /// vanished in the meantime the retry creates it.
    #[instrument(skip(self, document, message), fields(kind = %D::KIND))]
    pub async fn save_document<D: Document>(
        &self,
        document: &D,
        message: &str,
    ) -> ContentResult<CommitResult> {
        let path = D::KIND.json_path();
        let content = document.to_json()?;
        let mut retries = 0;

        loop {
            let expected_sha = self
                .transport
                .fetch_file(path)
                .await?
                .map(|file| file.blob_sha);

            match self
                .transport
                .put_file(path, &content, message, expected_sha)
                .await
            {
                Ok(written) => {
                    info!(path, retries, commit = %written.commit.commit_sha, "document saved");
                    return Ok(written.commit);
                }
                Err(TransportError::VersionConflict { .. }) if retries < MAX_CONFLICT_RETRIES => {
                    retries += 1;
                    warn!(path, retries, "version conflict, refetching SHA");
                }
                Err(TransportError::VersionConflict { .. }) => {
                    warn!(path, retries, "giving up after repeated conflicts");
                    return Err(ContentError::PublishConflict {
                        path: path.to_string(),
                        retries,
                    });
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Commit both documents, JSON and module forms, in one atomic commit.
    #[instrument(skip_all)]
    pub async fn save_both(
        &self,
        projects: &ProjectList,
        site_config: &SiteConfig,
        message: &str,
    ) -> ContentResult<CommitResult> {
        let updates = build_updates(projects, site_config)?;
        let result = self.transport.put_files(&updates, message).await?;
        info!(commit = %result.commit_sha, files = result.files_updated, "content published");
        Ok(result)
    }
}

/// The four file writes of a publish, all derived from the same values.
pub fn build_updates(
    projects: &ProjectList,
    site_config: &SiteConfig,
) -> ContentResult<Vec<FileUpdateRequest>> {
    Ok(vec![
        FileUpdateRequest::new(DocumentKind::Projects.json_path(), projects.to_json()?),
        FileUpdateRequest::new(DocumentKind::SiteConfig.json_path(), site_config.to_json()?),
        FileUpdateRequest::new(DocumentKind::Projects.module_path(), projects.to_module()?),
        FileUpdateRequest::new(
            DocumentKind::SiteConfig.module_path(),
            site_config.to_module()?,
        ),
    ])
}
