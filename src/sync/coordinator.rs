//! Sync coordinator - pull and publish between the working copy and GitHub.
//!
//! Operations take `&mut self`, so one coordinator never runs two of them
//! at once.

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::content::{ContentRepository, Document, ProjectList, SiteConfig};
use crate::github::{AccessReport, CommitResult, GitTransport};
use crate::store::WorkingCopyStore;

use super::error::{FailureKind, SyncError, SyncResult};
use super::status::{SyncPhase, SyncStatus};
use super::working_copy::WorkingCopy;

pub const DEFAULT_PUBLISH_MESSAGE: &str = "Update content via admin panel";

/// Which documents a pull replaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullReport {
    pub updated: bool,
    pub projects_updated: bool,
    pub site_config_updated: bool,
}

/// The commit a publish produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishReport {
    pub commit_sha: String,
    pub commit_url: String,
    pub files_updated: usize,
}

/// Flattened result for display, either way an operation went.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome<R> {
    pub success: bool,
    #[serde(flatten)]
    pub report: Option<R>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
}

impl<R: Clone> From<&SyncResult<R>> for Outcome<R> {
    fn from(result: &SyncResult<R>) -> Self {
        match result {
            Ok(report) => Self {
                success: true,
                report: Some(report.clone()),
                error: None,
                failure: None,
            },
            Err(e) => Self {
                success: false,
                report: None,
                error: Some(e.to_string()),
                failure: Some(e.kind()),
            },
        }
    }
}

pub type PullOutcome = Outcome<PullReport>;
pub type PublishOutcome = Outcome<PublishReport>;

pub struct SyncCoordinator<T: GitTransport, S: WorkingCopyStore> {
    content: ContentRepository<T>,
    store: S,
    phase: SyncPhase,
}

impl<T: GitTransport, S: WorkingCopyStore> SyncCoordinator<T, S> {
    pub fn new(content: ContentRepository<T>, store: S) -> Self {
        let pending = match WorkingCopy::new(&store).record() {
            Ok(record) => record.pending_changes,
            Err(e) => {
                warn!(error = %e, "sync record unreadable, treating working copy as dirty");
                true
            }
        };
        Self {
            content,
            store,
            phase: SyncPhase::from_pending(pending),
        }
    }

    pub fn content(&self) -> &ContentRepository<T> {
        &self.content
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn working_copy(&self) -> WorkingCopy<'_, S> {
        WorkingCopy::new(&self.store)
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    pub fn status(&self) -> SyncResult<SyncStatus> {
        let record = self.working_copy().record()?;
        Ok(SyncStatus::from_record(record, self.content.is_configured()))
    }

    /// Record that the working copy differs from what was last synced.
    pub fn mark_dirty(&mut self) -> SyncResult<()> {
        let working_copy = self.working_copy();
        let mut record = working_copy.record()?;
        if !record.pending_changes {
            record.pending_changes = true;
            working_copy.save_record(&record)?;
            debug!("working copy marked dirty");
        }
        self.phase = SyncPhase::Dirty;
        Ok(())
    }

    pub fn edit_projects(&mut self, projects: &ProjectList) -> SyncResult<()> {
        self.working_copy().save_projects(projects)?;
        self.mark_dirty()
    }

    pub fn edit_site_config(&mut self, site_config: &SiteConfig) -> SyncResult<()> {
        self.working_copy().save_site_config(site_config)?;
        self.mark_dirty()
    }

    /// Discard local edits; the working copy reads as defaults again.
    pub fn reset(&mut self) -> SyncResult<()> {
        self.working_copy().reset()?;
        self.phase = SyncPhase::Clean;
        Ok(())
    }

    pub async fn validate_access(&self) -> AccessReport {
        self.content.transport().validate_access().await
    }

    pub async fn read_document<D: Document>(&self) -> SyncResult<Option<D>> {
        Ok(self.content.read_document::<D>().await?)
    }

    pub async fn save_document<D: Document>(
        &self,
        document: &D,
        message: &str,
    ) -> SyncResult<CommitResult> {
        Ok(self.content.save_document(document, message).await?)
    }

    /// Replace the working copy with whatever the repository holds.
    ///
    /// Both documents are fetched before anything local is written, so a
    /// failed fetch leaves the working copy exactly as it was. A document
    /// missing from the repository leaves its local counterpart alone.
    /// Any successful pull clears the pending flag, even one that found
    /// nothing.
    ///
    /// Projects are written before the site config. If the site config
    /// write fails after projects were replaced, the working copy is left
    /// mixed, so the record is marked pending and the store error returned.
    #[instrument(skip(self))]
    pub async fn pull(&mut self) -> SyncResult<PullReport> {
        if !self.content.is_configured() {
            return Err(SyncError::NotConfigured);
        }

        let before = self.phase;
        self.phase = SyncPhase::Pulling;
        let result = self.pull_inner(before).await;
        self.phase = self.settled_phase(before);
        result
    }

    async fn pull_inner(&self, before: SyncPhase) -> SyncResult<PullReport> {
        let projects = self.content.read_document::<ProjectList>().await?;
        let site_config = self.content.read_document::<SiteConfig>().await?;

        let report = PullReport {
            updated: projects.is_some() || site_config.is_some(),
            projects_updated: projects.is_some(),
            site_config_updated: site_config.is_some(),
        };

        let working_copy = self.working_copy();
        if report.updated && before == SyncPhase::Dirty {
            warn!("pull is overwriting unpublished local edits");
        }
        if let Some(projects) = &projects {
            working_copy.save_projects(projects)?;
        }
        if let Some(site_config) = &site_config
            && let Err(e) = working_copy.save_site_config(site_config)
        {
            if report.projects_updated {
                warn!(error = %e, "site config write failed after projects were pulled");
                Self::flag_partial_pull(&working_copy);
            }
            return Err(e);
        }

        let mut record = working_copy.record()?;
        record.pending_changes = false;
        record.last_pulled_at = Some(Utc::now());
        working_copy.save_record(&record)?;

        info!(
            projects = report.projects_updated,
            site_config = report.site_config_updated,
            "pull complete"
        );
        Ok(report)
    }

    /// Commit the whole working copy, both documents in JSON and module
    /// form, as one commit.
    ///
    /// On failure nothing local changes and pending edits stay pending.
    #[instrument(skip(self))]
    pub async fn publish(&mut self, message: &str) -> SyncResult<PublishReport> {
        if !self.content.is_configured() {
            return Err(SyncError::NotConfigured);
        }

        let before = self.phase;
        self.phase = SyncPhase::Publishing;
        let result = self.publish_inner(message).await;
        if let Err(e) = &result {
            warn!(error = %e, "publish failed");
        }
        self.phase = self.settled_phase(before);
        result
    }

    async fn publish_inner(&self, message: &str) -> SyncResult<PublishReport> {
        let working_copy = self.working_copy();
        let projects = working_copy.projects()?;
        let site_config = working_copy.site_config()?;

        let commit = self
            .content
            .save_both(&projects, &site_config, message)
            .await?;

        let mut record = working_copy.record()?;
        record.pending_changes = false;
        record.last_published_at = Some(Utc::now());
        record.last_commit_url = Some(commit.commit_url.clone());
        working_copy.save_record(&record)?;

        Ok(PublishReport {
            commit_sha: commit.commit_sha,
            commit_url: commit.commit_url,
            files_updated: commit.files_updated,
        })
    }

    fn flag_partial_pull(working_copy: &WorkingCopy<'_, S>) {
        let flagged = working_copy.record().and_then(|mut record| {
            record.pending_changes = true;
            working_copy.save_record(&record)
        });
        if let Err(e) = flagged {
            warn!(error = %e, "could not mark partially pulled working copy as pending");
        }
    }

    fn settled_phase(&self, fallback: SyncPhase) -> SyncPhase {
        match self.working_copy().record() {
            Ok(record) => SyncPhase::from_pending(record.pending_changes),
            Err(_) => fallback,
        }
    }
}
