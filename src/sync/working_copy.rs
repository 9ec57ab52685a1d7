//! Typed view over the working-copy store.
//!
//! Every entry is a JSON string under a fixed key. Documents that were never
//! edited have no entry and read as the bundled defaults; an entry that
//! exists but does not parse is reported, never silently replaced.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::content::{Document, Project, ProjectList, SiteConfig};
use crate::github::RepositoryLocation;
use crate::store::WorkingCopyStore;

use super::error::{SyncError, SyncResult};
use super::status::SyncRecord;

pub const PROJECTS_KEY: &str = "personal_website_projects";
pub const SITE_CONFIG_KEY: &str = "personal_website_site_config";
pub const SYNC_STATUS_KEY: &str = "personal_website_sync_status";
pub const LOCATION_KEY: &str = "personal_website_github_config";

/// Snapshot of both documents, as written by `folio export`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub site_config: SiteConfig,
    pub projects: ProjectList,
    pub export_date: DateTime<Utc>,
}

pub struct WorkingCopy<'a, S: WorkingCopyStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: WorkingCopyStore + ?Sized> WorkingCopy<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn projects(&self) -> SyncResult<ProjectList> {
        Ok(self.read(PROJECTS_KEY)?.unwrap_or_else(ProjectList::bundled_default))
    }

    pub fn site_config(&self) -> SyncResult<SiteConfig> {
        Ok(self
            .read(SITE_CONFIG_KEY)?
            .unwrap_or_else(SiteConfig::bundled_default))
    }

    pub fn featured_projects(&self) -> SyncResult<Vec<Project>> {
        Ok(self.projects()?.featured().into_iter().cloned().collect())
    }

    pub fn save_projects(&self, projects: &ProjectList) -> SyncResult<()> {
        self.write(PROJECTS_KEY, projects)
    }

    pub fn save_site_config(&self, site_config: &SiteConfig) -> SyncResult<()> {
        self.write(SITE_CONFIG_KEY, site_config)
    }

    /// Whether the document has a stored entry, as opposed to defaults.
    pub fn has_projects(&self) -> SyncResult<bool> {
        Ok(self.store.get(PROJECTS_KEY)?.is_some())
    }

    pub fn has_site_config(&self) -> SyncResult<bool> {
        Ok(self.store.get(SITE_CONFIG_KEY)?.is_some())
    }

    pub fn record(&self) -> SyncResult<SyncRecord> {
        Ok(self.read(SYNC_STATUS_KEY)?.unwrap_or_default())
    }

    pub fn save_record(&self, record: &SyncRecord) -> SyncResult<()> {
        self.write(SYNC_STATUS_KEY, record)
    }

    pub fn load_location(&self) -> SyncResult<Option<RepositoryLocation>> {
        self.read(LOCATION_KEY)
    }

    pub fn save_location(&self, location: &RepositoryLocation) -> SyncResult<()> {
        self.write(LOCATION_KEY, location)
    }

    pub fn clear_location(&self) -> SyncResult<()> {
        Ok(self.store.remove(LOCATION_KEY)?)
    }

    /// Drop local edits and sync bookkeeping. The saved location is kept.
    pub fn reset(&self) -> SyncResult<()> {
        for key in [PROJECTS_KEY, SITE_CONFIG_KEY, SYNC_STATUS_KEY] {
            self.store.remove(key)?;
        }
        debug!("working copy reset to defaults");
        Ok(())
    }

    pub fn export(&self) -> SyncResult<ExportBundle> {
        Ok(ExportBundle {
            site_config: self.site_config()?,
            projects: self.projects()?,
            export_date: Utc::now(),
        })
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> SyncResult<Option<T>> {
        let Some(text) = self.store.get(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| SyncError::MalformedWorkingCopy {
                key: key.to_string(),
                source,
            })
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) -> SyncResult<()> {
        let text = serde_json::to_string(value).map_err(crate::content::ContentError::from)?;
        self.store.set(key, &text)?;
        Ok(())
    }
}
