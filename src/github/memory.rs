//! In-memory repository used by tests.
//!
//! Behaves like a single-branch remote: every write produces a new commit,
//! blob SHAs change on every write, and `put_files` only becomes visible
//! once its (simulated) ref update succeeds.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;

use super::error::{TransportError, TransportResult};
use super::transport::GitTransport;
use super::types::{AccessReport, CommitResult, FileCommit, FileUpdateRequest, RemoteFile};

#[derive(Default)]
struct State {
    files: BTreeMap<String, (String, String)>,
    commits: usize,
    blobs: usize,
    fail_ref_update: bool,
    put_files_calls: usize,
}

pub struct MemoryTransport {
    configured: bool,
    state: Mutex<State>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self {
            configured: true,
            state: Mutex::new(State::default()),
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            state: Mutex::new(State::default()),
        }
    }

    /// Write a file directly, as another client would.
    pub fn external_write(&self, path: &str, content: &str) {
        let mut state = self.state.lock().unwrap();
        state.commits += 1;
        let sha = next_blob(&mut state);
        state
            .files
            .insert(path.to_string(), (content.to_string(), sha));
    }

    /// Make the branch ref update of the next `put_files` fail.
    pub fn fail_ref_update(&self, fail: bool) {
        self.state.lock().unwrap().fail_ref_update = fail;
    }

    pub fn content(&self, path: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .files
            .get(path)
            .map(|(content, _)| content.clone())
    }

    pub fn commit_count(&self) -> usize {
        self.state.lock().unwrap().commits
    }

    pub fn put_files_calls(&self) -> usize {
        self.state.lock().unwrap().put_files_calls
    }
}

fn next_blob(state: &mut State) -> String {
    state.blobs += 1;
    format!("blob{:04}", state.blobs)
}

fn commit_result(number: usize, files_updated: usize) -> CommitResult {
    CommitResult {
        commit_sha: format!("commit{:04}", number),
        commit_url: format!("https://github.com/octo/site/commit/commit{:04}", number),
        files_updated,
    }
}

#[async_trait]
impl GitTransport for MemoryTransport {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn fetch_file(&self, path: &str) -> TransportResult<Option<RemoteFile>> {
        if !self.configured {
            return Err(TransportError::NotConfigured);
        }
        let state = self.state.lock().unwrap();
        Ok(state.files.get(path).map(|(content, sha)| RemoteFile {
            path: path.to_string(),
            content: content.clone(),
            blob_sha: sha.clone(),
        }))
    }

    async fn put_file(
        &self,
        path: &str,
        content: &str,
        _message: &str,
        expected_sha: Option<String>,
    ) -> TransportResult<FileCommit> {
        if !self.configured {
            return Err(TransportError::NotConfigured);
        }
        let mut state = self.state.lock().unwrap();
        let current = state.files.get(path).map(|(_, sha)| sha.clone());
        if current != expected_sha {
            return Err(TransportError::VersionConflict {
                path: path.to_string(),
            });
        }
        state.commits += 1;
        let sha = next_blob(&mut state);
        state
            .files
            .insert(path.to_string(), (content.to_string(), sha.clone()));
        Ok(FileCommit {
            path: path.to_string(),
            blob_sha: sha,
            commit: commit_result(state.commits, 1),
        })
    }

    async fn put_files(
        &self,
        updates: &[FileUpdateRequest],
        _message: &str,
    ) -> TransportResult<CommitResult> {
        if !self.configured {
            return Err(TransportError::NotConfigured);
        }
        let mut state = self.state.lock().unwrap();
        state.put_files_calls += 1;
        if state.fail_ref_update {
            return Err(TransportError::Status {
                status: 422,
                message: "Update is not a fast forward".to_string(),
            });
        }
        state.commits += 1;
        for update in updates {
            let sha = next_blob(&mut state);
            state
                .files
                .insert(update.path.clone(), (update.content.clone(), sha));
        }
        Ok(commit_result(state.commits, updates.len()))
    }

    async fn validate_access(&self) -> AccessReport {
        if !self.configured {
            return AccessReport::invalid("API not configured");
        }
        AccessReport {
            valid: true,
            repo_name: Some("site".to_string()),
            repo_url: Some("https://github.com/octo/site".to_string()),
            ..Default::default()
        }
    }
}
