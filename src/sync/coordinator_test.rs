use crate::content::*;
use crate::github::memory::MemoryTransport;
use crate::github::{MockGitTransport, RemoteFile, TransportError};
use crate::store::{MemoryStore, StoreError, StoreResult, WorkingCopyStore};
use crate::sync::*;
use serde_json::json;

type MemoryCoordinator = SyncCoordinator<MemoryTransport, MemoryStore>;

fn coordinator() -> MemoryCoordinator {
    SyncCoordinator::new(ContentRepository::new(MemoryTransport::new()), MemoryStore::new())
}

fn config_named(name: &str) -> SiteConfig {
    serde_json::from_value(json!({ "personal": { "name": name } })).unwrap()
}

/// Memory store that refuses writes to one key.
struct FailingWriteStore {
    inner: MemoryStore,
    failing_key: &'static str,
}

impl WorkingCopyStore for FailingWriteStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        if key == self.failing_key {
            return Err(StoreError::Io(std::io::Error::other("disk full")));
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.inner.remove(key)
    }
}

fn remote(path: &str, content: &str) -> RemoteFile {
    RemoteFile {
        path: path.to_string(),
        content: content.to_string(),
        blob_sha: "sha1".to_string(),
    }
}

#[test]
fn test_new_coordinator_is_clean() {
    let coordinator = coordinator();
    let status = coordinator.status().unwrap();

    assert_eq!(coordinator.phase(), SyncPhase::Clean);
    assert!(status.is_configured);
    assert!(!status.pending_changes);
    assert!(status.last_published_at.is_none());
    assert!(status.last_pulled_at.is_none());
}

#[test]
fn test_mark_dirty_sets_pending() {
    let mut coordinator = coordinator();
    coordinator.mark_dirty().unwrap();

    assert!(coordinator.status().unwrap().pending_changes);
    assert_eq!(coordinator.phase(), SyncPhase::Dirty);
}

#[test]
fn test_edit_writes_working_copy_and_marks_dirty() {
    let mut coordinator = coordinator();
    coordinator.edit_site_config(&config_named("X")).unwrap();

    let stored = coordinator.working_copy().site_config().unwrap();
    assert_eq!(stored.personal_name(), Some("X"));
    assert!(coordinator.status().unwrap().pending_changes);
}

#[test]
fn test_pending_flag_survives_new_coordinator() {
    let store = MemoryStore::new();
    WorkingCopy::new(&store)
        .save_record(&SyncRecord {
            pending_changes: true,
            ..Default::default()
        })
        .unwrap();

    let coordinator = SyncCoordinator::new(ContentRepository::new(MemoryTransport::new()), store);
    assert_eq!(coordinator.phase(), SyncPhase::Dirty);
}

#[tokio::test]
async fn test_publish_success_clears_pending() {
    let mut coordinator = coordinator();
    let projects = ProjectList(vec![Project::new(1, "A")]);
    coordinator.edit_projects(&projects).unwrap();
    coordinator.edit_site_config(&config_named("X")).unwrap();

    let report = coordinator.publish(DEFAULT_PUBLISH_MESSAGE).await.unwrap();

    assert_eq!(report.files_updated, 4);
    let status = coordinator.status().unwrap();
    assert!(!status.pending_changes);
    assert!(status.last_published_at.is_some());
    assert_eq!(status.last_commit_url.as_deref(), Some(report.commit_url.as_str()));
    assert_eq!(coordinator.phase(), SyncPhase::Clean);

    let transport = coordinator.content().transport();
    assert_eq!(transport.commit_count(), 1);
    assert_eq!(
        transport.content("content/projects.json").unwrap(),
        projects.to_json().unwrap()
    );
    assert_eq!(
        transport.content("data/siteConfig.js").unwrap(),
        config_named("X").to_module().unwrap()
    );
}

#[tokio::test]
async fn test_publish_untouched_working_copy_sends_defaults() {
    let mut coordinator = coordinator();
    coordinator.publish("initial").await.unwrap();

    let transport = coordinator.content().transport();
    assert_eq!(
        transport.content("content/projects.json").unwrap(),
        ProjectList::bundled_default().to_json().unwrap()
    );
}

#[tokio::test]
async fn test_failed_publish_keeps_pending_and_working_copy() {
    let mut coordinator = coordinator();
    coordinator.edit_site_config(&config_named("X")).unwrap();
    coordinator.content().transport().fail_ref_update(true);

    let err = coordinator.publish("msg").await.unwrap_err();

    assert_eq!(err.kind(), FailureKind::Remote);
    let status = coordinator.status().unwrap();
    assert!(status.pending_changes);
    assert!(status.last_published_at.is_none());
    assert_eq!(coordinator.phase(), SyncPhase::Dirty);
    assert_eq!(
        coordinator.working_copy().site_config().unwrap().personal_name(),
        Some("X")
    );
    assert_eq!(coordinator.content().transport().commit_count(), 0);
}

#[tokio::test]
async fn test_unconfigured_publish_touches_nothing() {
    let mut coordinator = SyncCoordinator::new(
        ContentRepository::new(MemoryTransport::unconfigured()),
        MemoryStore::new(),
    );
    coordinator.mark_dirty().unwrap();

    let err = coordinator.publish("msg").await.unwrap_err();

    assert!(matches!(err, SyncError::NotConfigured));
    assert_eq!(err.kind(), FailureKind::NotConfigured);
    assert!(coordinator.status().unwrap().pending_changes);
    assert!(!coordinator.status().unwrap().is_configured);
    assert_eq!(coordinator.content().transport().put_files_calls(), 0);
}

#[tokio::test]
async fn test_publish_with_malformed_working_copy_fails_before_network() {
    let mut coordinator = coordinator();
    coordinator.store().set(PROJECTS_KEY, "{oops").unwrap();

    let err = coordinator.publish("msg").await.unwrap_err();

    assert!(matches!(err, SyncError::MalformedWorkingCopy { ref key, .. } if key == PROJECTS_KEY));
    assert_eq!(coordinator.content().transport().put_files_calls(), 0);
}

#[tokio::test]
async fn test_pull_from_empty_repository_changes_nothing() {
    let mut coordinator = coordinator();
    coordinator.mark_dirty().unwrap();

    let report = coordinator.pull().await.unwrap();

    assert_eq!(report, PullReport::default());
    assert!(!coordinator.status().unwrap().pending_changes);
    assert_eq!(coordinator.phase(), SyncPhase::Clean);
    assert!(!coordinator.working_copy().has_projects().unwrap());
    assert!(!coordinator.working_copy().has_site_config().unwrap());
    assert_eq!(
        coordinator.working_copy().projects().unwrap(),
        ProjectList::bundled_default()
    );
    assert!(coordinator.status().unwrap().last_pulled_at.is_some());
}

#[tokio::test]
async fn test_pull_overwrites_local_edits() {
    let mut coordinator = coordinator();
    coordinator.edit_site_config(&config_named("X")).unwrap();
    coordinator
        .content()
        .transport()
        .external_write("content/siteConfig.json", r#"{"personal":{"name":"Y"}}"#);

    let report = coordinator.pull().await.unwrap();

    assert_eq!(
        report,
        PullReport {
            updated: true,
            projects_updated: false,
            site_config_updated: true,
        }
    );
    assert_eq!(
        coordinator.working_copy().site_config().unwrap().personal_name(),
        Some("Y")
    );
    let status = coordinator.status().unwrap();
    assert!(!status.pending_changes);
    assert!(status.last_pulled_at.is_some());
    assert_eq!(coordinator.phase(), SyncPhase::Clean);
}

#[tokio::test]
async fn test_pull_with_only_projects_leaves_site_config() {
    let mut coordinator = coordinator();
    coordinator.edit_site_config(&config_named("local")).unwrap();
    coordinator
        .content()
        .transport()
        .external_write("content/projects.json", r#"[{"id":7,"title":"Remote"}]"#);

    let report = coordinator.pull().await.unwrap();

    assert!(report.projects_updated);
    assert!(!report.site_config_updated);
    let working_copy = coordinator.working_copy();
    assert_eq!(working_copy.projects().unwrap().0[0].title, "Remote");
    assert_eq!(working_copy.site_config().unwrap().personal_name(), Some("local"));
}

#[tokio::test]
async fn test_pull_then_publish_round_trips_remote_content() {
    let mut coordinator = coordinator();
    let remote_json = r#"[
  {
    "id": 1,
    "title": "Kept",
    "liveUrl": null,
    "badge": "new"
  }
]"#;
    coordinator
        .content()
        .transport()
        .external_write("content/projects.json", remote_json);

    coordinator.pull().await.unwrap();
    coordinator.publish("republish").await.unwrap();

    assert_eq!(
        coordinator
            .content()
            .transport()
            .content("content/projects.json")
            .unwrap(),
        remote_json
    );
}

#[tokio::test]
async fn test_pull_failure_writes_nothing() {
    let mut transport = MockGitTransport::new();
    transport.expect_is_configured().return_const(true);
    transport
        .expect_fetch_file()
        .withf(|path| path == "content/projects.json")
        .returning(|_| Ok(Some(remote("content/projects.json", r#"[{"id":1,"title":"R"}]"#))));
    transport
        .expect_fetch_file()
        .withf(|path| path == "content/siteConfig.json")
        .returning(|_| {
            Err(TransportError::Status {
                status: 500,
                message: "boom".to_string(),
            })
        });

    let mut coordinator =
        SyncCoordinator::new(ContentRepository::new(transport), MemoryStore::new());
    coordinator.mark_dirty().unwrap();

    let err = coordinator.pull().await.unwrap_err();

    assert_eq!(err.kind(), FailureKind::Remote);
    assert!(!coordinator.working_copy().has_projects().unwrap());
    let status = coordinator.status().unwrap();
    assert!(status.pending_changes);
    assert!(status.last_pulled_at.is_none());
}

#[tokio::test]
async fn test_pull_with_failed_second_write_leaves_pending() {
    let transport = MemoryTransport::new();
    transport.external_write("content/projects.json", r#"[{"id":3,"title":"Remote"}]"#);
    transport.external_write("content/siteConfig.json", r#"{"personal":{"name":"Y"}}"#);
    let store = FailingWriteStore {
        inner: MemoryStore::new(),
        failing_key: SITE_CONFIG_KEY,
    };
    let mut coordinator = SyncCoordinator::new(ContentRepository::new(transport), store);

    let err = coordinator.pull().await.unwrap_err();

    assert!(matches!(err, SyncError::Store(_)));
    assert_eq!(err.kind(), FailureKind::Local);
    let working_copy = coordinator.working_copy();
    assert_eq!(working_copy.projects().unwrap().0[0].title, "Remote");
    assert!(!working_copy.has_site_config().unwrap());
    let status = coordinator.status().unwrap();
    assert!(status.pending_changes);
    assert!(status.last_pulled_at.is_none());
    assert_eq!(coordinator.phase(), SyncPhase::Dirty);
}

#[test]
fn test_unreadable_record_starts_dirty() {
    let store = MemoryStore::new();
    store.set(SYNC_STATUS_KEY, "{not json").unwrap();

    let coordinator =
        SyncCoordinator::new(ContentRepository::new(MemoryTransport::new()), store);

    assert_eq!(coordinator.phase(), SyncPhase::Dirty);
    let err = coordinator.status().unwrap_err();
    assert!(matches!(err, SyncError::MalformedWorkingCopy { ref key, .. } if key == SYNC_STATUS_KEY));
}

#[tokio::test]
async fn test_pull_reports_malformed_remote_document() {
    let mut coordinator = coordinator();
    coordinator
        .content()
        .transport()
        .external_write("content/projects.json", "not json");

    let err = coordinator.pull().await.unwrap_err();

    assert_eq!(err.kind(), FailureKind::MalformedContent);
    assert!(!coordinator.working_copy().has_projects().unwrap());
}

#[tokio::test]
async fn test_unconfigured_pull_is_rejected() {
    let mut coordinator = SyncCoordinator::new(
        ContentRepository::new(MemoryTransport::unconfigured()),
        MemoryStore::new(),
    );

    let err = coordinator.pull().await.unwrap_err();
    assert!(matches!(err, SyncError::NotConfigured));
}

#[tokio::test]
async fn test_validate_access_passes_through() {
    let coordinator = coordinator();
    let report = coordinator.validate_access().await;
    assert!(report.valid);
    assert_eq!(report.repo_name.as_deref(), Some("site"));
}

#[tokio::test]
async fn test_single_document_save_and_read() {
    let coordinator = coordinator();
    coordinator
        .save_document(&config_named("Solo"), "one file")
        .await
        .unwrap();

    let read: SiteConfig = coordinator.read_document().await.unwrap().unwrap();
    assert_eq!(read.personal_name(), Some("Solo"));
}

#[test]
fn test_reset_returns_to_clean_defaults() {
    let mut coordinator = coordinator();
    coordinator.edit_projects(&ProjectList(vec![])).unwrap();

    coordinator.reset().unwrap();

    assert_eq!(coordinator.phase(), SyncPhase::Clean);
    assert!(!coordinator.status().unwrap().pending_changes);
    assert_eq!(
        coordinator.working_copy().projects().unwrap(),
        ProjectList::bundled_default()
    );
}

#[test]
fn test_outcome_serializes_flat() {
    let ok: SyncResult<PublishReport> = Ok(PublishReport {
        commit_sha: "abc".to_string(),
        commit_url: "https://github.com/o/r/commit/abc".to_string(),
        files_updated: 4,
    });
    let value = serde_json::to_value(PublishOutcome::from(&ok)).unwrap();
    assert_eq!(value["success"], true);
    assert_eq!(value["filesUpdated"], 4);
    assert!(value.get("error").is_none());

    let err: SyncResult<PublishReport> = Err(SyncError::NotConfigured);
    let value = serde_json::to_value(PublishOutcome::from(&err)).unwrap();
    assert_eq!(value["success"], false);
    assert_eq!(value["failure"], "not_configured");
    assert!(value.get("commitUrl").is_none());
}
