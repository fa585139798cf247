use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use servicedesk_domain::{Category, CategoryValue, RecordId, RequestFields, SupportRequest};

use crate::backend::{BackendError, MutationKind, RequestBackend};

const SNAPSHOT_SCHEMA_VERSION: u32 = 1;
const SNAPSHOT_FILE_NAME: &str = "support-requests.v1.json";

/// Whole-collection snapshot rewritten after every mutation.
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotDocument {
    version: u32,
    requests: Vec<SupportRequest>,
}

/// Read-only seed consulted once, before the snapshot.
#[derive(Debug, Deserialize)]
struct SeedDocument {
    requests: Vec<SupportRequest>,
}

/// Fallback store for running without the API: seeds the collection on
/// first load, keeps it in memory, and rewrites one snapshot file after
/// every mutation. A fresh process recovers the snapshot whenever the seed
/// is unreachable.
#[derive(Debug)]
pub struct LocalBackend {
    snapshot_path: PathBuf,
    seed_path: Option<PathBuf>,
    /// `None` until the first load; every access after that is in-memory.
    requests: Mutex<Option<Vec<SupportRequest>>>,
}

impl LocalBackend {
    #[must_use]
    pub fn new(snapshot_path: PathBuf, seed_path: Option<PathBuf>) -> Self {
        Self {
            snapshot_path,
            seed_path,
            requests: Mutex::new(None),
        }
    }

    /// Snapshot file inside an explicit data directory.
    #[must_use]
    pub fn snapshot_path_in(data_dir: &Path) -> PathBuf {
        data_dir.join(SNAPSHOT_FILE_NAME)
    }

    /// Snapshot location under the platform data directory, with home and
    /// cwd fallbacks.
    #[must_use]
    pub fn default_snapshot_path() -> PathBuf {
        if let Some(mut data_dir) = dirs::data_local_dir() {
            data_dir.push("servicedesk");
            data_dir.push(SNAPSHOT_FILE_NAME);
            return data_dir;
        }
        if let Some(mut home_dir) = dirs::home_dir() {
            home_dir.push(".servicedesk");
            home_dir.push(SNAPSHOT_FILE_NAME);
            return home_dir;
        }
        PathBuf::from(SNAPSHOT_FILE_NAME)
    }

    fn collection(&self) -> MutexGuard<'_, Option<Vec<SupportRequest>>> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// First-load chain: seed, then snapshot, then empty.
    fn load_initial(&self) -> Vec<SupportRequest> {
        if let Some(seed) = self.seed_path.as_deref() {
            match read_seed(seed) {
                Ok(requests) => {
                    debug!(count = requests.len(), path = %seed.display(), "seeded local collection");
                    return requests;
                }
                Err(message) => {
                    warn!(%message, path = %seed.display(), "seed unreadable; falling back to snapshot");
                }
            }
        }
        match read_snapshot(&self.snapshot_path) {
            Some(requests) => {
                debug!(count = requests.len(), path = %self.snapshot_path.display(), "recovered snapshot");
                requests
            }
            None => Vec::new(),
        }
    }

    /// Rewrites the whole snapshot document. Mutations go through this
    /// before the in-memory collection is touched, so a failed write leaves
    /// both the file and the collection as they were.
    fn flush(&self, requests: &[SupportRequest]) -> Result<(), String> {
        if let Some(parent) = self
            .snapshot_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            fs::create_dir_all(parent).map_err(|error| format!("snapshot mkdir failed: {error}"))?;
        }
        let document = SnapshotDocument {
            version: SNAPSHOT_SCHEMA_VERSION,
            requests: requests.to_vec(),
        };
        let encoded = serde_json::to_string_pretty(&document)
            .map_err(|error| format!("snapshot encode failed: {error}"))?;
        fs::write(&self.snapshot_path, encoded)
            .map_err(|error| format!("snapshot write failed: {error}"))
    }
}

#[async_trait]
impl RequestBackend for LocalBackend {
    async fn fetch_categories(&self) -> Result<Vec<Category>, BackendError> {
        // No catalog in local mode; category input degrades to a free label.
        Ok(Vec::new())
    }

    async fn fetch_requests(&self) -> Result<Vec<SupportRequest>, BackendError> {
        let mut guard = self.collection();
        let requests = guard.get_or_insert_with(|| self.load_initial());
        Ok(requests.clone())
    }

    async fn create(&self, fields: &RequestFields) -> Result<SupportRequest, BackendError> {
        let mut guard = self.collection();
        let requests = guard.get_or_insert_with(|| self.load_initial());

        let record = SupportRequest {
            id: RecordId::Text(mint_id()),
            name: fields.name.clone(),
            email: fields.email.clone(),
            category: Some(CategoryValue::Label(fields.category.clone())),
            category_id: None,
            description: fields.description.clone(),
            created_at: Utc::now(),
        };

        let mut next = requests.clone();
        next.push(record.clone());
        self.flush(&next)
            .map_err(|message| BackendError::persistence(MutationKind::Create, message))?;
        *requests = next;
        Ok(record)
    }

    async fn update(
        &self,
        id: &RecordId,
        fields: &RequestFields,
    ) -> Result<SupportRequest, BackendError> {
        let mut guard = self.collection();
        let requests = guard.get_or_insert_with(|| self.load_initial());

        let Some(position) = requests.iter().position(|row| &row.id == id) else {
            return Err(BackendError::persistence(
                MutationKind::Update,
                format!("request {id} not found"),
            ));
        };

        let mut next = requests.clone();
        let row = &mut next[position];
        row.name = fields.name.clone();
        row.email = fields.email.clone();
        row.category = Some(CategoryValue::Label(fields.category.clone()));
        row.category_id = None;
        row.description = fields.description.clone();
        let record = row.clone();

        self.flush(&next)
            .map_err(|message| BackendError::persistence(MutationKind::Update, message))?;
        *requests = next;
        Ok(record)
    }

    async fn delete(&self, id: &RecordId) -> Result<(), BackendError> {
        let mut guard = self.collection();
        let requests = guard.get_or_insert_with(|| self.load_initial());

        let mut next = requests.clone();
        next.retain(|row| &row.id != id);
        self.flush(&next)
            .map_err(|message| BackendError::persistence(MutationKind::Delete, message))?;
        *requests = next;
        Ok(())
    }
}

fn read_seed(path: &Path) -> Result<Vec<SupportRequest>, String> {
    let raw = fs::read_to_string(path).map_err(|error| error.to_string())?;
    serde_json::from_str::<SeedDocument>(&raw)
        .map(|document| document.requests)
        .map_err(|error| error.to_string())
}

fn read_snapshot(path: &Path) -> Option<Vec<SupportRequest>> {
    let raw = fs::read_to_string(path).ok()?;
    let document = serde_json::from_str::<SnapshotDocument>(&raw).ok()?;
    (document.version == SNAPSHOT_SCHEMA_VERSION).then_some(document.requests)
}

fn mint_id() -> String {
    format!("sr_{}", Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn fields(name: &str, category: &str) -> RequestFields {
        RequestFields {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            category: category.to_string(),
            description: format!("{name} has a question"),
        }
    }

    fn seed_json() -> &'static str {
        r#"{
            "requests": [
                {
                    "id": "sr_seed1",
                    "name": "Ada Lovelace",
                    "email": "ada@example.com",
                    "category": "Billing",
                    "description": "Charged twice",
                    "created": "2024-05-01T10:00:00Z"
                }
            ]
        }"#
    }

    #[tokio::test]
    async fn create_persists_and_a_fresh_backend_recovers_it() {
        let dir = tempdir().expect("tempdir");
        let snapshot = LocalBackend::snapshot_path_in(dir.path());

        let backend = LocalBackend::new(snapshot.clone(), None);
        let first = backend
            .create(&fields("Ada", "Billing"))
            .await
            .expect("create should flush");
        let second = backend
            .create(&fields("Grace", "Support"))
            .await
            .expect("create should flush");
        assert_ne!(first.id, second.id);
        assert_eq!(first.category, Some(CategoryValue::Label("Billing".to_string())));

        let reopened = LocalBackend::new(snapshot, None);
        let recovered = reopened
            .fetch_requests()
            .await
            .expect("local fetch never fails");
        assert_eq!(recovered.len(), 2);
        assert_eq!(recovered[0].id, first.id);
        assert_eq!(recovered[0].created_at, first.created_at);
    }

    #[tokio::test]
    async fn seed_wins_over_an_existing_snapshot_on_first_load() {
        let dir = tempdir().expect("tempdir");
        let snapshot = LocalBackend::snapshot_path_in(dir.path());
        let seed = dir.path().join("seed.json");
        fs::write(&seed, seed_json()).expect("seed write");

        // Leave an older snapshot behind; the seed still takes precedence.
        let earlier = LocalBackend::new(snapshot.clone(), None);
        earlier
            .create(&fields("Linus", "Support"))
            .await
            .expect("create should flush");

        let backend = LocalBackend::new(snapshot, Some(seed));
        let requests = backend
            .fetch_requests()
            .await
            .expect("local fetch never fails");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].id, RecordId::Text("sr_seed1".to_string()));
        assert_eq!(requests[0].name, "Ada Lovelace");
    }

    #[tokio::test]
    async fn unreadable_seed_falls_back_to_snapshot() {
        let dir = tempdir().expect("tempdir");
        let snapshot = LocalBackend::snapshot_path_in(dir.path());

        let earlier = LocalBackend::new(snapshot.clone(), None);
        earlier
            .create(&fields("Linus", "Support"))
            .await
            .expect("create should flush");

        let missing_seed = dir.path().join("does-not-exist.json");
        let backend = LocalBackend::new(snapshot, Some(missing_seed));
        let requests = backend
            .fetch_requests()
            .await
            .expect("local fetch never fails");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].name, "Linus");
    }

    #[tokio::test]
    async fn missing_seed_and_snapshot_start_empty() {
        let dir = tempdir().expect("tempdir");
        let backend = LocalBackend::new(
            LocalBackend::snapshot_path_in(dir.path()),
            Some(dir.path().join("missing-seed.json")),
        );
        let requests = backend
            .fetch_requests()
            .await
            .expect("local fetch never fails");
        assert!(requests.is_empty());
    }

    #[tokio::test]
    async fn corrupt_snapshot_is_ignored() {
        let dir = tempdir().expect("tempdir");
        let snapshot = LocalBackend::snapshot_path_in(dir.path());
        fs::write(&snapshot, "{not json").expect("snapshot write");

        let backend = LocalBackend::new(snapshot, None);
        let requests = backend
            .fetch_requests()
            .await
            .expect("local fetch never fails");
        assert!(requests.is_empty());
    }

    #[tokio::test]
    async fn snapshot_version_mismatch_is_ignored() {
        let dir = tempdir().expect("tempdir");
        let snapshot = LocalBackend::snapshot_path_in(dir.path());
        fs::write(&snapshot, r#"{"version": 99, "requests": []}"#).expect("snapshot write");

        let backend = LocalBackend::new(snapshot, None);
        let requests = backend
            .fetch_requests()
            .await
            .expect("local fetch never fails");
        assert!(requests.is_empty());
    }

    #[tokio::test]
    async fn update_preserves_identity_and_rewrites_fields() {
        let dir = tempdir().expect("tempdir");
        let backend = LocalBackend::new(LocalBackend::snapshot_path_in(dir.path()), None);

        let created = backend
            .create(&fields("Ada", "Billing"))
            .await
            .expect("create should flush");
        let updated = backend
            .update(&created.id, &fields("Ada Lovelace", "Support"))
            .await
            .expect("update should flush");

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.name, "Ada Lovelace");
        assert_eq!(updated.category, Some(CategoryValue::Label("Support".to_string())));

        let requests = backend
            .fetch_requests()
            .await
            .expect("local fetch never fails");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0], updated);
    }

    #[tokio::test]
    async fn update_unknown_id_is_a_persistence_error() {
        let dir = tempdir().expect("tempdir");
        let backend = LocalBackend::new(LocalBackend::snapshot_path_in(dir.path()), None);

        let error = backend
            .update(&RecordId::Number(404), &fields("Ada", "Billing"))
            .await
            .expect_err("unknown id");
        match error {
            BackendError::Persistence { op, message } => {
                assert_eq!(op, MutationKind::Update);
                assert!(message.contains("404"), "message was {message}");
            }
            other => panic!("expected a persistence error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn delete_removes_and_rewrites_the_snapshot() {
        let dir = tempdir().expect("tempdir");
        let snapshot = LocalBackend::snapshot_path_in(dir.path());
        let backend = LocalBackend::new(snapshot.clone(), None);

        let keep = backend
            .create(&fields("Ada", "Billing"))
            .await
            .expect("create should flush");
        let doomed = backend
            .create(&fields("Grace", "Support"))
            .await
            .expect("create should flush");

        backend
            .delete(&doomed.id)
            .await
            .expect("delete should flush");

        let reopened = LocalBackend::new(snapshot, None);
        let requests = reopened
            .fetch_requests()
            .await
            .expect("local fetch never fails");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].id, keep.id);
    }

    #[tokio::test]
    async fn snapshot_document_carries_the_schema_version() {
        let dir = tempdir().expect("tempdir");
        let snapshot = LocalBackend::snapshot_path_in(dir.path());
        let backend = LocalBackend::new(snapshot.clone(), None);
        backend
            .create(&fields("Ada", "Billing"))
            .await
            .expect("create should flush");

        let raw = fs::read_to_string(&snapshot).expect("snapshot readable");
        let document: serde_json::Value = serde_json::from_str(&raw).expect("snapshot is json");
        assert_eq!(document["version"], serde_json::json!(SNAPSHOT_SCHEMA_VERSION));
        assert!(document["requests"].is_array());
    }

    #[tokio::test]
    async fn fetch_categories_is_always_empty() {
        let dir = tempdir().expect("tempdir");
        let backend = LocalBackend::new(LocalBackend::snapshot_path_in(dir.path()), None);
        let categories = backend
            .fetch_categories()
            .await
            .expect("local catalog never fails");
        assert!(categories.is_empty());
    }
}
