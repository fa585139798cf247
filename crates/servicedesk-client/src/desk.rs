use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use servicedesk_domain::{
    Category, EditSession, EditSessionError, RecordId, RequestCommit, RequestInput, RequestStore,
    SupportRequest, query,
};

use crate::backend::{BackendError, RequestBackend};
use crate::config::{BackendMode, DeskConfig};
use crate::local::LocalBackend;
use crate::remote::RemoteBackend;

#[derive(Debug, Error)]
pub enum DeskError {
    #[error(transparent)]
    Session(#[from] EditSessionError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Outcome of a successful submit, so callers can phrase their notification
/// and point at the stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(SupportRequest),
    Updated(SupportRequest),
}

impl SubmitOutcome {
    #[must_use]
    pub fn record(&self) -> &SupportRequest {
        match self {
            Self::Created(record) | Self::Updated(record) => record,
        }
    }
}

/// What bootstrap managed to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapReport {
    pub category_count: usize,
    pub request_count: usize,
    /// True when the catalog could not be loaded and category selection
    /// should be disabled.
    pub categories_degraded: bool,
}

/// Everything the presentation layer talks to: the configured backend, the
/// canonical record collection, the single edit slot, and the category
/// catalog. All commands go through `&mut self`, so call ordering is the
/// caller's and there is no interior locking to reason about.
pub struct SupportDesk {
    backend: Box<dyn RequestBackend>,
    store: RequestStore,
    session: EditSession,
    categories: Vec<Category>,
    categories_degraded: bool,
}

impl SupportDesk {
    /// Builds the desk over an already-constructed backend.
    #[must_use]
    pub fn new(backend: Box<dyn RequestBackend>) -> Self {
        Self {
            backend,
            store: RequestStore::new(),
            session: EditSession::Idle,
            categories: Vec::new(),
            categories_degraded: false,
        }
    }

    /// Picks the backend variant from configuration.
    #[must_use]
    pub fn from_config(config: &DeskConfig) -> Self {
        let backend: Box<dyn RequestBackend> = match config.mode {
            BackendMode::Remote => Box::new(RemoteBackend::new(
                config.api_base_url.clone(),
                Duration::from_millis(config.request_timeout_ms),
            )),
            BackendMode::Local => Box::new(LocalBackend::new(
                snapshot_path_for(config),
                config.seed_path.clone(),
            )),
        };
        Self::new(backend)
    }

    /// Loads the category catalog and the record collection. Both degrade
    /// instead of failing: an unreachable catalog disables category
    /// selection, an unreachable collection starts empty. The catalog is
    /// fetched at most once per session; a degraded one is retried on the
    /// next call.
    pub async fn bootstrap(&mut self) -> BootstrapReport {
        if self.categories.is_empty() {
            match self.backend.fetch_categories().await {
                Ok(categories) => {
                    self.categories = categories;
                    self.categories_degraded = false;
                }
                Err(error) => {
                    warn!(%error, "category load failed; category selection disabled");
                    self.categories.clear();
                    self.categories_degraded = true;
                }
            }
        }
        self.reload().await;
        BootstrapReport {
            category_count: self.categories.len(),
            request_count: self.store.len(),
            categories_degraded: self.categories_degraded,
        }
    }

    /// Validates the form buffer, persists the resulting create or update,
    /// and reconciles the collection with the backend. A failed write rolls
    /// the session back so the edit is not presumed saved.
    pub async fn submit(&mut self, input: &RequestInput) -> Result<SubmitOutcome, DeskError> {
        let commit = self.session.commit(&self.store, input)?;
        let result = match &commit {
            RequestCommit::Create(fields) => {
                self.backend.create(fields).await.map(SubmitOutcome::Created)
            }
            RequestCommit::Update { id, fields } => self
                .backend
                .update(id, fields)
                .await
                .map(SubmitOutcome::Updated),
        };
        match result {
            Ok(outcome) => {
                self.reload().await;
                Ok(outcome)
            }
            Err(error) => {
                self.session.reinstate(&commit);
                Err(DeskError::Backend(error))
            }
        }
    }

    /// Starts editing `id`, returning a copy of the record for the form.
    pub fn begin_edit(&mut self, id: RecordId) -> Result<SupportRequest, DeskError> {
        let record = self.session.begin(&self.store, id)?;
        Ok(record)
    }

    /// Abandons the current edit; the store is untouched.
    pub fn cancel_edit(&mut self) {
        self.session.cancel();
    }

    /// Deletes `id` on the backend, clears a session editing that same
    /// record, and reconciles. A failed delete changes nothing locally.
    pub async fn delete(&mut self, id: &RecordId) -> Result<(), DeskError> {
        self.backend.delete(id).await.map_err(DeskError::Backend)?;
        if self.session.editing_id() == Some(id) {
            self.session.cancel();
        }
        self.reload().await;
        Ok(())
    }

    #[must_use]
    pub fn search(&self, text: &str) -> Vec<&SupportRequest> {
        query::search(self.store.all(), text)
    }

    #[must_use]
    pub fn filter_by_category(&self, title: &str) -> Vec<&SupportRequest> {
        query::filter_by_category(self.store.all(), &self.categories, title)
    }

    #[must_use]
    pub fn requests(&self) -> &[SupportRequest] {
        self.store.all()
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    #[must_use]
    pub fn categories_degraded(&self) -> bool {
        self.categories_degraded
    }

    #[must_use]
    pub fn editing_id(&self) -> Option<&RecordId> {
        self.session.editing_id()
    }

    async fn reload(&mut self) {
        match self.backend.fetch_requests().await {
            Ok(records) => {
                debug!(count = records.len(), "loaded support requests");
                self.store.replace_all(records);
            }
            Err(error) => {
                warn!(%error, "request fetch failed; continuing with an empty collection");
                self.store.replace_all(Vec::new());
            }
        }
    }
}

fn snapshot_path_for(config: &DeskConfig) -> PathBuf {
    config
        .data_dir
        .as_deref()
        .map_or_else(LocalBackend::default_snapshot_path, LocalBackend::snapshot_path_in)
}
