use async_trait::async_trait;
use thiserror::Error;

use servicedesk_domain::{Category, RecordId, RequestFields, SupportRequest};

/// Which write a backend was asked to perform. Carried inside persistence
/// errors so callers can phrase their message without parsing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl MutationKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl std::fmt::Display for MutationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum BackendError {
    /// The category catalog could not be loaded. Consumers degrade to a
    /// disabled category selection, not a dead screen.
    #[error("category load failed: {message}")]
    CategoryLoad { message: String },
    /// The record collection could not be fetched. Consumers degrade to an
    /// empty collection.
    #[error("request fetch failed: {message}")]
    Fetch { message: String },
    /// A write did not go through; nothing may be applied locally.
    #[error("request {op} failed: {message}")]
    Persistence { op: MutationKind, message: String },
}

impl BackendError {
    pub(crate) fn category_load(message: impl Into<String>) -> Self {
        Self::CategoryLoad {
            message: message.into(),
        }
    }

    pub(crate) fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch {
            message: message.into(),
        }
    }

    pub(crate) fn persistence(op: MutationKind, message: impl Into<String>) -> Self {
        Self::Persistence {
            op,
            message: message.into(),
        }
    }
}

/// Persistence strategy behind the desk: either the remote HTTP API or the
/// local seed-plus-snapshot store. Object safe so the variant can be picked
/// once at configuration time.
#[async_trait]
pub trait RequestBackend: Send + Sync {
    /// Loads the category catalog. The local store has no catalog and
    /// returns an empty list.
    async fn fetch_categories(&self) -> Result<Vec<Category>, BackendError>;

    /// Loads the full record collection. After any successful mutation a
    /// subsequent fetch reflects that mutation.
    async fn fetch_requests(&self) -> Result<Vec<SupportRequest>, BackendError>;

    /// Persists a new record and returns it with its assigned id and
    /// creation time.
    async fn create(&self, fields: &RequestFields) -> Result<SupportRequest, BackendError>;

    /// Replaces every non-identity field of `id` and returns the stored
    /// record. `id` and `created_at` are preserved.
    async fn update(
        &self,
        id: &RecordId,
        fields: &RequestFields,
    ) -> Result<SupportRequest, BackendError>;

    /// Removes `id` from the backing store.
    async fn delete(&self, id: &RecordId) -> Result<(), BackendError>;
}
