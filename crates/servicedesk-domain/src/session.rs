use thiserror::Error;

use crate::record::{RecordId, SupportRequest};
use crate::store::RequestStore;
use crate::validate::{RequestFields, RequestInput, ValidationError, validate};

/// Single-slot edit state: at most one record is being edited at a time.
/// Starting a new edit replaces the previous slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditSession {
    #[default]
    Idle,
    Editing(RecordId),
}

/// What a successful commit asks the backend to do. Create intents leave id
/// assignment and creation time to the backend; update intents pin the
/// record identity and never touch `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestCommit {
    Create(RequestFields),
    Update { id: RecordId, fields: RequestFields },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditSessionError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("request {0} not found")]
    RecordNotFound(RecordId),
}

impl EditSession {
    #[must_use]
    pub fn is_editing(&self) -> bool {
        matches!(self, Self::Editing(_))
    }

    #[must_use]
    pub fn editing_id(&self) -> Option<&RecordId> {
        match self {
            Self::Idle => None,
            Self::Editing(id) => Some(id),
        }
    }

    /// Starts editing `id` and returns a copy of the record for the form
    /// buffer. Unknown ids leave the session exactly as it was.
    pub fn begin(
        &mut self,
        store: &RequestStore,
        id: RecordId,
    ) -> Result<SupportRequest, EditSessionError> {
        let Some(record) = store.get(&id) else {
            return Err(EditSessionError::RecordNotFound(id));
        };
        let record = record.clone();
        *self = Self::Editing(id);
        Ok(record)
    }

    /// Drops back to idle without touching the store.
    pub fn cancel(&mut self) {
        *self = Self::Idle;
    }

    /// Validates the buffer and turns it into a backend intent, returning to
    /// idle. Validation failures leave the session where it was. An editing
    /// session whose record was deleted underneath it resets to idle and
    /// reports the missing id.
    pub fn commit(
        &mut self,
        store: &RequestStore,
        input: &RequestInput,
    ) -> Result<RequestCommit, EditSessionError> {
        let fields = validate(input)?;
        match std::mem::take(self) {
            Self::Idle => Ok(RequestCommit::Create(fields)),
            Self::Editing(id) => {
                if store.get(&id).is_none() {
                    return Err(EditSessionError::RecordNotFound(id));
                }
                Ok(RequestCommit::Update { id, fields })
            }
        }
    }

    /// Puts the session back where it was before `commit`, so a failed
    /// backend write is not mistaken for a saved one.
    pub fn reinstate(&mut self, commit: &RequestCommit) {
        match commit {
            RequestCommit::Create(_) => *self = Self::Idle,
            RequestCommit::Update { id, .. } => *self = Self::Editing(id.clone()),
        }
    }
}
