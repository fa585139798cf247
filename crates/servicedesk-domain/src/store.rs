use crate::record::{RecordId, SupportRequest};

/// Canonical in-memory collection, kept in load order. The desk replaces it
/// wholesale after every reload and keeps it aligned with the backend after
/// every mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestStore {
    records: Vec<SupportRequest>,
}

impl RequestStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole collection; the new load order becomes the
    /// iteration order.
    pub fn replace_all(&mut self, records: Vec<SupportRequest>) {
        self.records = records;
    }

    /// Appends a new record, or replaces the record with the same id in
    /// place so its position is kept.
    pub fn upsert(&mut self, record: SupportRequest) {
        if let Some(existing) = self.records.iter_mut().find(|row| row.id == record.id) {
            *existing = record;
        } else {
            self.records.push(record);
        }
    }

    /// Removes the record with the given id; absent ids are a no-op.
    pub fn remove(&mut self, id: &RecordId) {
        self.records.retain(|row| &row.id != id);
    }

    #[must_use]
    pub fn get(&self, id: &RecordId) -> Option<&SupportRequest> {
        self.records.iter().find(|row| &row.id == id)
    }

    #[must_use]
    pub fn all(&self) -> &[SupportRequest] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
