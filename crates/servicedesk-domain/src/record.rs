use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::category::{Category, CategoryValue, title_for};

/// Identifier as a backend hands it out: numeric ids from API rows, string
/// ids minted for locally persisted records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(u64),
    Text(String),
}

impl RecordId {
    /// Reads a raw selection or path segment: numeric text becomes a numeric
    /// id, anything else stays a string.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<u64>() {
            Ok(value) => Self::Number(value),
            Err(_) => Self::Text(trimmed.to_string()),
        }
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<u64> for RecordId {
    fn from(value: u64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// One support request as the backends serialize it. Rows stay tolerant of
/// the two category spellings (embedded object vs. foreign key) and of the
/// legacy `created` timestamp key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportRequest {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<RecordId>,
    pub description: String,
    #[serde(alias = "created")]
    pub created_at: DateTime<Utc>,
}

impl SupportRequest {
    /// Display title for this request: the embedded category wins, then a
    /// catalog lookup by foreign key, then an inline label.
    #[must_use]
    pub fn category_title<'a>(&'a self, categories: &'a [Category]) -> Option<&'a str> {
        if let Some(CategoryValue::Linked(category)) = &self.category {
            return Some(category.title.as_str());
        }
        if let Some(title) = self
            .category_id
            .as_ref()
            .and_then(|id| title_for(categories, id))
        {
            return Some(title);
        }
        match &self.category {
            Some(CategoryValue::Label(label)) => Some(label.as_str()),
            _ => None,
        }
    }

    /// Value an edit form should preselect: the embedded category id, then
    /// the bare foreign key, then the inline label.
    #[must_use]
    pub fn category_selection(&self) -> Option<String> {
        if let Some(CategoryValue::Linked(category)) = &self.category {
            return Some(category.id.to_string());
        }
        if let Some(id) = &self.category_id {
            return Some(id.to_string());
        }
        match &self.category {
            Some(CategoryValue::Label(label)) => Some(label.clone()),
            _ => None,
        }
    }
}
