use serde::{Deserialize, Serialize};

use crate::record::RecordId;

/// One selectable category as the remote API lists it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: RecordId,
    pub title: String,
}

/// Category slot on a request row. API rows embed the full `{id, title}`
/// object, locally persisted rows carry the bare label the user entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryValue {
    Linked(Category),
    Label(String),
}

/// Catalog lookup by id.
#[must_use]
pub fn title_for<'a>(categories: &'a [Category], id: &RecordId) -> Option<&'a str> {
    categories
        .iter()
        .find(|category| &category.id == id)
        .map(|category| category.title.as_str())
}
