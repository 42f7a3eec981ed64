//! Known-issue record model.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::errors::KbError;

/// One curated known issue.
///
/// Only `id` is mandatory in the KB file; the other fields default to empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownIssueRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub content: String,
}

impl KnownIssueRecord {
    /// Title, space-joined symptoms and content as one searchable string.
    pub fn searchable_text(&self) -> String {
        format!("{} {} {}", self.title, self.symptoms.join(" "), self.content)
    }
}

/// Rejects record lists where an `id` appears twice.
pub fn ensure_unique_ids(records: &[KnownIssueRecord]) -> Result<(), KbError> {
    let mut seen = HashSet::with_capacity(records.len());
    for r in records {
        if !seen.insert(r.id.as_str()) {
            return Err(KbError::DuplicateId(r.id.clone()));
        }
    }
    Ok(())
}
