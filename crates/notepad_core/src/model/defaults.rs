//! Default-value policy applied to inserts.
//!
//! # Invariants
//! - Caller-supplied values are never overwritten.
//! - Both timestamps are present on every inserted record.

use super::record::NewRecord;

/// Insert payload with every column filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompleteRecord {
    pub title: String,
    pub body: String,
    pub created_at: i64,
    pub modified_at: i64,
}

/// Fills omitted insert fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultValues {
    untitled_title: String,
}

impl DefaultValues {
    pub fn new(untitled_title: impl Into<String>) -> Self {
        Self {
            untitled_title: untitled_title.into(),
        }
    }

    pub fn untitled_title(&self) -> &str {
        &self.untitled_title
    }

    /// Applies defaults in order: `createdAt`, `modifiedAt`, `title`, `body`.
    ///
    /// Each timestamp defaults to `now` independently of the other.
    pub fn apply(&self, values: NewRecord, now: i64) -> CompleteRecord {
        CompleteRecord {
            created_at: values.created_at.unwrap_or(now),
            modified_at: values.modified_at.unwrap_or(now),
            title: values
                .title
                .unwrap_or_else(|| self.untitled_title.clone()),
            body: values.body.unwrap_or_default(),
        }
    }
}
