//! Record domain model.
//!
//! # Responsibility
//! - Define the canonical note record and its insert/update payloads.
//!
//! # Invariants
//! - Only `title`, `body` and `modified_at` change after creation, so the
//!   update payload carries nothing else.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Storage-assigned record key.
pub type RecordId = i64;

/// One stored note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: RecordId,
    pub title: String,
    pub body: String,
    /// Unix epoch milliseconds, set once at creation.
    pub created_at: i64,
    /// Unix epoch milliseconds, refreshed on every update.
    pub modified_at: i64,
}

/// Insert payload. Omitted fields are filled by the default-value policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecord {
    pub title: Option<String>,
    pub body: Option<String>,
    pub created_at: Option<i64>,
    pub modified_at: Option<i64>,
}

impl NewRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn created_at(mut self, millis: i64) -> Self {
        self.created_at = Some(millis);
        self
    }

    pub fn modified_at(mut self, millis: i64) -> Self {
        self.modified_at = Some(millis);
        self
    }
}

/// Update payload.
///
/// `modified_at` defaults to the current time when omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordChanges {
    pub title: Option<String>,
    pub body: Option<String>,
    pub modified_at: Option<i64>,
}

impl RecordChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn modified_at(mut self, millis: i64) -> Self {
        self.modified_at = Some(millis);
        self
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{NewRecord, Record};

    #[test]
    fn record_serializes_with_external_field_names() {
        let record = Record {
            id: 7,
            title: "t".to_string(),
            body: "b".to_string(),
            created_at: 1,
            modified_at: 2,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["createdAt"], 1);
        assert_eq!(json["modifiedAt"], 2);
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn new_record_builder_sets_only_named_fields() {
        let values = NewRecord::new().title("x").created_at(5);
        assert_eq!(values.title.as_deref(), Some("x"));
        assert_eq!(values.created_at, Some(5));
        assert!(values.body.is_none());
        assert!(values.modified_at.is_none());
    }
}
