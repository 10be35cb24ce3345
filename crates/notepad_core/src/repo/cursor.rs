//! Read results.

use crate::contract::{COLUMN_BODY, COLUMN_CREATED_AT, COLUMN_ID, COLUMN_MODIFIED_AT, COLUMN_TITLE};
use crate::model::record::Record;
use crate::notify::ChangeSubscription;
use crate::uri::ContentUri;
use crossbeam::channel as chan;
use rusqlite::types::{Value, ValueRef};
use std::sync::Arc;

/// One result row, addressed by output column name.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordRow {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl RecordRow {
    pub(crate) fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|name| name == column)
            .and_then(|index| self.values.get(index))
    }

    pub fn get_i64(&self, column: &str) -> Option<i64> {
        match self.get(column)? {
            Value::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn get_str(&self, column: &str) -> Option<&str> {
        match self.get(column)? {
            Value::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Builds a typed record when the row carries every storage column.
    ///
    /// NULL `title`/`body` read as empty text.
    pub fn to_record(&self) -> Option<Record> {
        let text = |column: &str| match self.get(column)? {
            Value::Text(value) => Some(value.clone()),
            Value::Null => Some(String::new()),
            _ => None,
        };

        Some(Record {
            id: self.get_i64(COLUMN_ID)?,
            title: text(COLUMN_TITLE)?,
            body: text(COLUMN_BODY)?,
            created_at: self.get_i64(COLUMN_CREATED_AT)?,
            modified_at: self.get_i64(COLUMN_MODIFIED_AT)?,
        })
    }
}

/// Forward-only rows returned by `query`.
///
/// Reads are eager: every matching row is fetched before `query` returns,
/// so the cursor is a snapshot and later writes never alter what it
/// yields. Iteration consumes the rows and cannot restart. The cursor holds
/// a change subscription for the queried identifier for as long as it
/// lives; `has_changed` reports writes made after the snapshot.
pub struct RecordCursor {
    uri: ContentUri,
    columns: Arc<[String]>,
    rows: std::vec::IntoIter<Vec<Value>>,
    subscription: ChangeSubscription,
}

impl RecordCursor {
    pub(crate) fn new(
        uri: ContentUri,
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
        subscription: ChangeSubscription,
    ) -> Self {
        Self {
            uri,
            columns: columns.into(),
            rows: rows.into_iter(),
            subscription,
        }
    }

    /// Identifier the cursor was queried with.
    pub fn uri(&self) -> &ContentUri {
        &self.uri
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Drains pending change events; returns whether any arrived since the
    /// last call.
    pub fn has_changed(&self) -> bool {
        self.subscription.has_changed()
    }

    /// Change events for the queried identifier.
    pub fn changes(&self) -> &chan::Receiver<ContentUri> {
        self.subscription.changes()
    }
}

impl Iterator for RecordCursor {
    type Item = RecordRow;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows
            .next()
            .map(|values| RecordRow::new(Arc::clone(&self.columns), values))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl ExactSizeIterator for RecordCursor {}

/// Copies a borrowed SQLite value.
///
/// Text that is not valid UTF-8 is kept as a blob instead of failing the
/// whole read.
pub(crate) fn value_from_ref(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(value) => Value::Integer(value),
        ValueRef::Real(value) => Value::Real(value),
        ValueRef::Text(bytes) => match String::from_utf8(bytes.to_vec()) {
            Ok(text) => Value::Text(text),
            Err(err) => Value::Blob(err.into_bytes()),
        },
        ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::{value_from_ref, RecordRow};
    use rusqlite::types::{Value, ValueRef};
    use std::sync::Arc;

    #[test]
    fn invalid_utf8_text_becomes_blob() {
        assert_eq!(
            value_from_ref(ValueRef::Text(&[0xff, 0xfe])),
            Value::Blob(vec![0xff, 0xfe])
        );
        assert_eq!(
            value_from_ref(ValueRef::Text(b"ok")),
            Value::Text("ok".to_string())
        );
    }

    #[test]
    fn to_record_requires_all_storage_columns() {
        let columns: Arc<[String]> = vec!["id".to_string(), "title".to_string()].into();
        let partial = RecordRow::new(
            columns,
            vec![Value::Integer(1), Value::Text("t".to_string())],
        );
        assert_eq!(partial.get_i64("id"), Some(1));
        assert_eq!(partial.get_str("title"), Some("t"));
        assert!(partial.to_record().is_none());
    }
}
