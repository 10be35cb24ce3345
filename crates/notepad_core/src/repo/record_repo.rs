//! Query engine over the `records` table.
//!
//! # Responsibility
//! - Translate classified requests into single SQL statements.
//! - Apply key-scoping for single-record identifiers.
//! - Keep SQL text construction inside the persistence boundary.
//!
//! # Invariants
//! - Caller filters are parenthesized and only ever ANDed with the key
//!   constraint.
//! - Only projection-map expressions reach the select list; only known
//!   columns reach the order clause.
//! - Updates never touch `id` or `createdAt`, and keep
//!   `modifiedAt >= createdAt` per row.

use super::cursor::value_from_ref;
use crate::contract::DEFAULT_SORT_ORDER;
use crate::error::{Operation, StoreError, StoreResult};
use crate::model::defaults::CompleteRecord;
use crate::model::record::{RecordChanges, RecordId};
use crate::projection::{ProjectionEntry, ProjectionMap};
use crate::uri::{ContentUri, UriMatch};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};

static ORDER_TERM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*([a-z_][a-z0-9_]*)(?:\s+(asc|desc))?\s*$").expect("valid order regex")
});

/// Caller filter: a SQL fragment with positional `?` placeholders and the
/// values bound to them, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub clause: Option<String>,
    pub args: Vec<Value>,
}

impl Selection {
    /// Matches every row.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(clause: impl Into<String>) -> Self {
        Self {
            clause: Some(clause.into()),
            args: Vec::new(),
        }
    }

    /// Appends one bound value.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    fn clause(&self) -> Option<&str> {
        self.clause
            .as_deref()
            .map(str::trim)
            .filter(|clause| !clause.is_empty())
    }
}

/// Read request for one identifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordQuery {
    /// Requested external field names; empty selects every mapped field.
    pub fields: Vec<String>,
    pub selection: Selection,
    /// `column [ASC|DESC]` terms separated by commas.
    pub order_by: Option<String>,
}

impl RecordQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }
}

/// Raw read output: output column names and row values.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// SQLite-backed query engine. The only component issuing SQL against
/// `records`.
pub struct RecordRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> RecordRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Reads rows for `matched`.
    ///
    /// `order_by` defaults to `modifiedAt DESC` when absent or blank.
    pub fn read(
        &self,
        matched: UriMatch,
        columns: &[ProjectionEntry],
        selection: &Selection,
        order_by: Option<&str>,
    ) -> StoreResult<ReadResult> {
        let order = normalize_order(ProjectionMap::for_match(matched), order_by)?;
        let select_list = columns
            .iter()
            .map(|entry| entry.expression)
            .collect::<Vec<_>>()
            .join(", ");

        let mut sql = format!("SELECT {select_list} FROM records");
        if let Some(where_clause) = scoped_where(matched.key(), selection)? {
            sql.push_str(" WHERE ");
            sql.push_str(&where_clause);
        }
        sql.push_str(" ORDER BY ");
        sql.push_str(&order);

        let mut stmt = self.conn.prepare(&sql)?;
        let column_names: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let column_count = column_names.len();

        let mut rows = stmt.query(params_from_iter(selection.args.iter()))?;
        let mut values = Vec::new();
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(column_count);
            for index in 0..column_count {
                cells.push(value_from_ref(row.get_ref(index)?));
            }
            values.push(cells);
        }

        Ok(ReadResult {
            columns: column_names,
            rows: values,
        })
    }

    /// Inserts one fully-defaulted record and returns its key.
    ///
    /// # Errors
    /// - `InvalidTarget` unless `matched` is the collection.
    /// - `InvalidValues` when `modifiedAt` precedes `createdAt`.
    /// - `WriteFailed` when storage reports an error or no inserted row.
    pub fn insert(
        &self,
        uri: &ContentUri,
        matched: UriMatch,
        record: &CompleteRecord,
    ) -> StoreResult<RecordId> {
        ensure_writable(uri, matched, Operation::Insert)?;
        if record.modified_at < record.created_at {
            return Err(StoreError::InvalidValues(format!(
                "modifiedAt {} precedes createdAt {}",
                record.modified_at, record.created_at
            )));
        }

        let changed = self
            .conn
            .execute(
                "INSERT INTO records (title, body, createdAt, modifiedAt)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    record.title.as_str(),
                    record.body.as_str(),
                    record.created_at,
                    record.modified_at,
                ],
            )
            .map_err(|err| StoreError::WriteFailed(err.to_string()))?;
        if changed == 0 {
            return Err(StoreError::WriteFailed(
                "storage reported no inserted row".to_string(),
            ));
        }

        let key = self.conn.last_insert_rowid();
        if key <= 0 {
            return Err(StoreError::WriteFailed(format!(
                "storage returned invalid key {key}"
            )));
        }
        Ok(key)
    }

    /// Updates matching rows and returns how many changed.
    ///
    /// `modifiedAt` is set to `changes.modified_at`, or `now` when omitted,
    /// raised to the row's `createdAt` if lower.
    pub fn update(
        &self,
        uri: &ContentUri,
        matched: UriMatch,
        changes: &RecordChanges,
        selection: &Selection,
        now: i64,
    ) -> StoreResult<usize> {
        ensure_writable(uri, matched, Operation::Update)?;

        let mut assignments = Vec::with_capacity(3);
        let mut bind_values: Vec<Value> = Vec::with_capacity(3 + selection.args.len());
        if let Some(title) = changes.title.as_ref() {
            assignments.push("title = ?");
            bind_values.push(Value::Text(title.clone()));
        }
        if let Some(body) = changes.body.as_ref() {
            assignments.push("body = ?");
            bind_values.push(Value::Text(body.clone()));
        }
        assignments.push("modifiedAt = MAX(createdAt, ?)");
        bind_values.push(Value::Integer(changes.modified_at.unwrap_or(now)));
        bind_values.extend(selection.args.iter().cloned());

        let mut sql = format!("UPDATE records SET {}", assignments.join(", "));
        if let Some(where_clause) = scoped_where(matched.key(), selection)? {
            sql.push_str(" WHERE ");
            sql.push_str(&where_clause);
        }

        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        Ok(changed)
    }

    /// Deletes matching rows and returns how many were removed.
    pub fn delete(
        &self,
        uri: &ContentUri,
        matched: UriMatch,
        selection: &Selection,
    ) -> StoreResult<usize> {
        ensure_writable(uri, matched, Operation::Delete)?;

        let mut sql = String::from("DELETE FROM records");
        if let Some(where_clause) = scoped_where(matched.key(), selection)? {
            sql.push_str(" WHERE ");
            sql.push_str(&where_clause);
        }

        let changed = self
            .conn
            .execute(&sql, params_from_iter(selection.args.iter()))?;
        Ok(changed)
    }
}

/// Rejects shapes an operation cannot target.
///
/// The live view is read-only; inserts only target the collection.
fn ensure_writable(uri: &ContentUri, matched: UriMatch, operation: Operation) -> StoreResult<()> {
    let allowed = match matched {
        UriMatch::Records => true,
        UriMatch::Record(_) => operation != Operation::Insert,
        UriMatch::LiveView => false,
    };
    if allowed {
        Ok(())
    } else {
        Err(StoreError::InvalidTarget {
            operation,
            uri: uri.to_string(),
        })
    }
}

/// Builds the WHERE body: key constraint AND parenthesized caller filter.
///
/// # Errors
/// - `InvalidFilter` when the filter could escape its parentheses.
pub(crate) fn scoped_where(
    key: Option<RecordId>,
    selection: &Selection,
) -> StoreResult<Option<String>> {
    let clause = selection.clause();
    if let Some(clause) = clause {
        check_filter_structure(clause)?;
    }
    Ok(match (key, clause) {
        (Some(key), Some(clause)) => Some(format!("id = {key} AND ({clause})")),
        (Some(key), None) => Some(format!("id = {key}")),
        (None, Some(clause)) => Some(format!("({clause})")),
        (None, None) => None,
    })
}

/// Rejects filters whose parentheses do not nest on their own.
///
/// Quoted literals, quoted identifiers and comments are skipped; depth may
/// never drop below zero and must end at zero. Unterminated quotes and
/// comments are rejected as well.
fn check_filter_structure(clause: &str) -> StoreResult<()> {
    let invalid = |reason: &str| StoreError::InvalidFilter(format!("{reason} in `{clause}`"));
    let mut depth = 0usize;
    let mut chars = clause.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| invalid("unbalanced `)`"))?;
            }
            '\'' | '"' | '`' => loop {
                let Some(c) = chars.next() else {
                    return Err(invalid("unterminated quote"));
                };
                if c == ch {
                    // A doubled quote is an escaped quote.
                    if chars.peek() == Some(&ch) {
                        chars.next();
                    } else {
                        break;
                    }
                }
            },
            '[' => {
                if !chars.by_ref().any(|c| c == ']') {
                    return Err(invalid("unterminated `[`"));
                }
            }
            '-' if chars.peek() == Some(&'-') => {
                // Running to the end would swallow the wrapping `)`.
                if !chars.by_ref().any(|c| c == '\n') {
                    return Err(invalid("unterminated comment"));
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut previous = '\0';
                let mut closed = false;
                for c in chars.by_ref() {
                    if previous == '*' && c == '/' {
                        closed = true;
                        break;
                    }
                    previous = c;
                }
                if !closed {
                    return Err(invalid("unterminated comment"));
                }
            }
            _ => {}
        }
    }

    if depth == 0 {
        Ok(())
    } else {
        Err(invalid("unbalanced `(`"))
    }
}

/// Validates an order clause against `map` and renders it canonically.
pub(crate) fn normalize_order(map: ProjectionMap, order_by: Option<&str>) -> StoreResult<String> {
    let Some(raw) = order_by.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(DEFAULT_SORT_ORDER.to_string());
    };

    let mut terms = Vec::new();
    for term in raw.split(',') {
        let caps = ORDER_TERM_RE
            .captures(term)
            .ok_or_else(|| StoreError::InvalidSortOrder(raw.to_string()))?;
        let column = &caps[1];
        if !map.is_sortable(column) {
            return Err(StoreError::UnknownField(column.to_string()));
        }
        match caps.get(2) {
            Some(direction) => {
                terms.push(format!("{column} {}", direction.as_str().to_ascii_uppercase()))
            }
            None => terms.push(column.to_string()),
        }
    }
    Ok(terms.join(", "))
}
