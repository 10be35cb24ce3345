//! Projection maps from external field names to storage expressions.
//!
//! # Responsibility
//! - Resolve requested fields into the column expressions a read selects.
//! - Reject any field outside the map so callers cannot inject expressions.
//!
//! # Invariants
//! - Maps are compile-time constants; nothing mutates them.
//! - An empty request resolves to every entry of the map, in map order.

use crate::contract::{
    COLUMN_BODY, COLUMN_CREATED_AT, COLUMN_ID, COLUMN_MODIFIED_AT, COLUMN_TITLE, LIVE_VIEW_ID,
    LIVE_VIEW_NAME, STORAGE_COLUMNS,
};
use crate::error::{StoreError, StoreResult};
use crate::uri::UriMatch;

/// One external field and the expression that produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionEntry {
    /// Name callers request.
    pub field: &'static str,
    /// SQL expression selected for the field.
    pub expression: &'static str,
    /// Column name the result carries.
    pub output: &'static str,
}

const RECORDS_ENTRIES: &[ProjectionEntry] = &[
    ProjectionEntry {
        field: COLUMN_ID,
        expression: COLUMN_ID,
        output: COLUMN_ID,
    },
    ProjectionEntry {
        field: COLUMN_TITLE,
        expression: COLUMN_TITLE,
        output: COLUMN_TITLE,
    },
    ProjectionEntry {
        field: COLUMN_BODY,
        expression: COLUMN_BODY,
        output: COLUMN_BODY,
    },
    ProjectionEntry {
        field: COLUMN_CREATED_AT,
        expression: COLUMN_CREATED_AT,
        output: COLUMN_CREATED_AT,
    },
    ProjectionEntry {
        field: COLUMN_MODIFIED_AT,
        expression: COLUMN_MODIFIED_AT,
        output: COLUMN_MODIFIED_AT,
    },
];

const LIVE_VIEW_ENTRIES: &[ProjectionEntry] = &[
    ProjectionEntry {
        field: COLUMN_ID,
        expression: "id AS _ID",
        output: LIVE_VIEW_ID,
    },
    ProjectionEntry {
        field: COLUMN_TITLE,
        expression: "title AS NAME",
        output: LIVE_VIEW_NAME,
    },
];

/// Fixed field map for one identifier shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionMap {
    entries: &'static [ProjectionEntry],
}

impl ProjectionMap {
    /// Map for the collection and single-record shapes.
    pub const RECORDS: Self = Self {
        entries: RECORDS_ENTRIES,
    };

    /// Map for the live view.
    pub const LIVE_VIEW: Self = Self {
        entries: LIVE_VIEW_ENTRIES,
    };

    pub fn for_match(matched: UriMatch) -> Self {
        match matched {
            UriMatch::Records | UriMatch::Record(_) => Self::RECORDS,
            UriMatch::LiveView => Self::LIVE_VIEW,
        }
    }

    pub fn entries(&self) -> &'static [ProjectionEntry] {
        self.entries
    }

    /// Resolves requested fields into projection entries.
    ///
    /// Duplicate requests are kept, matching the caller's column order.
    ///
    /// # Errors
    /// - `UnknownField` for the first field not present in the map.
    pub fn resolve<S: AsRef<str>>(&self, requested: &[S]) -> StoreResult<Vec<ProjectionEntry>> {
        if requested.is_empty() {
            return Ok(self.entries.to_vec());
        }

        requested
            .iter()
            .map(|field| {
                let field = field.as_ref();
                self.entries
                    .iter()
                    .find(|entry| entry.field == field)
                    .copied()
                    .ok_or_else(|| StoreError::UnknownField(field.to_string()))
            })
            .collect()
    }

    /// Returns whether `column` may appear in an order clause for this map.
    ///
    /// Storage columns are always sortable; output aliases are sortable
    /// for the map that defines them.
    pub fn is_sortable(&self, column: &str) -> bool {
        STORAGE_COLUMNS
            .iter()
            .any(|known| known.eq_ignore_ascii_case(column))
            || self
                .entries
                .iter()
                .any(|entry| entry.output.eq_ignore_ascii_case(column))
    }
}

/// Resolves fields for a classified identifier.
pub fn resolve<S: AsRef<str>>(
    matched: UriMatch,
    requested: &[S],
) -> StoreResult<Vec<ProjectionEntry>> {
    ProjectionMap::for_match(matched).resolve(requested)
}
