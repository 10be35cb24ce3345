//! Note editing use-cases built on the record store operations.
//!
//! # Responsibility
//! - Provide create/save/rename/search/delete flows for editor and list
//!   screens.
//! - Derive a title from the body when the caller gives none.
//!
//! # Invariants
//! - Only the public store operations are used; no SQL lives here.
//! - Derived titles never split a word when the body exceeds the limit.

use crate::contract::COLUMN_TITLE;
use crate::error::StoreResult;
use crate::model::record::{NewRecord, Record, RecordChanges, RecordId};
use crate::provider::RecordStore;
use crate::repo::record_repo::{RecordQuery, Selection};

/// Maximum characters taken from the body for a derived title.
pub const DERIVED_TITLE_MAX_CHARS: usize = 30;

/// Note facade over one record store.
pub struct NoteService<'store> {
    store: &'store RecordStore,
}

impl<'store> NoteService<'store> {
    pub fn new(store: &'store RecordStore) -> Self {
        Self { store }
    }

    /// Creates a note. Without `title`, one is derived from `body`.
    pub fn create_note(&self, body: &str, title: Option<&str>) -> StoreResult<RecordId> {
        let title = title.map_or_else(|| derive_title(body), str::to_string);
        self.store.insert(
            &self.store.records_uri(),
            NewRecord::new().title(title).body(body),
        )
    }

    /// Replaces the body and, when given, the title.
    ///
    /// Returns whether the note existed.
    pub fn save_note(&self, key: RecordId, body: &str, title: Option<&str>) -> StoreResult<bool> {
        let mut changes = RecordChanges::new().body(body);
        if let Some(title) = title {
            changes = changes.title(title);
        }
        let count = self
            .store
            .update(&self.store.record_uri(key), &changes, &Selection::all())?;
        Ok(count > 0)
    }

    /// Title-only edit.
    pub fn rename(&self, key: RecordId, title: &str) -> StoreResult<bool> {
        let count = self.store.update(
            &self.store.record_uri(key),
            &RecordChanges::new().title(title),
            &Selection::all(),
        )?;
        Ok(count > 0)
    }

    pub fn get_note(&self, key: RecordId) -> StoreResult<Option<Record>> {
        let mut cursor = self
            .store
            .query(&self.store.record_uri(key), &RecordQuery::new())?;
        Ok(cursor.next().and_then(|row| row.to_record()))
    }

    /// Lists every note, most recently modified first.
    pub fn list_notes(&self) -> StoreResult<Vec<Record>> {
        let cursor = self
            .store
            .query(&self.store.records_uri(), &RecordQuery::new())?;
        Ok(cursor.filter_map(|row| row.to_record()).collect())
    }

    /// Notes whose title contains `text`, most recently modified first.
    ///
    /// `%` and `_` in `text` match literally.
    pub fn search_titles(&self, text: &str) -> StoreResult<Vec<Record>> {
        let pattern = format!("%{}%", escape_like(text));
        let selection =
            Selection::new(format!("{COLUMN_TITLE} LIKE ? ESCAPE '\\'")).arg(pattern);
        let cursor = self.store.query(
            &self.store.records_uri(),
            &RecordQuery::new().selection(selection),
        )?;
        Ok(cursor.filter_map(|row| row.to_record()).collect())
    }

    /// Returns whether the note existed.
    pub fn delete_note(&self, key: RecordId) -> StoreResult<bool> {
        let count = self
            .store
            .delete(&self.store.record_uri(key), &Selection::all())?;
        Ok(count > 0)
    }
}

/// Derives a title from note text.
///
/// Takes at most the first 30 characters. When the text is longer, the
/// slice is cut back to its last space, unless that space is the first
/// character.
pub fn derive_title(body: &str) -> String {
    let mut title: String = body.chars().take(DERIVED_TITLE_MAX_CHARS).collect();
    if body.chars().count() > DERIVED_TITLE_MAX_CHARS {
        if let Some(last_space) = title.rfind(' ').filter(|index| *index > 0) {
            title.truncate(last_space);
        }
    }
    title
}

fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
