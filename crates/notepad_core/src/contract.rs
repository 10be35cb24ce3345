//! Stable external contract of the record store.
//!
//! # Responsibility
//! - Name the identifier scheme, path segments and column names callers use.
//! - Define content types reported by `get_type` and the export path.
//!
//! # Invariants
//! - Values here are part of the wire contract and must not change.

/// Identifier scheme prefix, including the `//` separator.
pub const SCHEME: &str = "content://";

/// Physical table holding every record.
pub const TABLE_NAME: &str = "records";

/// Path segment naming the record collection.
pub const PATH_RECORDS: &str = "records";

/// Path segment prefixing the read-only live view collection.
pub const PATH_LIVE_VIEW: &str = "live_view";

pub const COLUMN_ID: &str = "id";
pub const COLUMN_TITLE: &str = "title";
pub const COLUMN_BODY: &str = "body";
pub const COLUMN_CREATED_AT: &str = "createdAt";
pub const COLUMN_MODIFIED_AT: &str = "modifiedAt";

/// Storage columns in table order.
pub const STORAGE_COLUMNS: &[&str] = &[
    COLUMN_ID,
    COLUMN_TITLE,
    COLUMN_BODY,
    COLUMN_CREATED_AT,
    COLUMN_MODIFIED_AT,
];

/// Live view alias for `id`.
pub const LIVE_VIEW_ID: &str = "_ID";
/// Live view alias for `title`.
pub const LIVE_VIEW_NAME: &str = "NAME";

/// Content type reported for collection identifiers.
pub const CONTENT_DIR_TYPE: &str = "vnd.notepad.cursor.dir/vnd.notepad.record";
/// Content type reported for single-record identifiers.
pub const CONTENT_ITEM_TYPE: &str = "vnd.notepad.cursor.item/vnd.notepad.record";
/// The only export stream type.
pub const MIME_TEXT_PLAIN: &str = "text/plain";

/// Order applied when a query supplies none.
pub const DEFAULT_SORT_ORDER: &str = "modifiedAt DESC";

/// Returns whether `mime_type` satisfies `filter`.
///
/// `*/*` matches everything, `type/*` matches any subtype of `type`,
/// anything else is an ASCII case-insensitive exact match.
pub fn mime_matches(mime_type: &str, filter: &str) -> bool {
    let filter = filter.trim();
    if filter == "*/*" {
        return true;
    }

    let Some((filter_type, filter_subtype)) = filter.split_once('/') else {
        return false;
    };
    let Some((actual_type, actual_subtype)) = mime_type.split_once('/') else {
        return false;
    };

    if !filter_type.eq_ignore_ascii_case(actual_type) {
        return false;
    }
    filter_subtype == "*" || filter_subtype.eq_ignore_ascii_case(actual_subtype)
}
