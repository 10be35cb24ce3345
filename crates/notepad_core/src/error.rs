//! Error taxonomy for the record-access layer.
//!
//! # Responsibility
//! - Give every caller-visible failure a distinguishable variant.
//! - Keep storage transport errors separate from contract violations.
//!
//! # Invariants
//! - No variant is swallowed between the store and its immediate caller.

use crate::config::ConfigError;
use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Operation named in `InvalidTarget` errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Query,
    Insert,
    Update,
    Delete,
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Query => "query",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub enum StoreError {
    /// Identifier matches no recognized shape.
    UnknownIdentifier(String),
    /// Requested field is outside the projection map.
    UnknownField(String),
    /// Identifier shape does not support the operation.
    InvalidTarget { operation: Operation, uri: String },
    /// Storage refused to create the row.
    WriteFailed(String),
    /// Export requested for a record that does not exist.
    NotFound(String),
    /// Export requested for an identifier or type that cannot be streamed.
    UnsupportedType { uri: String, mime_filter: String },
    /// Order clause is not a list of `column [ASC|DESC]` terms.
    InvalidSortOrder(String),
    /// Caller filter does not nest inside its own parentheses.
    InvalidFilter(String),
    /// Caller-supplied values break a record invariant.
    InvalidValues(String),
    Config(ConfigError),
    Db(DbError),
    /// Export producer could not be started.
    Io(std::io::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownIdentifier(uri) => write!(f, "unknown identifier `{uri}`"),
            Self::UnknownField(field) => write!(f, "unknown field `{field}`"),
            Self::InvalidTarget { operation, uri } => {
                write!(f, "{operation} is not supported for `{uri}`")
            }
            Self::WriteFailed(message) => write!(f, "write failed: {message}"),
            Self::NotFound(uri) => write!(f, "no record at `{uri}`"),
            Self::UnsupportedType { uri, mime_filter } => {
                write!(f, "`{uri}` cannot be exported as `{mime_filter}`")
            }
            Self::InvalidSortOrder(order) => write!(f, "invalid sort order `{order}`"),
            Self::InvalidFilter(message) => write!(f, "invalid filter: {message}"),
            Self::InvalidValues(message) => write!(f, "invalid values: {message}"),
            Self::Config(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for StoreError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
