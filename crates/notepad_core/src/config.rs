//! Store configuration.
//!
//! # Responsibility
//! - Carry the immutable settings a store is opened with.
//! - Validate them once, before any storage access.
//!
//! # Invariants
//! - A config is never mutated after a store has been opened with it.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const DEFAULT_AUTHORITY: &str = "com.example.notepad";
pub const DEFAULT_SCHEMA_VERSION: u32 = 2;
pub const DEFAULT_UNTITLED_TITLE: &str = "<Untitled>";
pub const DEFAULT_EXPORT_PIPE_CAPACITY: usize = 8;

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidAuthority(String),
    InvalidSchemaVersion(u32),
    InvalidPipeCapacity(usize),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidAuthority(value) => write!(f, "invalid authority `{value}`"),
            Self::InvalidSchemaVersion(value) => {
                write!(f, "schema version must be >= 1, got {value}")
            }
            Self::InvalidPipeCapacity(value) => {
                write!(f, "export pipe capacity must be >= 1, got {value}")
            }
        }
    }
}

impl Error for ConfigError {}

/// Settings for one record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Identifier authority, e.g. `com.example.notepad`.
    pub authority: String,
    /// Persisted schema version. Raising it recreates the table empty.
    pub schema_version: u32,
    /// Localized placeholder used when an insert omits `title`.
    pub untitled_title: String,
    /// Number of in-flight chunks the export pipe buffers.
    pub export_pipe_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            authority: DEFAULT_AUTHORITY.to_string(),
            schema_version: DEFAULT_SCHEMA_VERSION,
            untitled_title: DEFAULT_UNTITLED_TITLE.to_string(),
            export_pipe_capacity: DEFAULT_EXPORT_PIPE_CAPACITY,
        }
    }
}

impl StoreConfig {
    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = authority.into();
        self
    }

    pub fn with_schema_version(mut self, version: u32) -> Self {
        self.schema_version = version;
        self
    }

    pub fn with_untitled_title(mut self, title: impl Into<String>) -> Self {
        self.untitled_title = title.into();
        self
    }

    /// Checks every field.
    ///
    /// # Errors
    /// - `InvalidAuthority` when the authority is empty or contains a
    ///   character identifiers cannot carry there (`/`, `?`, `#`, whitespace).
    /// - `InvalidSchemaVersion` when the version is 0.
    /// - `InvalidPipeCapacity` when the capacity is 0.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let authority = self.authority.as_str();
        if authority.is_empty()
            || authority
                .chars()
                .any(|ch| matches!(ch, '/' | '?' | '#') || ch.is_whitespace())
        {
            return Err(ConfigError::InvalidAuthority(self.authority.clone()));
        }
        if self.schema_version == 0 {
            return Err(ConfigError::InvalidSchemaVersion(self.schema_version));
        }
        if self.export_pipe_capacity == 0 {
            return Err(ConfigError::InvalidPipeCapacity(self.export_pipe_capacity));
        }
        Ok(())
    }
}
