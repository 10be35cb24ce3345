//! `content://` identifier value type.

use crate::contract::SCHEME;
use crate::error::{StoreError, StoreResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

static CONTENT_URI_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^content://([^/?#\s]+)((?:/[^/?#\s]+)*)$").expect("valid content uri regex")
});

/// Parsed resource identifier.
///
/// Holds the authority and the non-empty path segments. `Display` renders
/// the exact string the identifier was parsed from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentUri {
    authority: String,
    segments: Vec<String>,
}

impl ContentUri {
    /// Parses an identifier string.
    ///
    /// # Errors
    /// - `UnknownIdentifier` when the string is not `content://` followed
    ///   by an authority and zero or more non-empty path segments. Query
    ///   strings, fragments, empty segments and whitespace are rejected.
    pub fn parse(value: &str) -> StoreResult<Self> {
        let caps = CONTENT_URI_RE
            .captures(value)
            .ok_or_else(|| StoreError::UnknownIdentifier(value.to_string()))?;

        let authority = caps[1].to_string();
        let segments = caps
            .get(2)
            .map(|path| {
                path.as_str()
                    .split('/')
                    .filter(|segment| !segment.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            authority,
            segments,
        })
    }

    /// Builds an identifier from already-validated parts.
    pub(crate) fn from_parts(authority: &str, segments: &[&str]) -> Self {
        Self {
            authority: authority.to_string(),
            segments: segments.iter().map(|segment| segment.to_string()).collect(),
        }
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns a copy with `segment` appended to the path.
    pub fn with_appended(&self, segment: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.segments.push(segment.into());
        next
    }

    /// Returns whether `self` names a proper path prefix of `other` under
    /// the same authority.
    pub fn is_ancestor_of(&self, other: &ContentUri) -> bool {
        self.authority == other.authority
            && self.segments.len() < other.segments.len()
            && other.segments.starts_with(&self.segments)
    }
}

impl Display for ContentUri {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{SCHEME}{}", self.authority)?;
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for ContentUri {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
