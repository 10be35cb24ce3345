//! Identifier classification.

use super::ContentUri;
use crate::contract::{PATH_LIVE_VIEW, PATH_RECORDS};
use crate::error::{StoreError, StoreResult};

/// Shape of a recognized identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UriMatch {
    /// `<authority>/records`
    Records,
    /// `<authority>/records/<key>`
    Record(i64),
    /// `<authority>/live_view/records`
    LiveView,
}

impl UriMatch {
    /// Record key named by the identifier, if any.
    pub fn key(self) -> Option<i64> {
        match self {
            Self::Record(key) => Some(key),
            Self::Records | Self::LiveView => None,
        }
    }
}

/// Matches identifiers for one authority.
///
/// Built once from configuration and never mutated.
#[derive(Debug, Clone)]
pub struct UriRouter {
    authority: String,
}

impl UriRouter {
    pub fn new(authority: impl Into<String>) -> Self {
        Self {
            authority: authority.into(),
        }
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Classifies an identifier.
    ///
    /// # Errors
    /// - `UnknownIdentifier` for a foreign authority or any path other than
    ///   the three recognized shapes. Record keys must be non-negative
    ///   decimal integers that fit in `i64`.
    pub fn classify(&self, uri: &ContentUri) -> StoreResult<UriMatch> {
        if uri.authority() != self.authority {
            return Err(StoreError::UnknownIdentifier(uri.to_string()));
        }

        let segments: Vec<&str> = uri.segments().iter().map(String::as_str).collect();
        match segments.as_slice() {
            [PATH_RECORDS] => Ok(UriMatch::Records),
            [PATH_RECORDS, key] => parse_key(key)
                .map(UriMatch::Record)
                .ok_or_else(|| StoreError::UnknownIdentifier(uri.to_string())),
            [PATH_LIVE_VIEW, PATH_RECORDS] => Ok(UriMatch::LiveView),
            _ => Err(StoreError::UnknownIdentifier(uri.to_string())),
        }
    }

    /// Parses and classifies an identifier string.
    pub fn classify_str(&self, raw: &str) -> StoreResult<(ContentUri, UriMatch)> {
        let uri = ContentUri::parse(raw)?;
        let matched = self.classify(&uri)?;
        Ok((uri, matched))
    }

    pub fn records_uri(&self) -> ContentUri {
        ContentUri::from_parts(&self.authority, &[PATH_RECORDS])
    }

    pub fn record_uri(&self, key: i64) -> ContentUri {
        self.records_uri().with_appended(key.to_string())
    }

    pub fn live_view_uri(&self) -> ContentUri {
        ContentUri::from_parts(&self.authority, &[PATH_LIVE_VIEW, PATH_RECORDS])
    }
}

fn parse_key(segment: &str) -> Option<i64> {
    if segment.is_empty() || !segment.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    segment.parse::<i64>().ok()
}
