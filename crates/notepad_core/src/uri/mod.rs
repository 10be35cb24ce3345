//! Resource identifiers and their classification.
//!
//! # Responsibility
//! - Parse `content://<authority>/<path>` identifiers into a value type.
//! - Classify parsed identifiers into the closed set of shapes the store
//!   serves.
//!
//! # Invariants
//! - Classification is purely syntactic and never touches storage.
//! - Unmatched identifiers are errors, never partial matches.

mod grammar;
mod router;

pub use grammar::ContentUri;
pub use router::{UriMatch, UriRouter};
