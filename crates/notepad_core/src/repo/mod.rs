//! Query engine and read results.
//!
//! # Responsibility
//! - Own every SQL statement issued against the `records` table.
//! - Isolate SQLite query details from the provider facade.
//!
//! # Invariants
//! - Every public store operation maps to exactly one statement here.
//! - Repository APIs return contract errors (`InvalidTarget`,
//!   `WriteFailed`, ...) in addition to DB transport errors.

pub mod cursor;
pub mod record_repo;
