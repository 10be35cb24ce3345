//! Record data model.
//!
//! # Responsibility
//! - Define the typed record shape and the write payloads for insert and
//!   update.
//! - Own the insert default-value policy.
//!
//! # Invariants
//! - `id` is assigned by storage and never changes.
//! - `modified_at >= created_at` for every stored record.

pub mod defaults;
pub mod record;
