//! Use-case services for presentation collaborators.
//!
//! # Responsibility
//! - Orchestrate store operations into editor/list level APIs.
//! - Keep UI layers decoupled from identifiers and selections.

pub mod note_service;
