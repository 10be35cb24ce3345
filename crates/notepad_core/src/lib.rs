//! Single-table note record store addressed by content identifiers.
//! This crate owns routing, storage, change notification and export.

pub mod config;
pub mod contract;
pub mod db;
pub mod error;
pub mod export;
pub mod logging;
pub mod model;
pub mod notify;
pub mod projection;
pub mod provider;
pub mod repo;
pub mod service;
pub mod uri;

pub use config::{ConfigError, StoreConfig};
pub use error::{Operation, StoreError, StoreResult};
pub use export::ExportStream;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::record::{NewRecord, Record, RecordChanges, RecordId};
pub use notify::{ChangeNotifier, ChangeObserver, ChangeSubscription, ObserverId};
pub use provider::RecordStore;
pub use repo::cursor::{RecordCursor, RecordRow};
pub use repo::record_repo::{RecordQuery, Selection};
pub use service::note_service::{derive_title, NoteService};
pub use uri::{ContentUri, UriMatch, UriRouter};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
