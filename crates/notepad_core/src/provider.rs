//! Record store facade: the seven operations collaborators call.
//!
//! # Responsibility
//! - Route identifiers, resolve projections and run the query engine.
//! - Announce every completed write through the change notifier.
//! - Hand single records to the streaming exporter.
//!
//! # Invariants
//! - The connection is opened once per store and shared by every call.
//! - Each operation issues one statement; nothing spans operations.
//! - Notifications run after the connection lock is released, so observers
//!   may call back into the store.

use crate::config::StoreConfig;
use crate::contract::{
    mime_matches, COLUMN_BODY, COLUMN_ID, COLUMN_TITLE, CONTENT_DIR_TYPE, CONTENT_ITEM_TYPE,
    MIME_TEXT_PLAIN,
};
use crate::db::{open_db, open_db_in_memory};
use crate::error::{StoreError, StoreResult};
use crate::export::{pipe, spawn_producer, ExportDocument, ExportStream};
use crate::model::defaults::DefaultValues;
use crate::model::record::{now_millis, NewRecord, RecordChanges, RecordId};
use crate::notify::ChangeNotifier;
use crate::projection::ProjectionMap;
use crate::repo::cursor::RecordCursor;
use crate::repo::record_repo::{RecordQuery, RecordRepository, Selection};
use crate::uri::{ContentUri, UriMatch, UriRouter};
use log::{info, warn};
use parking_lot::Mutex;
use rusqlite::types::Value;
use rusqlite::Connection;
use std::path::Path;
use std::time::Instant;

/// Types the export path can produce.
const EXPORT_TYPES: &[&str] = &[MIME_TEXT_PLAIN];

/// Single-table record store.
///
/// Safe to share across threads; every operation blocks the caller until
/// its statement completes.
pub struct RecordStore {
    conn: Mutex<Connection>,
    router: UriRouter,
    defaults: DefaultValues,
    notifier: ChangeNotifier,
    export_pipe_capacity: usize,
}

impl RecordStore {
    /// Opens (or creates) the store file at `path`.
    ///
    /// # Errors
    /// - `Config` when `config` does not validate.
    /// - `Db` when the file cannot be opened or the schema cannot be
    ///   brought to `config.schema_version`. The store is unusable then.
    pub fn open(path: impl AsRef<Path>, config: StoreConfig) -> StoreResult<Self> {
        config.validate()?;
        let conn = open_db(path, config.schema_version)?;
        Ok(Self::from_parts(conn, config))
    }

    /// Opens a store backed by a fresh in-memory database.
    pub fn open_in_memory(config: StoreConfig) -> StoreResult<Self> {
        config.validate()?;
        let conn = open_db_in_memory(config.schema_version)?;
        Ok(Self::from_parts(conn, config))
    }

    fn from_parts(conn: Connection, config: StoreConfig) -> Self {
        Self {
            conn: Mutex::new(conn),
            router: UriRouter::new(config.authority),
            defaults: DefaultValues::new(config.untitled_title),
            notifier: ChangeNotifier::new(),
            export_pipe_capacity: config.export_pipe_capacity,
        }
    }

    pub fn router(&self) -> &UriRouter {
        &self.router
    }

    /// Observer registry shared by every write on this store.
    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    pub fn records_uri(&self) -> ContentUri {
        self.router.records_uri()
    }

    pub fn record_uri(&self, key: RecordId) -> ContentUri {
        self.router.record_uri(key)
    }

    pub fn live_view_uri(&self) -> ContentUri {
        self.router.live_view_uri()
    }

    /// Reads rows for `uri`.
    ///
    /// The cursor is subscribed to changes on `uri`, its descendants and its ancestors.
    ///
    /// # Errors
    /// - `UnknownIdentifier`, `UnknownField`, `InvalidSortOrder`,
    ///   `InvalidFilter`, `Db`.
    pub fn query(&self, uri: &ContentUri, request: &RecordQuery) -> StoreResult<RecordCursor> {
        let started_at = Instant::now();
        let result = self.query_inner(uri, request);
        match &result {
            Ok(cursor) => info!(
                "event=record_query module=provider status=ok rows={} duration_ms={}",
                cursor.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("record_query", started_at, err),
        }
        result
    }

    fn query_inner(&self, uri: &ContentUri, request: &RecordQuery) -> StoreResult<RecordCursor> {
        let matched = self.router.classify(uri)?;
        let columns = ProjectionMap::for_match(matched).resolve(request.fields.as_slice())?;
        let subscription = self.notifier.subscribe(uri.clone());

        let read = {
            let conn = self.conn.lock();
            RecordRepository::new(&conn).read(
                matched,
                &columns,
                &request.selection,
                request.order_by.as_deref(),
            )?
        };

        Ok(RecordCursor::new(
            uri.clone(),
            read.columns,
            read.rows,
            subscription,
        ))
    }

    /// Content type of `uri`: directory for collections, item for records.
    pub fn get_type(&self, uri: &ContentUri) -> StoreResult<&'static str> {
        match self.router.classify(uri)? {
            UriMatch::Records | UriMatch::LiveView => Ok(CONTENT_DIR_TYPE),
            UriMatch::Record(_) => Ok(CONTENT_ITEM_TYPE),
        }
    }

    /// Inserts one record and returns its key.
    ///
    /// Omitted fields are filled by the default-value policy. `uri` is
    /// announced once.
    ///
    /// # Errors
    /// - `UnknownIdentifier`, `InvalidTarget` (anything but the collection),
    ///   `InvalidValues`, `WriteFailed`.
    pub fn insert(&self, uri: &ContentUri, values: NewRecord) -> StoreResult<RecordId> {
        let started_at = Instant::now();
        let result = self.insert_inner(uri, values);
        match &result {
            Ok(key) => info!(
                "event=record_insert module=provider status=ok key={} duration_ms={}",
                key,
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("record_insert", started_at, err),
        }
        result
    }

    fn insert_inner(&self, uri: &ContentUri, values: NewRecord) -> StoreResult<RecordId> {
        let matched = self.router.classify(uri)?;
        let record = self.defaults.apply(values, now_millis());

        let key = {
            let conn = self.conn.lock();
            RecordRepository::new(&conn).insert(uri, matched, &record)?
        };

        self.announce(uri);
        Ok(key)
    }

    /// Updates rows under `uri` and returns how many changed.
    ///
    /// `uri` is announced once even when nothing changed.
    ///
    /// # Errors
    /// - `UnknownIdentifier`, `InvalidTarget` (live view), `InvalidFilter`,
    ///   `Db`.
    pub fn update(
        &self,
        uri: &ContentUri,
        changes: &RecordChanges,
        selection: &Selection,
    ) -> StoreResult<usize> {
        let started_at = Instant::now();
        let result = self.update_inner(uri, changes, selection);
        match &result {
            Ok(count) => info!(
                "event=record_update module=provider status=ok affected={} duration_ms={}",
                count,
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("record_update", started_at, err),
        }
        result
    }

    fn update_inner(
        &self,
        uri: &ContentUri,
        changes: &RecordChanges,
        selection: &Selection,
    ) -> StoreResult<usize> {
        let matched = self.router.classify(uri)?;
        let count = {
            let conn = self.conn.lock();
            RecordRepository::new(&conn).update(uri, matched, changes, selection, now_millis())?
        };

        self.announce(uri);
        Ok(count)
    }

    /// Deletes rows under `uri` and returns how many were removed.
    ///
    /// `uri` is announced once even when nothing was removed.
    ///
    /// # Errors
    /// - `UnknownIdentifier`, `InvalidTarget` (live view), `InvalidFilter`,
    ///   `Db`.
    pub fn delete(&self, uri: &ContentUri, selection: &Selection) -> StoreResult<usize> {
        let started_at = Instant::now();
        let result = self.delete_inner(uri, selection);
        match &result {
            Ok(count) => info!(
                "event=record_delete module=provider status=ok affected={} duration_ms={}",
                count,
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("record_delete", started_at, err),
        }
        result
    }

    fn delete_inner(&self, uri: &ContentUri, selection: &Selection) -> StoreResult<usize> {
        let matched = self.router.classify(uri)?;
        let count = {
            let conn = self.conn.lock();
            RecordRepository::new(&conn).delete(uri, matched, selection)?
        };

        self.announce(uri);
        Ok(count)
    }

    /// Notifies the written identifier, then the live view, which shows
    /// rows of the same table under an unrelated path.
    fn announce(&self, uri: &ContentUri) {
        self.notifier.notify(uri);
        self.notifier.notify(&self.router.live_view_uri());
    }

    /// Export types `uri` offers that satisfy `mime_filter`.
    ///
    /// Collections and the live view offer none.
    pub fn get_export_types(
        &self,
        uri: &ContentUri,
        mime_filter: &str,
    ) -> StoreResult<Vec<&'static str>> {
        match self.router.classify(uri)? {
            UriMatch::Records | UriMatch::LiveView => Ok(Vec::new()),
            UriMatch::Record(_) => Ok(EXPORT_TYPES
                .iter()
                .copied()
                .filter(|mime_type| mime_matches(mime_type, mime_filter))
                .collect()),
        }
    }

    /// Opens a plain-text export of one record.
    ///
    /// The record is read before returning; serialization runs on a
    /// producer thread writing into the returned stream.
    ///
    /// # Errors
    /// - `UnknownIdentifier`.
    /// - `UnsupportedType` for collections, the live view, or a filter that
    ///   excludes `text/plain`.
    /// - `NotFound` when no record has the key.
    /// - `Io` when the producer thread cannot be started.
    pub fn open_export_stream(
        &self,
        uri: &ContentUri,
        mime_filter: &str,
    ) -> StoreResult<ExportStream> {
        let started_at = Instant::now();
        let result = self.open_export_stream_inner(uri, mime_filter);
        match &result {
            Ok(stream) => info!(
                "event=export_open module=provider status=ok mime_type={} duration_ms={}",
                stream.mime_type(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("export_open", started_at, err),
        }
        result
    }

    fn open_export_stream_inner(
        &self,
        uri: &ContentUri,
        mime_filter: &str,
    ) -> StoreResult<ExportStream> {
        let unsupported = || StoreError::UnsupportedType {
            uri: uri.to_string(),
            mime_filter: mime_filter.to_string(),
        };

        let matched = self.router.classify(uri)?;
        if matched.key().is_none() {
            return Err(unsupported());
        }
        let mime_type = self
            .get_export_types(uri, mime_filter)?
            .first()
            .copied()
            .ok_or_else(unsupported)?;

        let columns =
            ProjectionMap::for_match(matched).resolve(&[COLUMN_ID, COLUMN_TITLE, COLUMN_BODY])?;
        let read = {
            let conn = self.conn.lock();
            RecordRepository::new(&conn).read(matched, &columns, &Selection::all(), None)?
        };
        let row = read
            .rows
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound(uri.to_string()))?;

        let cell = |column: &str| {
            read.columns
                .iter()
                .position(|name| name == column)
                .and_then(|index| row.get(index).cloned())
                .unwrap_or(Value::Null)
        };
        let document = ExportDocument {
            uri: uri.clone(),
            title: cell(COLUMN_TITLE),
            body: cell(COLUMN_BODY),
        };

        let (writer, reader) = pipe(self.export_pipe_capacity, mime_type);
        spawn_producer(writer, document).map_err(StoreError::Io)?;
        Ok(reader)
    }
}

fn log_failure(event: &str, started_at: Instant, err: &StoreError) {
    warn!(
        "event={} module=provider status=error error_code={} duration_ms={} error={}",
        event,
        error_code(err),
        started_at.elapsed().as_millis(),
        err
    );
}

fn error_code(err: &StoreError) -> &'static str {
    match err {
        StoreError::UnknownIdentifier(_) => "unknown_identifier",
        StoreError::UnknownField(_) => "unknown_field",
        StoreError::InvalidTarget { .. } => "invalid_target",
        StoreError::WriteFailed(_) => "write_failed",
        StoreError::NotFound(_) => "not_found",
        StoreError::UnsupportedType { .. } => "unsupported_type",
        StoreError::InvalidSortOrder(_) => "invalid_sort_order",
        StoreError::InvalidFilter(_) => "invalid_filter",
        StoreError::InvalidValues(_) => "invalid_values",
        StoreError::Config(_) => "invalid_config",
        StoreError::Db(_) => "db_error",
        StoreError::Io(_) => "io_error",
    }
}
