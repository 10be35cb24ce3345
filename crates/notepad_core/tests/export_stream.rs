use notepad_core::{NewRecord, RecordStore, StoreConfig, StoreError};
use rusqlite::Connection;
use std::io::Read;

fn store() -> RecordStore {
    RecordStore::open_in_memory(StoreConfig::default()).unwrap()
}

fn read_all(mut stream: impl Read) -> Vec<u8> {
    let mut bytes = Vec::new();
    stream.read_to_end(&mut bytes).unwrap();
    bytes
}

#[test]
fn exports_title_blank_line_body() {
    let store = store();
    let key = store
        .insert(&store.records_uri(), NewRecord::new().title("T").body("B"))
        .unwrap();

    let stream = store
        .open_export_stream(&store.record_uri(key), "text/plain")
        .unwrap();
    assert_eq!(stream.mime_type(), "text/plain");
    assert_eq!(read_all(stream), b"T\n\nB\n");
}

#[test]
fn multiline_body_and_wildcard_filters_are_supported() {
    let store = store();
    let body = "line one\nline two\n\n".repeat(2_000);
    let key = store
        .insert(
            &store.records_uri(),
            NewRecord::new().title("Long").body(body.clone()),
        )
        .unwrap();

    for filter in ["*/*", "text/*"] {
        let stream = store
            .open_export_stream(&store.record_uri(key), filter)
            .unwrap();
        let text = String::from_utf8(read_all(stream)).unwrap();
        assert_eq!(text, format!("Long\n\n{body}\n"));
    }
}

#[test]
fn export_types_follow_identifier_shape_and_filter() {
    let store = store();
    let key = store.insert(&store.records_uri(), NewRecord::new()).unwrap();
    let record = store.record_uri(key);

    assert_eq!(store.get_export_types(&record, "text/plain").unwrap(), vec!["text/plain"]);
    assert_eq!(store.get_export_types(&record, "*/*").unwrap(), vec!["text/plain"]);
    assert!(store.get_export_types(&record, "image/*").unwrap().is_empty());
    assert!(store
        .get_export_types(&store.records_uri(), "*/*")
        .unwrap()
        .is_empty());
    assert!(store
        .get_export_types(&store.live_view_uri(), "text/plain")
        .unwrap()
        .is_empty());
}

#[test]
fn collections_and_excluded_types_are_unsupported() {
    let store = store();
    let key = store.insert(&store.records_uri(), NewRecord::new()).unwrap();

    for (uri, filter) in [
        (store.records_uri(), "text/plain"),
        (store.live_view_uri(), "text/plain"),
        (store.record_uri(key), "image/*"),
    ] {
        let err = store.open_export_stream(&uri, filter).unwrap_err();
        assert!(
            matches!(err, StoreError::UnsupportedType { .. }),
            "{uri} with {filter} gave {err:?}"
        );
    }
}

#[test]
fn missing_record_is_not_found() {
    let store = store();
    let err = store
        .open_export_stream(&store.record_uri(12_345), "text/plain")
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[test]
fn undecodable_body_truncates_the_stream() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.db");
    let store = RecordStore::open(&path, StoreConfig::default()).unwrap();
    let key = store
        .insert(&store.records_uri(), NewRecord::new().title("T").body("B"))
        .unwrap();

    let raw = Connection::open(&path).unwrap();
    raw.execute(
        "UPDATE records SET body = X'FF' WHERE id = ?1;",
        rusqlite::params![key],
    )
    .unwrap();
    drop(raw);

    let stream = store
        .open_export_stream(&store.record_uri(key), "text/plain")
        .unwrap();
    assert_eq!(read_all(stream), b"T\n\n");
}

#[test]
fn early_reader_close_leaves_store_usable() {
    let store = RecordStore::open_in_memory(StoreConfig {
        export_pipe_capacity: 1,
        ..StoreConfig::default()
    })
    .unwrap();
    let key = store
        .insert(
            &store.records_uri(),
            NewRecord::new().title("T").body("x".repeat(64 * 1024)),
        )
        .unwrap();

    let mut stream = store
        .open_export_stream(&store.record_uri(key), "text/plain")
        .unwrap();
    let mut first = [0u8; 1];
    stream.read_exact(&mut first).unwrap();
    assert_eq!(&first, b"T");
    drop(stream);

    let again = store
        .open_export_stream(&store.record_uri(key), "text/plain")
        .unwrap();
    assert_eq!(read_all(again).len(), "T\n\n".len() + 64 * 1024 + 1);
}
