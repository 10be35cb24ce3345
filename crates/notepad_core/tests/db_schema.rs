use notepad_core::db::schema::current_user_version;
use notepad_core::db::{open_db, DbError};
use notepad_core::{NewRecord, RecordQuery, RecordStore, StoreConfig, StoreError};
use rusqlite::Connection;

#[test]
fn fresh_file_gets_table_at_requested_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.db");

    let conn = open_db(&path, 2).unwrap();
    assert_eq!(current_user_version(&conn).unwrap(), 2);

    let columns: Vec<String> = conn
        .prepare("SELECT name FROM pragma_table_info('records') ORDER BY cid;")
        .unwrap()
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(
        columns,
        vec!["id", "title", "body", "createdAt", "modifiedAt"]
    );
}

#[test]
fn reopening_at_same_version_keeps_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.db");

    {
        let store = RecordStore::open(&path, StoreConfig::default()).unwrap();
        store
            .insert(&store.records_uri(), NewRecord::new().title("kept"))
            .unwrap();
    }

    let store = RecordStore::open(&path, StoreConfig::default()).unwrap();
    let titles: Vec<String> = store
        .query(&store.records_uri(), &RecordQuery::new())
        .unwrap()
        .filter_map(|row| row.get_str("title").map(str::to_string))
        .collect();
    assert_eq!(titles, vec!["kept"]);
}

#[test]
fn version_bump_destroys_existing_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.db");

    {
        let store =
            RecordStore::open(&path, StoreConfig::default().with_schema_version(1)).unwrap();
        for title in ["a", "b", "c"] {
            store
                .insert(&store.records_uri(), NewRecord::new().title(title))
                .unwrap();
        }
    }

    let store = RecordStore::open(&path, StoreConfig::default().with_schema_version(2)).unwrap();
    let cursor = store
        .query(&store.records_uri(), &RecordQuery::new())
        .unwrap();
    assert_eq!(cursor.len(), 0);

    let conn = Connection::open(&path).unwrap();
    assert_eq!(current_user_version(&conn).unwrap(), 2);
}

#[test]
fn newer_database_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.db");
    drop(open_db(&path, 3).unwrap());

    let err = RecordStore::open(&path, StoreConfig::default().with_schema_version(2))
        .err()
        .unwrap();
    assert!(matches!(
        err,
        StoreError::Db(DbError::UnsupportedSchemaVersion {
            db_version: 3,
            requested: 2
        })
    ));
}

#[test]
fn invalid_config_is_rejected_before_opening() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("never-created.db");

    let err = RecordStore::open(&path, StoreConfig::default().with_schema_version(0))
        .err()
        .unwrap();
    assert!(matches!(err, StoreError::Config(_)));
    assert!(!path.exists());
}
