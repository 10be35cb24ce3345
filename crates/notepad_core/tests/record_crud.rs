use notepad_core::{
    NewRecord, Operation, RecordChanges, RecordQuery, RecordStore, Selection, StoreConfig,
    StoreError,
};

fn store() -> RecordStore {
    RecordStore::open_in_memory(StoreConfig::default()).unwrap()
}

fn titles(store: &RecordStore, query: &RecordQuery) -> Vec<String> {
    store
        .query(&store.records_uri(), query)
        .unwrap()
        .filter_map(|row| row.get_str("title").map(str::to_string))
        .collect()
}

#[test]
fn insert_fills_defaults() {
    let store = store();
    let key = store.insert(&store.records_uri(), NewRecord::new()).unwrap();
    assert!(key > 0);

    let record = store
        .query(&store.record_uri(key), &RecordQuery::new())
        .unwrap()
        .next()
        .unwrap()
        .to_record()
        .unwrap();
    assert_eq!(record.id, key);
    assert_eq!(record.title, "<Untitled>");
    assert_eq!(record.body, "");
    assert!(record.created_at > 0);
    assert_eq!(record.created_at, record.modified_at);
}

#[test]
fn insert_keeps_supplied_values() {
    let store = store();
    let key = store
        .insert(
            &store.records_uri(),
            NewRecord::new()
                .title("Groceries")
                .body("milk\neggs")
                .created_at(100)
                .modified_at(200),
        )
        .unwrap();

    let row = store
        .query(&store.record_uri(key), &RecordQuery::new())
        .unwrap()
        .next()
        .unwrap();
    assert_eq!(row.get_str("title"), Some("Groceries"));
    assert_eq!(row.get_str("body"), Some("milk\neggs"));
    assert_eq!(row.get_i64("createdAt"), Some(100));
    assert_eq!(row.get_i64("modifiedAt"), Some(200));
}

#[test]
fn untitled_placeholder_follows_config() {
    let store =
        RecordStore::open_in_memory(StoreConfig::default().with_untitled_title("(sin título)"))
            .unwrap();
    store.insert(&store.records_uri(), NewRecord::new()).unwrap();
    assert_eq!(titles(&store, &RecordQuery::new()), vec!["(sin título)"]);
}

#[test]
fn insert_rejects_modified_before_created() {
    let store = store();
    let err = store
        .insert(
            &store.records_uri(),
            NewRecord::new().created_at(500).modified_at(100),
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidValues(_)));
}

#[test]
fn keys_are_never_reused() {
    let store = store();
    let first = store.insert(&store.records_uri(), NewRecord::new()).unwrap();
    store
        .delete(&store.record_uri(first), &Selection::all())
        .unwrap();
    let second = store.insert(&store.records_uri(), NewRecord::new()).unwrap();
    assert!(second > first);
}

#[test]
fn writes_reject_unsupported_targets() {
    let store = store();
    let key = store.insert(&store.records_uri(), NewRecord::new()).unwrap();

    let err = store
        .insert(&store.record_uri(key), NewRecord::new())
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::InvalidTarget {
            operation: Operation::Insert,
            ..
        }
    ));

    let err = store
        .insert(&store.live_view_uri(), NewRecord::new())
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidTarget { .. }));

    let err = store
        .update(
            &store.live_view_uri(),
            &RecordChanges::new().title("x"),
            &Selection::all(),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::InvalidTarget {
            operation: Operation::Update,
            ..
        }
    ));

    let err = store
        .delete(&store.live_view_uri(), &Selection::all())
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::InvalidTarget {
            operation: Operation::Delete,
            ..
        }
    ));
}

#[test]
fn single_record_update_is_scoped_to_its_key() {
    let store = store();
    let a = store
        .insert(&store.records_uri(), NewRecord::new().title("A"))
        .unwrap();
    let b = store
        .insert(&store.records_uri(), NewRecord::new().title("B"))
        .unwrap();

    // The caller filter matches both rows; the key must still win.
    let selection = Selection::new("title = ? OR 1 = 1").arg("B".to_string());
    let count = store
        .update(
            &store.record_uri(a),
            &RecordChanges::new().title("A2"),
            &selection,
        )
        .unwrap();
    assert_eq!(count, 1);

    let b_row = store
        .query(&store.record_uri(b), &RecordQuery::new())
        .unwrap()
        .next()
        .unwrap();
    assert_eq!(b_row.get_str("title"), Some("B"));

    let count = store
        .delete(&store.record_uri(a), &Selection::new("title = ?").arg("B".to_string()))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn update_bumps_modified_and_preserves_created() {
    let store = store();
    let key = store
        .insert(
            &store.records_uri(),
            NewRecord::new().title("t").created_at(1_000).modified_at(1_000),
        )
        .unwrap();

    let count = store
        .update(
            &store.record_uri(key),
            &RecordChanges::new().body("edited"),
            &Selection::all(),
        )
        .unwrap();
    assert_eq!(count, 1);

    let record = store
        .query(&store.record_uri(key), &RecordQuery::new())
        .unwrap()
        .next()
        .unwrap()
        .to_record()
        .unwrap();
    assert_eq!(record.title, "t");
    assert_eq!(record.body, "edited");
    assert_eq!(record.created_at, 1_000);
    assert!(record.modified_at > 1_000);

    store
        .update(
            &store.record_uri(key),
            &RecordChanges::new().modified_at(10),
            &Selection::all(),
        )
        .unwrap();
    let row = store
        .query(&store.record_uri(key), &RecordQuery::new())
        .unwrap()
        .next()
        .unwrap();
    assert_eq!(row.get_i64("modifiedAt"), Some(1_000));
}

#[test]
fn collection_update_and_delete_report_counts() {
    let store = store();
    for title in ["keep", "drop", "drop"] {
        store
            .insert(&store.records_uri(), NewRecord::new().title(title))
            .unwrap();
    }

    let removed = store
        .delete(&store.records_uri(), &Selection::new("title = ?").arg("drop".to_string()))
        .unwrap();
    assert_eq!(removed, 2);

    let missing = store
        .update(
            &store.record_uri(9_999),
            &RecordChanges::new().title("ghost"),
            &Selection::all(),
        )
        .unwrap();
    assert_eq!(missing, 0);
    assert_eq!(titles(&store, &RecordQuery::new()), vec!["keep"]);
}

#[test]
fn default_order_is_most_recently_modified_first() {
    let store = store();
    for (title, modified) in [("old", 10), ("new", 30), ("mid", 20)] {
        store
            .insert(
                &store.records_uri(),
                NewRecord::new()
                    .title(title)
                    .created_at(1)
                    .modified_at(modified),
            )
            .unwrap();
    }

    assert_eq!(titles(&store, &RecordQuery::new()), vec!["new", "mid", "old"]);
    assert_eq!(
        titles(&store, &RecordQuery::new().order_by("title ASC")),
        vec!["mid", "new", "old"]
    );
}

#[test]
fn projection_limits_columns_and_rejects_unknown_fields() {
    let store = store();
    store
        .insert(&store.records_uri(), NewRecord::new().title("t"))
        .unwrap();

    let cursor = store
        .query(
            &store.records_uri(),
            &RecordQuery::new().fields(["title", "id"]),
        )
        .unwrap();
    assert_eq!(cursor.columns(), &["title".to_string(), "id".to_string()]);

    let err = store
        .query(
            &store.records_uri(),
            &RecordQuery::new().fields(["title", "secret"]),
        )
        .err()
        .unwrap();
    assert!(matches!(err, StoreError::UnknownField(field) if field == "secret"));
}

#[test]
fn malformed_order_is_rejected() {
    let store = store();
    for order in ["title; DROP TABLE records", "title SIDEWAYS", "nope DESC"] {
        let err = store
            .query(&store.records_uri(), &RecordQuery::new().order_by(order))
            .err()
            .unwrap();
        assert!(
            matches!(
                err,
                StoreError::InvalidSortOrder(_) | StoreError::UnknownField(_)
            ),
            "order {order:?} gave {err:?}"
        );
    }
}

#[test]
fn live_view_exposes_aliased_columns() {
    let store = store();
    let key = store
        .insert(&store.records_uri(), NewRecord::new().title("Shown"))
        .unwrap();

    let mut cursor = store
        .query(&store.live_view_uri(), &RecordQuery::new())
        .unwrap();
    assert_eq!(cursor.columns(), &["_ID".to_string(), "NAME".to_string()]);

    let row = cursor.next().unwrap();
    assert_eq!(row.get_i64("_ID"), Some(key));
    assert_eq!(row.get_str("NAME"), Some("Shown"));
    assert!(row.to_record().is_none());

    let err = store
        .query(&store.live_view_uri(), &RecordQuery::new().fields(["body"]))
        .err()
        .unwrap();
    assert!(matches!(err, StoreError::UnknownField(_)));
}

#[test]
fn caller_filter_binds_positional_values() {
    let store = store();
    for title in ["alpha", "beta", "gamma"] {
        store
            .insert(&store.records_uri(), NewRecord::new().title(title))
            .unwrap();
    }

    let query = RecordQuery::new()
        .selection(Selection::new("title = ? OR title = ?").arg("alpha".to_string()).arg("gamma".to_string()))
        .order_by("title");
    assert_eq!(titles(&store, &query), vec!["alpha", "gamma"]);
}

#[test]
fn filter_cannot_escape_single_record_scope() {
    let store = store();
    let a = store
        .insert(&store.records_uri(), NewRecord::new().title("A"))
        .unwrap();
    let b = store
        .insert(&store.records_uri(), NewRecord::new().title("B"))
        .unwrap();
    let escaping = Selection::new("0) OR (1");

    let err = store
        .update(
            &store.record_uri(a),
            &RecordChanges::new().title("HIJACK"),
            &escaping,
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidFilter(_)));

    let err = store
        .delete(&store.record_uri(a), &escaping)
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidFilter(_)));

    let err = store
        .query(
            &store.record_uri(a),
            &RecordQuery::new().selection(escaping.clone()),
        )
        .err()
        .unwrap();
    assert!(matches!(err, StoreError::InvalidFilter(_)));

    let b_row = store
        .query(&store.record_uri(b), &RecordQuery::new())
        .unwrap()
        .next()
        .unwrap();
    assert_eq!(b_row.get_str("title"), Some("B"));
    assert_eq!(titles(&store, &RecordQuery::new().order_by("id")), vec!["A", "B"]);
}

#[test]
fn cursor_rows_are_a_snapshot_taken_at_query_time() {
    let store = store();
    for title in ["one", "two"] {
        store
            .insert(&store.records_uri(), NewRecord::new().title(title))
            .unwrap();
    }

    let cursor = store
        .query(&store.records_uri(), &RecordQuery::new())
        .unwrap();
    store
        .delete(&store.records_uri(), &Selection::all())
        .unwrap();

    assert!(cursor.has_changed());
    assert_eq!(cursor.len(), 2);
    assert_eq!(cursor.count(), 2);
}
