use chrono::{DateTime, Utc};
use journal_core::db::open_db_in_memory;
use journal_core::{Entry, EntryStore, SqliteEntryStore, StoreError};
use rusqlite::{params, Connection};
use std::collections::HashSet;
use uuid::Uuid;

#[test]
fn create_and_read_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteEntryStore::new(&conn);
    let owner = Uuid::new_v4();

    let entry = Entry::with_id(Uuid::new_v4(), owner, "Monday", "rainy");
    let created = store.create(&entry).unwrap();

    let loaded = store.read(&entry.id.to_string()).unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded.owner_id, owner);
    assert_eq!(loaded.title, "Monday");
    assert_eq!(loaded.content, "rainy");
}

#[test]
fn create_stamps_created_at_ignoring_caller_value() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteEntryStore::new(&conn);

    let mut entry = Entry::with_id(Uuid::new_v4(), Uuid::new_v4(), "t", "c");
    entry.created_at = DateTime::<Utc>::from_timestamp(0, 0).unwrap();
    let created = store.create(&entry).unwrap();

    assert!(created.created_at.timestamp() > 0);
    let loaded = store.read(&entry.id.to_string()).unwrap();
    assert_eq!(loaded.created_at, created.created_at);
}

#[test]
fn create_duplicate_id_fails_with_db_error() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteEntryStore::new(&conn);

    let entry = Entry::with_id(Uuid::new_v4(), Uuid::new_v4(), "t", "c");
    store.create(&entry).unwrap();
    let err = store.create(&entry).unwrap_err();
    assert!(matches!(err, StoreError::Db(_)));
}

#[test]
fn create_rejects_empty_title_and_nil_ids_at_storage_level() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteEntryStore::new(&conn);

    let empty_title = Entry::with_id(Uuid::new_v4(), Uuid::new_v4(), "", "c");
    assert!(matches!(store.create(&empty_title), Err(StoreError::Db(_))));

    let nil_id = Entry::draft(Uuid::new_v4(), "t", "c");
    assert!(matches!(store.create(&nil_id), Err(StoreError::Db(_))));

    let nil_owner = Entry::with_id(Uuid::new_v4(), Uuid::nil(), "t", "c");
    assert!(matches!(store.create(&nil_owner), Err(StoreError::Db(_))));

    assert!(store.list().unwrap().is_empty());
}

#[test]
fn read_missing_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteEntryStore::new(&conn);

    let missing = Uuid::new_v4().to_string();
    let err = store.read(&missing).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(id) if id == missing));
}

#[test]
fn read_malformed_id_returns_invalid_id() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteEntryStore::new(&conn);

    let err = store.read("definitely-not-a-uuid").unwrap_err();
    assert!(matches!(err, StoreError::InvalidId(_)));
    assert!(!err.is_not_found());
}

#[test]
fn read_accepts_uppercase_id_spelling() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteEntryStore::new(&conn);

    let entry = Entry::with_id(Uuid::new_v4(), Uuid::new_v4(), "t", "c");
    store.create(&entry).unwrap();

    let loaded = store
        .read(&entry.id.to_string().to_uppercase())
        .unwrap();
    assert_eq!(loaded.id, entry.id);
}

#[test]
fn update_existing_rewrites_title_and_content_only() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteEntryStore::new(&conn);
    let owner = Uuid::new_v4();

    let created = store
        .create(&Entry::with_id(Uuid::new_v4(), owner, "draft", "first"))
        .unwrap();

    let mut changed = created.clone();
    changed.title = "final".to_string();
    changed.content = "second".to_string();
    changed.owner_id = Uuid::new_v4();
    changed.created_at = DateTime::<Utc>::from_timestamp(1, 0).unwrap();
    store.update(&changed).unwrap();

    let loaded = store.read(&created.id.to_string()).unwrap();
    assert_eq!(loaded.title, "final");
    assert_eq!(loaded.content, "second");
    assert_eq!(loaded.owner_id, owner);
    assert_eq!(loaded.created_at, created.created_at);
}

#[test]
fn update_missing_inserts_row() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteEntryStore::new(&conn);

    let entry = Entry::with_id(Uuid::new_v4(), Uuid::new_v4(), "new", "body");
    store.update(&entry).unwrap();

    let loaded = store.read(&entry.id.to_string()).unwrap();
    assert_eq!(loaded.id, entry.id);
    assert_eq!(loaded.owner_id, entry.owner_id);
    assert_eq!(loaded.title, "new");
    assert_eq!(loaded.content, "body");
}

#[test]
fn delete_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteEntryStore::new(&conn);

    let entry = Entry::with_id(Uuid::new_v4(), Uuid::new_v4(), "t", "c");
    store.create(&entry).unwrap();
    let id = entry.id.to_string();

    store.delete(&id).unwrap();
    store.delete(&id).unwrap();
    store.delete(&Uuid::new_v4().to_string()).unwrap();

    assert!(matches!(store.read(&id), Err(StoreError::NotFound(_))));
}

#[test]
fn delete_malformed_id_returns_invalid_id() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteEntryStore::new(&conn);

    assert!(matches!(
        store.delete("bogus"),
        Err(StoreError::InvalidId(_))
    ));
}

#[test]
fn list_empty_is_ok() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteEntryStore::new(&conn);

    assert!(store.list().unwrap().is_empty());
}

#[test]
fn list_returns_all_owners_newest_first() {
    let conn = open_db_in_memory().unwrap();
    let ids = {
        let store = SqliteEntryStore::new(&conn);
        let mut ids = Vec::new();
        for title in ["t1", "t2", "t3"] {
            let entry = Entry::with_id(Uuid::new_v4(), Uuid::new_v4(), title, "c");
            store.create(&entry).unwrap();
            ids.push(entry.id);
        }
        ids
    };
    set_created_at(&conn, ids[0], 1_000);
    set_created_at(&conn, ids[1], 3_000);
    set_created_at(&conn, ids[2], 2_000);

    let store = SqliteEntryStore::new(&conn);
    let listed = store.list().unwrap();
    let order: Vec<Uuid> = listed.iter().map(|entry| entry.id).collect();
    assert_eq!(order, vec![ids[1], ids[2], ids[0]]);

    let owners: HashSet<Uuid> = listed.iter().map(|entry| entry.owner_id).collect();
    assert_eq!(owners.len(), 3);
}

#[test]
fn list_breaks_created_at_ties_by_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteEntryStore::new(&conn);
    let owner = Uuid::new_v4();

    let mut ids = Vec::new();
    for idx in 0..5 {
        let entry = Entry::with_id(Uuid::new_v4(), owner, format!("t{idx}"), "c");
        store.create(&entry).unwrap();
        ids.push(entry.id);
    }
    conn.execute("UPDATE entries SET created_at = 42;", []).unwrap();

    let listed: Vec<Uuid> = store.list().unwrap().iter().map(|entry| entry.id).collect();
    ids.reverse();
    assert_eq!(listed, ids);
}

#[test]
fn read_rejects_corrupted_rows() {
    let conn = open_db_in_memory().unwrap();
    let id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO entries (id, user_id, title, content, created_at)
         VALUES (?1, 'not-a-uuid', 't', 'c', 0);",
        params![id],
    )
    .unwrap();

    let store = SqliteEntryStore::new(&conn);
    assert!(matches!(store.read(&id), Err(StoreError::InvalidData(_))));
}

fn set_created_at(conn: &Connection, id: Uuid, epoch_ms: i64) {
    conn.execute(
        "UPDATE entries SET created_at = ?1 WHERE id = ?2;",
        params![epoch_ms, id.to_string()],
    )
    .unwrap();
}
