use peptidecalc_core::db::migrations::latest_version;
use peptidecalc_core::db::{open_db, open_db_in_memory, DbError};
use peptidecalc_core::{KeyValueStore, KvError, SqliteKeyValueStore};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "kv_entries");
}

#[test]
fn reopening_file_keeps_stored_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("peptidecalc.sqlite3");

    {
        let conn = open_db(&path).unwrap();
        let store = SqliteKeyValueStore::try_new(&conn).unwrap();
        store.set_item("savedPeptides", "[]").unwrap();
    }

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    let store = SqliteKeyValueStore::try_new(&conn).unwrap();
    assert_eq!(
        store.get_item("savedPeptides").unwrap().as_deref(),
        Some("[]")
    );
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn kv_store_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteKeyValueStore::try_new(&conn).err().unwrap();
    assert!(matches!(
        err,
        KvError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
}

#[test]
fn kv_store_upserts_and_removes() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteKeyValueStore::try_new(&conn).unwrap();

    assert_eq!(store.get_item("k").unwrap(), None);
    store.set_item("k", "first").unwrap();
    store.set_item("k", "second").unwrap();
    assert_eq!(store.get_item("k").unwrap().as_deref(), Some("second"));

    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM kv_entries;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);

    store.remove_item("k").unwrap();
    assert_eq!(store.get_item("k").unwrap(), None);
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
