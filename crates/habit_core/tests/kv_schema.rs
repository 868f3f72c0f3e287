use habit_core::db::migrations::latest_version;
use habit_core::db::{open_db, open_db_in_memory, DbError};
use habit_core::{KvBackend, SqliteBackend};
use rusqlite::{params, Connection};

fn user_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn stored_row(conn: &Connection, key: &str) -> (String, i64) {
    conn.query_row(
        "SELECT value, updated_at FROM kv_entries WHERE key = ?1;",
        [key],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .unwrap()
}

#[test]
fn fresh_database_gets_kv_columns_at_latest_version() {
    let conn = open_db_in_memory().unwrap();
    assert_eq!(user_version(&conn), latest_version());

    let mut stmt = conn
        .prepare("SELECT name, pk FROM pragma_table_info('kv_entries') ORDER BY cid;")
        .unwrap();
    let columns: Vec<(String, i64)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(
        columns,
        vec![
            ("key".to_string(), 1),
            ("value".to_string(), 0),
            ("updated_at".to_string(), 0),
        ]
    );
}

#[test]
fn insert_stamps_updated_at_by_default() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO kv_entries (key, value) VALUES ('userName', 'Ada');",
        [],
    )
    .unwrap();

    let (value, updated_at) = stored_row(&conn, "userName");
    assert_eq!(value, "Ada");
    assert!(updated_at > 0);
}

#[test]
fn upsert_replaces_value_and_refreshes_updated_at() {
    let backend = SqliteBackend::new(open_db_in_memory().unwrap());
    backend.set("habitCompletions", r#"{"2024-01-01":["h1"]}"#).unwrap();
    backend
        .connection()
        .execute(
            "UPDATE kv_entries SET updated_at = 0 WHERE key = ?1;",
            ["habitCompletions"],
        )
        .unwrap();

    backend.set("habitCompletions", "{}").unwrap();

    let (value, updated_at) = stored_row(backend.connection(), "habitCompletions");
    assert_eq!(value, "{}");
    assert!(updated_at > 0, "upsert left updated_at at {updated_at}");
    let rows: i64 = backend
        .connection()
        .query_row("SELECT COUNT(*) FROM kv_entries;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn plain_insert_of_existing_key_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let insert = "INSERT INTO kv_entries (key, value) VALUES (?1, ?2);";
    conn.execute(insert, params!["moodEntries", "{}"]).unwrap();

    assert!(conn.execute(insert, params!["moodEntries", "[]"]).is_err());
    assert_eq!(stored_row(&conn, "moodEntries").0, "{}");
}

#[test]
fn entries_written_through_backend_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("habits.sqlite3");

    let backend = SqliteBackend::open(&path).unwrap();
    backend.set("userHabits", r#"[{"id":"h1"}]"#).unwrap();
    backend.set("userName", "Ada").unwrap();
    backend.remove("userName").unwrap();
    drop(backend);

    let conn = open_db(&path).unwrap();
    assert_eq!(user_version(&conn), latest_version());
    assert_eq!(stored_row(&conn, "userHabits").0, r#"[{"id":"h1"}]"#);
    let remaining: i64 = conn
        .query_row("SELECT COUNT(*) FROM kv_entries;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(remaining, 1);
}

#[test]
fn file_from_newer_build_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");
    Connection::open(&path)
        .unwrap()
        .execute_batch("PRAGMA user_version = 42;")
        .unwrap();

    let err = SqliteBackend::open(&path).err().unwrap();
    assert!(matches!(
        err,
        DbError::UnsupportedSchemaVersion { db_version: 42, latest_supported }
            if latest_supported == latest_version()
    ));
}
