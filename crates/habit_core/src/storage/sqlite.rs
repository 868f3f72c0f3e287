//! Durable key-value backend over the `kv_entries` SQLite table.
//!
//! # Invariants
//! - One row per key; writes upsert and refresh `updated_at`.
//! - Quota accounting uses UTF-8 byte length of key plus value.

use super::{entry_size, KvBackend, StorageError, StorageResult};
use crate::db::{open_db, open_db_in_memory, DbResult};
use log::warn;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

pub struct SqliteBackend {
    conn: Connection,
    quota_bytes: Option<u64>,
}

impl SqliteBackend {
    /// Wraps a connection that already went through `open_db*`.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            quota_bytes: None,
        }
    }

    /// Opens (or creates) a database file and applies migrations.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    /// Rejects writes that would grow stored bytes past `quota_bytes`.
    pub fn with_quota(mut self, quota_bytes: u64) -> Self {
        self.quota_bytes = Some(quota_bytes);
        self
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn stored_bytes_excluding(&self, key: &str) -> StorageResult<u64> {
        let bytes: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(length(CAST(key AS BLOB)) + length(CAST(value AS BLOB))), 0)
             FROM kv_entries
             WHERE key <> ?1;",
            [key],
            |row| row.get(0),
        )?;
        Ok(u64::try_from(bytes).unwrap_or(0))
    }
}

impl KvBackend for SqliteBackend {
    fn is_available(&self) -> bool {
        match self
            .conn
            .query_row("SELECT 1 FROM kv_entries LIMIT 1;", [], |row| {
                row.get::<_, i64>(0)
            })
            .optional()
        {
            Ok(_) => true,
            Err(err) => {
                warn!("event=kv_check module=storage status=error backend=sqlite error={err}");
                false
            }
        }
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        if let Some(quota_bytes) = self.quota_bytes {
            let required_bytes = self.stored_bytes_excluding(key)? + entry_size(key, value);
            if required_bytes > quota_bytes {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    required_bytes,
                    quota_bytes,
                });
            }
        }

        self.conn.execute(
            "INSERT INTO kv_entries (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(())
    }
}
