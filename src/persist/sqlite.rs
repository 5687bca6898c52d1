//! SQLite-backed key-value slot for the serialized journal.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use crate::core::normalize::now_ms;

use super::{PersistResult, STORAGE_KEY, StorageBackend};

/// SQLite implementation of [`crate::persist::StorageBackend`].
pub struct SqliteBackend {
    conn: Connection,
    key: String,
}

impl SqliteBackend {
    /// Opens or creates a SQLite-backed slot at `path` under [`STORAGE_KEY`].
    ///
    /// Enables WAL mode and sets `synchronous=NORMAL`.
    pub fn open(path: impl AsRef<Path>) -> PersistResult<Self> {
        let conn = Connection::open(path)?;
        Self::init_connection(conn)
    }

    /// Opens an in-memory SQLite slot.
    pub fn open_in_memory() -> PersistResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_connection(conn)
    }

    /// Uses `key` instead of [`STORAGE_KEY`].
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    fn init_connection(conn: Connection) -> PersistResult<Self> {
        conn.execute_batch(include_str!("schema.sql"))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        Ok(Self {
            conn,
            key: STORAGE_KEY.to_string(),
        })
    }

    /// Stores raw bytes under the slot key, bypassing the journal.
    pub fn put_raw(&mut self, bytes: &[u8]) -> PersistResult<()> {
        self.conn.execute(
            "INSERT INTO kv(key, value, updated_ms) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_ms = excluded.updated_ms",
            params![self.key, bytes, now_ms() as i64],
        )?;
        Ok(())
    }

    /// Last write time of the slot, if it was ever written.
    pub fn updated_ms(&self) -> PersistResult<Option<u64>> {
        let ts: Option<i64> = self
            .conn
            .query_row(
                "SELECT updated_ms FROM kv WHERE key = ?1",
                params![self.key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(ts.map(|v| v as u64))
    }
}

impl StorageBackend for SqliteBackend {
    fn load(&self) -> PersistResult<Option<Vec<u8>>> {
        let value: Option<Vec<u8>> = self
            .conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![self.key],
                |row| row.get(0),
            )
            .optional()?;
        debug!(key = %self.key, found = value.is_some(), "sqlite slot read");
        Ok(value)
    }

    fn save(&mut self, bytes: &[u8]) -> PersistResult<()> {
        self.put_raw(bytes)?;
        debug!(key = %self.key, bytes = bytes.len(), "sqlite slot written");
        Ok(())
    }
}
