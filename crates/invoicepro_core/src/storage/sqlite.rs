//! SQLite-backed slot storage.
//!
//! # Invariants
//! - Each slot is one row in `kv_slots`, upserted on write.
//! - Connections come from `db::open_*`, so the table always exists.

use super::{SlotStorage, StorageResult};
use crate::db::{open_db, open_db_in_memory};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Slot backend persisting to a local SQLite file.
pub struct SqliteSlotStorage {
    conn: Connection,
}

impl SqliteSlotStorage {
    /// Opens the slot database at `path`, creating and migrating it if needed.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Ok(Self {
            conn: open_db(path)?,
        })
    }

    pub fn open_in_memory() -> StorageResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
        })
    }

    /// Wraps a connection already returned by `db::open_db*`.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }
}

impl SlotStorage for SqliteSlotStorage {
    fn read_slot(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_slots WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write_slot(&self, key: &str, value: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO kv_slots (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }

    fn clear_slot(&self, key: &str) -> StorageResult<()> {
        self.conn.execute("DELETE FROM kv_slots WHERE key = ?1;", [key])?;
        Ok(())
    }
}
