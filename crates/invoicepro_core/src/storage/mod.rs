//! Key-value slot backends for the document store.
//!
//! # Responsibility
//! - Define the persistence seam the document store writes through.
//! - Provide an in-memory backend and a SQLite-backed backend.
//!
//! # Invariants
//! - A slot holds one whole serialized value; writes replace, never merge.
//! - A rejected write leaves the previous slot value untouched.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
mod sqlite;

pub use memory::MemorySlotStorage;
pub use sqlite::SqliteSlotStorage;

pub type StorageResult<T> = Result<T, StorageError>;

/// Failure reported by a slot backend.
#[derive(Debug)]
pub enum StorageError {
    /// The write would exceed the backend byte quota.
    QuotaExceeded {
        key: String,
        limit_bytes: usize,
        requested_bytes: usize,
    },
    /// SQLite transport failure.
    Sqlite(rusqlite::Error),
    /// The slot database was written by a newer build.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Backend refused the operation for another reason.
    Unavailable(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::QuotaExceeded {
                key,
                limit_bytes,
                requested_bytes,
            } => write!(
                f,
                "storage quota exceeded writing `{key}`: {requested_bytes} bytes requested, limit {limit_bytes}"
            ),
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "slot database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::Unavailable(message) => write!(f, "storage unavailable: {message}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::QuotaExceeded { .. }
            | Self::UnsupportedSchemaVersion { .. }
            | Self::Unavailable(_) => None,
        }
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Persistence seam holding named string slots.
pub trait SlotStorage {
    /// Returns the slot value, or `None` when the slot was never written.
    fn read_slot(&self, key: &str) -> StorageResult<Option<String>>;
    /// Replaces the slot value wholesale.
    fn write_slot(&self, key: &str, value: &str) -> StorageResult<()>;
    /// Removes the slot. Clearing an absent slot is not an error.
    fn clear_slot(&self, key: &str) -> StorageResult<()>;
}

impl<T: SlotStorage + ?Sized> SlotStorage for &T {
    fn read_slot(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).read_slot(key)
    }

    fn write_slot(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).write_slot(key, value)
    }

    fn clear_slot(&self, key: &str) -> StorageResult<()> {
        (**self).clear_slot(key)
    }
}

impl<T: SlotStorage + ?Sized> SlotStorage for Box<T> {
    fn read_slot(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).read_slot(key)
    }

    fn write_slot(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).write_slot(key, value)
    }

    fn clear_slot(&self, key: &str) -> StorageResult<()> {
        (**self).clear_slot(key)
    }
}
