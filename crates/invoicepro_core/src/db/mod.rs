//! Bootstrap for the SQLite file behind `SqliteSlotStorage`.
//!
//! Opening a connection applies migrations before returning it, so the
//! `kv_slots` table always exists. Failures surface as `StorageError`.

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};
