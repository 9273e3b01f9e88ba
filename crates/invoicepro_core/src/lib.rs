//! Core of the InvoicePro local store.
//! Owns the persisted document, user-scoped reads and the trash lifecycle.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod storage;

pub use clock::{format_timestamp, Clock, SystemClock};
pub use config::StoreConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::activity::{Activity, NewActivity};
pub use model::collection::{CollectionName, UnknownCollection};
pub use model::document::{AppSettings, Document, RecordList, User, UserSettings, DEMO_USER_ID};
pub use model::record::{
    Category, Client, Invoice, InvoiceStatus, Product, Record, TrashState, TrashableRecord,
};
pub use repo::document_store::{DocumentRepository, DocumentStore, StoreError, StoreResult};
pub use service::activity_service::ActivityService;
pub use service::collection_service::{CollectionService, DashboardStats};
pub use service::trash_service::{PurgeReport, TrashCounts, TrashService};
pub use storage::{MemorySlotStorage, SlotStorage, SqliteSlotStorage, StorageError, StorageResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
