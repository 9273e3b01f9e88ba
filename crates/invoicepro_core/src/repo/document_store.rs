//! Durable load/save of the single JSON document.
//!
//! # Responsibility
//! - Read the document from its slot, seeding it on first access.
//! - Stamp `lastUpdated` and write the whole document back on save.
//!
//! # Invariants
//! - An unparsable slot surfaces as `StoreError::Corrupt` and is never
//!   overwritten implicitly; only `reset` discards it.
//! - A failed save leaves the previously persisted document intact.
//! - Two independent load-mutate-save sequences are last-write-wins.

use crate::clock::{format_timestamp, Clock, SystemClock};
use crate::config::StoreConfig;
use crate::model::collection::UnknownCollection;
use crate::model::document::Document;
use crate::storage::{SlotStorage, StorageError};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure of a document store operation.
#[derive(Debug)]
pub enum StoreError {
    /// Backend read/write failure, e.g. quota exceeded.
    Storage(StorageError),
    /// Document could not be encoded.
    Serialize(serde_json::Error),
    /// Persisted slot holds a value that is not a readable document.
    Corrupt {
        key: String,
        source: serde_json::Error,
    },
    /// Caller named a collection that is not trashable.
    UnknownCollection(UnknownCollection),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Serialize(err) => write!(f, "failed to encode document: {err}"),
            Self::Corrupt { key, source } => {
                write!(f, "persisted document `{key}` is unreadable: {source}")
            }
            Self::UnknownCollection(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Serialize(err) => Some(err),
            Self::Corrupt { source, .. } => Some(source),
            Self::UnknownCollection(err) => Some(err),
        }
    }
}

impl From<StorageError> for StoreError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<UnknownCollection> for StoreError {
    fn from(value: UnknownCollection) -> Self {
        Self::UnknownCollection(value)
    }
}

/// Load/save contract over the persisted document.
pub trait DocumentRepository {
    /// Reads the document, seeding and persisting it when the slot is empty.
    fn load(&self) -> StoreResult<Document>;
    /// Stamps `lastUpdated` and replaces the persisted document.
    fn save(&self, doc: &mut Document) -> StoreResult<()>;
    /// Current time as an ISO-8601 string.
    fn timestamp(&self) -> String;
    fn config(&self) -> &StoreConfig;

    /// Loads, applies `mutate`, and saves only when it returns `Some`.
    ///
    /// `None` means nothing changed; the document is not rewritten.
    fn modify<T>(
        &self,
        mutate: impl FnOnce(&mut Document) -> Option<T>,
    ) -> StoreResult<Option<T>> {
        let mut doc = self.load()?;
        match mutate(&mut doc) {
            Some(value) => {
                self.save(&mut doc)?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }
}

impl<R: DocumentRepository + ?Sized> DocumentRepository for &R {
    fn load(&self) -> StoreResult<Document> {
        (**self).load()
    }

    fn save(&self, doc: &mut Document) -> StoreResult<()> {
        (**self).save(doc)
    }

    fn timestamp(&self) -> String {
        (**self).timestamp()
    }

    fn config(&self) -> &StoreConfig {
        (**self).config()
    }
}

/// Document store over any slot backend.
pub struct DocumentStore<S: SlotStorage> {
    storage: S,
    config: StoreConfig,
    clock: Box<dyn Clock>,
}

impl<S: SlotStorage> DocumentStore<S> {
    pub fn new(storage: S, config: StoreConfig) -> Self {
        Self::with_clock(storage, config, SystemClock)
    }

    pub fn with_clock(storage: S, config: StoreConfig, clock: impl Clock + 'static) -> Self {
        Self {
            storage,
            config,
            clock: Box::new(clock),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Raw slot contents, e.g. to back up an unreadable document before `reset`.
    pub fn read_raw(&self) -> StoreResult<Option<String>> {
        Ok(self.storage.read_slot(&self.config.storage_key)?)
    }

    /// Discards the persisted document; the next `load` reseeds.
    pub fn reset(&self) -> StoreResult<()> {
        self.storage.clear_slot(&self.config.storage_key)?;
        warn!(
            "event=document_reset module=store status=ok key={}",
            self.config.storage_key
        );
        Ok(())
    }

    fn seed(&self) -> StoreResult<Document> {
        let mut doc = Document::seed(self.config.seed_version.as_str(), &self.timestamp());
        self.save(&mut doc)?;
        info!(
            "event=document_seed module=store status=ok key={} version={}",
            self.config.storage_key, doc.version
        );
        Ok(doc)
    }
}

impl<S: SlotStorage> DocumentRepository for DocumentStore<S> {
    fn load(&self) -> StoreResult<Document> {
        let key = self.config.storage_key.as_str();
        let raw = match self.storage.read_slot(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return self.seed(),
            Err(err) => {
                error!("event=document_load module=store status=error key={key} error={err}");
                return Err(err.into());
            }
        };

        match serde_json::from_str::<Document>(&raw) {
            Ok(doc) => {
                debug!(
                    "event=document_load module=store status=ok key={} bytes={}",
                    key,
                    raw.len()
                );
                Ok(doc)
            }
            Err(source) => {
                error!(
                    "event=document_load module=store status=error error_code=document_corrupt key={key} error={source}"
                );
                Err(StoreError::Corrupt {
                    key: key.to_string(),
                    source,
                })
            }
        }
    }

    fn save(&self, doc: &mut Document) -> StoreResult<()> {
        let key = self.config.storage_key.as_str();
        let previous_stamp = std::mem::replace(&mut doc.last_updated, self.timestamp());

        let encoded = match serde_json::to_string(&*doc) {
            Ok(encoded) => encoded,
            Err(err) => {
                doc.last_updated = previous_stamp;
                error!(
                    "event=document_save module=store status=error error_code=encode_failed key={key} error={err}"
                );
                return Err(StoreError::Serialize(err));
            }
        };

        if let Err(err) = self.storage.write_slot(key, &encoded) {
            doc.last_updated = previous_stamp;
            error!(
                "event=document_save module=store status=error error_code=write_failed key={key} error={err}"
            );
            return Err(err.into());
        }

        debug!(
            "event=document_save module=store status=ok key={} bytes={}",
            key,
            encoded.len()
        );
        Ok(())
    }

    fn timestamp(&self) -> String {
        format_timestamp(self.clock.now())
    }

    fn config(&self) -> &StoreConfig {
        &self.config
    }
}
