//! Soft-delete lifecycle: trash, restore, purge.
//!
//! # Responsibility
//! - Move records between the active and trashed states.
//! - Permanently remove trashed records, singly or in bulk.
//!
//! # Invariants
//! - Lookups by id are collection-scoped, not user-scoped; callers authorize.
//! - A missing id returns `Ok(false)` and leaves the document unwritten.
//! - Restore removes both trash keys; it never writes `false`/`null`.
//! - Bulk purge is per-record; a failure midway leaves earlier removals saved.

use crate::model::collection::CollectionName;
use crate::model::record::Record;
use crate::repo::document_store::{DocumentRepository, StoreResult};
use log::{info, warn};
use serde::Serialize;

/// Trashed record counts per collection for one user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrashCounts {
    pub clients: usize,
    pub invoices: usize,
    pub products: usize,
    pub categories: usize,
}

impl TrashCounts {
    pub fn get(&self, collection: CollectionName) -> usize {
        match collection {
            CollectionName::Clients => self.clients,
            CollectionName::Invoices => self.invoices,
            CollectionName::Products => self.products,
            CollectionName::Categories => self.categories,
        }
    }

    pub fn total(&self) -> usize {
        self.clients + self.invoices + self.products + self.categories
    }
}

/// Outcome of emptying one collection's trash.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PurgeReport {
    /// Trashed records found when the purge started.
    pub requested: usize,
    /// `permanent_delete` calls that returned `Ok(true)`.
    pub purged: usize,
    /// Calls that returned an error.
    pub failed: usize,
}

/// Trash lifecycle service.
pub struct TrashService<R: DocumentRepository> {
    repo: R,
}

impl<R: DocumentRepository> TrashService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Soft-deletes the first record with `id`, stamping `deletedAt` with now.
    ///
    /// Trashing an already trashed record re-stamps `deletedAt`.
    pub fn move_to_trash(&self, collection: CollectionName, id: &str) -> StoreResult<bool> {
        let timestamp = self.repo.timestamp();
        let moved = self
            .repo
            .modify(|doc| {
                doc.records_mut(collection)
                    .trash_state_mut(id)
                    .map(|state| state.mark_trashed(timestamp))
            })?
            .is_some();

        log_outcome("trash_move", collection, id, moved);
        Ok(moved)
    }

    /// Returns a trashed record to the active set by dropping both trash keys.
    pub fn restore_from_trash(&self, collection: CollectionName, id: &str) -> StoreResult<bool> {
        let restored = self
            .repo
            .modify(|doc| {
                doc.records_mut(collection)
                    .trash_state_mut(id)
                    .map(|state| state.clear())
            })?
            .is_some();

        log_outcome("trash_restore", collection, id, restored);
        Ok(restored)
    }

    /// Removes the first record with `id` from its collection. Irreversible.
    pub fn permanent_delete(&self, collection: CollectionName, id: &str) -> StoreResult<bool> {
        let removed = self
            .repo
            .modify(|doc| doc.records_mut(collection).remove_by_id(id).then_some(()))?
            .is_some();

        log_outcome("trash_purge", collection, id, removed);
        Ok(removed)
    }

    /// Trashed records of `user_id` in `collection`, insertion order.
    pub fn trash_items(
        &self,
        user_id: &str,
        collection: CollectionName,
    ) -> StoreResult<Vec<Record>> {
        let doc = self.repo.load()?;
        Ok(doc.records(collection).trashed_for(user_id))
    }

    pub fn trash_counts(&self, user_id: &str) -> StoreResult<TrashCounts> {
        let doc = self.repo.load()?;
        let count = |collection| doc.records(collection).trashed_for(user_id).len();
        Ok(TrashCounts {
            clients: count(CollectionName::Clients),
            invoices: count(CollectionName::Invoices),
            products: count(CollectionName::Products),
            categories: count(CollectionName::Categories),
        })
    }

    /// Permanently deletes every trashed record of `user_id` in `collection`.
    ///
    /// Each record is its own load-delete-save; failures are counted and the
    /// purge moves on to the next record.
    pub fn empty_trash(
        &self,
        user_id: &str,
        collection: CollectionName,
    ) -> StoreResult<PurgeReport> {
        let items = self.trash_items(user_id, collection)?;
        let mut report = PurgeReport {
            requested: items.len(),
            ..PurgeReport::default()
        };

        for item in &items {
            match self.permanent_delete(collection, item.id()) {
                Ok(true) => report.purged += 1,
                Ok(false) => {}
                Err(err) => {
                    report.failed += 1;
                    warn!(
                        "event=trash_empty module=trash status=partial collection={} id={} error={}",
                        collection,
                        item.id(),
                        err
                    );
                }
            }
        }

        info!(
            "event=trash_empty module=trash status=ok collection={} requested={} purged={} failed={}",
            collection, report.requested, report.purged, report.failed
        );
        Ok(report)
    }
}

fn log_outcome(event: &str, collection: CollectionName, id: &str, applied: bool) {
    if applied {
        info!("event={event} module=trash status=ok collection={collection} id={id}");
    } else {
        info!("event={event} module=trash status=not_found collection={collection} id={id}");
    }
}
