//! User-scoped, trash-aware readers.
//!
//! # Invariants
//! - Results never include a record with `isDeleted == true`.
//! - Results keep the insertion order of the underlying collection.

use crate::model::collection::CollectionName;
use crate::model::document::Document;
use crate::model::record::{
    Category, Client, Invoice, InvoiceStatus, Product, Record, TrashableRecord,
};
use crate::repo::document_store::{DocumentRepository, StoreResult};
use log::error;
use serde::Serialize;

/// Headline numbers for one user's dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_clients: usize,
    pub total_invoices: usize,
    pub total_products: usize,
    /// Sum of pending invoice totals.
    pub total_outstanding: f64,
    pub paid_invoices: usize,
    pub pending_invoices: usize,
}

/// Read-side service for active records.
pub struct CollectionService<R: DocumentRepository> {
    repo: R,
}

impl<R: DocumentRepository> CollectionService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Active records of `user_id` in `collection`.
    pub fn user_collection(
        &self,
        collection: CollectionName,
        user_id: &str,
    ) -> StoreResult<Vec<Record>> {
        let doc = self.repo.load()?;
        Ok(doc.records(collection).active_for(user_id))
    }

    /// Same as `user_collection`, for callers holding a collection name string.
    pub fn user_collection_named(
        &self,
        collection: &str,
        user_id: &str,
    ) -> StoreResult<Vec<Record>> {
        let collection = collection.parse::<CollectionName>().map_err(|err| {
            error!("event=collection_read module=collection status=error error={err}");
            err
        })?;
        self.user_collection(collection, user_id)
    }

    pub fn user_clients(&self, user_id: &str) -> StoreResult<Vec<Client>> {
        self.active_typed(user_id, |doc| doc.clients)
    }

    pub fn user_invoices(&self, user_id: &str) -> StoreResult<Vec<Invoice>> {
        self.active_typed(user_id, |doc| doc.invoices)
    }

    pub fn user_products(&self, user_id: &str) -> StoreResult<Vec<Product>> {
        self.active_typed(user_id, |doc| doc.products)
    }

    pub fn user_categories(&self, user_id: &str) -> StoreResult<Vec<Category>> {
        self.active_typed(user_id, |doc| doc.categories)
    }

    /// One active record of `user_id` by id.
    pub fn find_user_record(
        &self,
        collection: CollectionName,
        user_id: &str,
        id: &str,
    ) -> StoreResult<Option<Record>> {
        Ok(self
            .user_collection(collection, user_id)?
            .into_iter()
            .find(|record| record.id() == id))
    }

    /// Dashboard counters, built only from the active readers above.
    pub fn dashboard_stats(&self, user_id: &str) -> StoreResult<DashboardStats> {
        let invoices = self.user_invoices(user_id)?;
        let clients = self.user_clients(user_id)?;
        let products = self.user_products(user_id)?;

        let pending = invoices
            .iter()
            .filter(|invoice| invoice.has_status(&InvoiceStatus::Pending));

        Ok(DashboardStats {
            total_clients: clients.len(),
            total_invoices: invoices.len(),
            total_products: products.len(),
            total_outstanding: pending.clone().map(Invoice::total_amount).sum(),
            paid_invoices: invoices
                .iter()
                .filter(|invoice| invoice.has_status(&InvoiceStatus::Paid))
                .count(),
            pending_invoices: pending.count(),
        })
    }

    fn active_typed<T: TrashableRecord>(
        &self,
        user_id: &str,
        take: impl FnOnce(Document) -> Vec<T>,
    ) -> StoreResult<Vec<T>> {
        let doc = self.repo.load()?;
        Ok(take(doc)
            .into_iter()
            .filter(|record| record.is_active_for(user_id))
            .collect())
    }
}
