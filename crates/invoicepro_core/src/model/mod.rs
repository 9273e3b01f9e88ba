//! Typed model of the persisted InvoicePro document.
//!
//! # Responsibility
//! - Define the document root, its collections and record shapes.
//! - Own the soft-delete state shared by every trashable record.
//!
//! # Invariants
//! - Field names serialize to the contractual camelCase document keys.
//! - `isDeleted` and `deletedAt` are only mutated together via `TrashState`.
//! - Unknown record fields survive a load/save round-trip.

pub mod activity;
pub mod collection;
pub mod document;
pub mod record;
