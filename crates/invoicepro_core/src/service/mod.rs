//! Use-case services over the document repository.
//!
//! # Responsibility
//! - Scope reads by owning user and hide trashed records from active readers.
//! - Drive the active -> trashed -> {active, purged} record lifecycle.
//! - Append and read the bounded activity log.
//!
//! # Invariants
//! - Every mutation is one load-mutate-save through `DocumentRepository`.
//! - Aggregates are computed from the active-record readers only.

pub mod activity_service;
pub mod collection_service;
pub mod trash_service;
