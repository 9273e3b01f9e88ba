//! Document persistence layer.
//!
//! # Responsibility
//! - Define the load/save contract services run their read-modify-write on.
//! - Isolate slot backends and JSON encoding from service orchestration.
//!
//! # Invariants
//! - Every `load` returns a fresh, independently owned document.
//! - `save` replaces the whole persisted document; there is no merge.

pub mod document_store;
