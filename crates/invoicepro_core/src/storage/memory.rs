//! In-process slot backend.

use super::{SlotStorage, StorageError, StorageResult};
use std::cell::RefCell;
use std::collections::HashMap;

/// Map-backed slots with an optional total byte quota.
///
/// The quota counts the byte length of every stored value, the way a browser
/// origin quota does. Not `Sync`: one store, one thread.
#[derive(Debug, Default)]
pub struct MemorySlotStorage {
    slots: RefCell<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemorySlotStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend rejecting writes that push total usage past `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            slots: RefCell::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Total bytes currently stored across all slots.
    pub fn used_bytes(&self) -> usize {
        self.slots.borrow().values().map(String::len).sum()
    }
}

impl SlotStorage for MemorySlotStorage {
    fn read_slot(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn write_slot(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut slots = self.slots.borrow_mut();
        if let Some(limit_bytes) = self.quota_bytes {
            let others: usize = slots
                .iter()
                .filter(|(existing, _)| existing.as_str() != key)
                .map(|(_, stored)| stored.len())
                .sum();
            let requested_bytes = others + value.len();
            if requested_bytes > limit_bytes {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    limit_bytes,
                    requested_bytes,
                });
            }
        }

        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear_slot(&self, key: &str) -> StorageResult<()> {
        self.slots.borrow_mut().remove(key);
        Ok(())
    }
}
