//! Store configuration.

/// Slot key the document is persisted under.
pub const DEFAULT_STORAGE_KEY: &str = "InvoiceProDB";
/// Version written into a freshly seeded document.
pub const DEFAULT_SEED_VERSION: &str = "3.1.0";
/// Most recent activities kept in the document.
pub const DEFAULT_ACTIVITY_LIMIT: usize = 100;

/// Tunables for a `DocumentStore`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub storage_key: String,
    pub seed_version: String,
    pub activity_limit: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            seed_version: DEFAULT_SEED_VERSION.to_string(),
            activity_limit: DEFAULT_ACTIVITY_LIMIT,
        }
    }
}

impl StoreConfig {
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn with_seed_version(mut self, version: impl Into<String>) -> Self {
        self.seed_version = version.into();
        self
    }

    /// Sets the activity cap; zero is raised to one so the newest entry survives.
    pub fn with_activity_limit(mut self, limit: usize) -> Self {
        self.activity_limit = limit.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::StoreConfig;

    #[test]
    fn defaults_match_persisted_layout() {
        let config = StoreConfig::default();
        assert_eq!(config.storage_key, "InvoiceProDB");
        assert_eq!(config.seed_version, "3.1.0");
        assert_eq!(config.activity_limit, 100);
    }

    #[test]
    fn activity_limit_is_at_least_one() {
        assert_eq!(StoreConfig::default().with_activity_limit(0).activity_limit, 1);
    }
}
