//! Document root and collection-generic record access.
//!
//! # Responsibility
//! - Model the single persisted document with its contractual keys.
//! - Build the seed document written on first access.
//! - Expose every trashable collection behind one `RecordList` seam.
//!
//! # Invariants
//! - Record lookups by id return the first match in insertion order.
//! - Removing a record keeps the relative order of the remaining ones.

use crate::model::activity::Activity;
use crate::model::collection::CollectionName;
use crate::model::record::{Category, Client, Invoice, Product, Record, TrashState, TrashableRecord};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEMO_USER_ID: &str = "USR-1001";

/// The whole database: one value, rewritten wholesale on every save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub version: String,
    pub last_updated: String,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub invoices: Vec<Invoice>,
    #[serde(default)]
    pub clients: Vec<Client>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub settings: AppSettings,
    /// Top-level keys owned by other screens, such as `savedCategories`.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Document {
    /// First-run document: one active demo user, empty collections.
    pub fn seed(version: impl Into<String>, timestamp: &str) -> Self {
        Self {
            version: version.into(),
            last_updated: timestamp.to_string(),
            users: vec![User::demo(timestamp)],
            invoices: Vec::new(),
            clients: Vec::new(),
            products: Vec::new(),
            categories: Vec::new(),
            activities: Vec::new(),
            settings: AppSettings::default(),
            extra: Map::new(),
        }
    }

    pub fn records(&self, collection: CollectionName) -> &dyn RecordList {
        match collection {
            CollectionName::Clients => &self.clients,
            CollectionName::Invoices => &self.invoices,
            CollectionName::Products => &self.products,
            CollectionName::Categories => &self.categories,
        }
    }

    pub fn records_mut(&mut self, collection: CollectionName) -> &mut dyn RecordList {
        match collection {
            CollectionName::Clients => &mut self.clients,
            CollectionName::Invoices => &mut self.invoices,
            CollectionName::Products => &mut self.products,
            CollectionName::Categories => &mut self.categories,
        }
    }

    pub fn find_user(&self, user_id: &str) -> Option<&User> {
        self.users
            .iter()
            .find(|user| user.id == user_id && user.is_active)
    }
}

/// Object-safe view over one trashable collection.
pub trait RecordList {
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn contains_id(&self, id: &str) -> bool;
    /// Owned by `user_id` and not trashed, insertion order.
    fn active_for(&self, user_id: &str) -> Vec<Record>;
    /// Owned by `user_id` and trashed (`isDeleted == true`), insertion order.
    fn trashed_for(&self, user_id: &str) -> Vec<Record>;
    /// Trash markers of the first record with `id`, regardless of owner.
    fn trash_state_mut(&mut self, id: &str) -> Option<&mut TrashState>;
    /// Removes the first record with `id`; returns whether one was removed.
    fn remove_by_id(&mut self, id: &str) -> bool;
}

impl<T: TrashableRecord> RecordList for Vec<T> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn contains_id(&self, id: &str) -> bool {
        self.iter().any(|record| record.id() == id)
    }

    fn active_for(&self, user_id: &str) -> Vec<Record> {
        self.iter()
            .filter(|record| record.is_active_for(user_id))
            .cloned()
            .map(TrashableRecord::into_record)
            .collect()
    }

    fn trashed_for(&self, user_id: &str) -> Vec<Record> {
        self.iter()
            .filter(|record| record.is_trashed_for(user_id))
            .cloned()
            .map(TrashableRecord::into_record)
            .collect()
    }

    fn trash_state_mut(&mut self, id: &str) -> Option<&mut TrashState> {
        self.iter_mut()
            .find(|record| record.id() == id)
            .map(TrashableRecord::trash_state_mut)
    }

    fn remove_by_id(&mut self, id: &str) -> bool {
        match self.iter().position(|record| record.id() == id) {
            Some(index) => {
                self.remove(index);
                true
            }
            None => false,
        }
    }
}

/// Application user. Credentials are owned by the external auth component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub settings: UserSettings,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    fn demo(timestamp: &str) -> Self {
        Self {
            id: DEMO_USER_ID.to_string(),
            name: "Demo User".to_string(),
            email: "demo@invoice.com".to_string(),
            company: Some("Demo Company".to_string()),
            role: Some("admin".to_string()),
            created_at: Some(timestamp.to_string()),
            last_login: Some(timestamp.to_string()),
            is_active: true,
            settings: UserSettings::default(),
            extra: Map::new(),
        }
    }
}

/// Per-user preferences. Missing members fall back to the defaults; nested
/// groups like `company` or `invoice` stay in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSettings {
    pub currency: String,
    pub tax_rate: f64,
    pub language: String,
    pub timezone: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            currency: "৳".to_string(),
            tax_rate: 5.0,
            language: "en".to_string(),
            timezone: "Asia/Dhaka".to_string(),
            extra: Map::new(),
        }
    }
}

/// Installation-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub app_name: String,
    pub default_currency: String,
    pub default_tax_rate: f64,
    pub date_format: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            app_name: "InvoicePro".to_string(),
            default_currency: "৳".to_string(),
            default_tax_rate: 5.0,
            date_format: "DD/MM/YYYY".to_string(),
            extra: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Document, RecordList, DEMO_USER_ID};
    use crate::model::collection::CollectionName;
    use crate::model::record::Client;
    use serde_json::json;

    const TS: &str = "2024-05-01T10:00:00.000Z";

    #[test]
    fn seed_has_demo_user_and_empty_collections() {
        let doc = Document::seed("3.1.0", TS);
        assert_eq!(doc.version, "3.1.0");
        assert_eq!(doc.last_updated, TS);
        assert!(doc.find_user(DEMO_USER_ID).is_some());
        for name in CollectionName::ALL {
            assert!(doc.records(name).is_empty());
        }
        assert!(doc.activities.is_empty());
    }

    #[test]
    fn serializes_contractual_keys() {
        let value = serde_json::to_value(Document::seed("3.1.0", TS)).unwrap();
        for key in [
            "version",
            "lastUpdated",
            "users",
            "clients",
            "invoices",
            "products",
            "categories",
            "activities",
            "settings",
        ] {
            assert!(value.get(key).is_some(), "missing key {key}");
        }
        assert_eq!(value["settings"]["appName"], json!("InvoicePro"));
        assert_eq!(value["users"][0]["settings"]["timezone"], json!("Asia/Dhaka"));
    }

    #[test]
    fn missing_collections_default_to_empty() {
        let doc: Document = serde_json::from_value(json!({
            "version": "3.0.0",
            "lastUpdated": TS,
            "clients": [{ "id": "C1", "userId": "U1", "name": "Acme" }]
        }))
        .unwrap();
        assert_eq!(doc.clients.len(), 1);
        assert!(doc.products.is_empty());
        assert_eq!(doc.settings.app_name, "InvoicePro");
    }

    #[test]
    fn partial_settings_fill_in_defaults() {
        let doc: Document = serde_json::from_value(json!({
            "version": "3.0.0",
            "lastUpdated": TS,
            "users": [{
                "id": "U1",
                "isActive": true,
                "settings": { "currency": "$", "prefs": { "compact": true } }
            }],
            "settings": { "appName": "Shop" }
        }))
        .unwrap();
        assert_eq!(doc.settings.app_name, "Shop");
        assert_eq!(doc.settings.date_format, "DD/MM/YYYY");

        let settings = &doc.users[0].settings;
        assert_eq!(settings.currency, "$");
        assert_eq!(settings.tax_rate, 5.0);
        assert_eq!(settings.extra.get("prefs"), Some(&json!({ "compact": true })));
    }

    #[test]
    fn unknown_top_level_keys_round_trip() {
        let mut doc = Document::seed("3.1.0", TS);
        doc.extra
            .insert("savedCategories".to_string(), json!({ "U1": ["Custom"] }));
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["savedCategories"], json!({ "U1": ["Custom"] }));

        let back: Document = serde_json::from_value(value).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn remove_by_id_keeps_relative_order() {
        let mut clients = vec![
            Client::new("C1", "U1", "a"),
            Client::new("C2", "U1", "b"),
            Client::new("C3", "U1", "c"),
        ];
        assert!(clients.remove_by_id("C2"));
        assert!(!clients.remove_by_id("C2"));
        let ids: Vec<&str> = clients.iter().map(|client| client.id.as_str()).collect();
        assert_eq!(ids, vec!["C1", "C3"]);
    }

    #[test]
    fn trash_state_lookup_is_not_user_scoped() {
        let mut doc = Document::seed("3.1.0", TS);
        doc.clients.push(Client::new("C1", "someone-else", "Acme"));
        assert!(doc
            .records_mut(CollectionName::Clients)
            .trash_state_mut("C1")
            .is_some());
    }
}
