use chrono::{DateTime, Duration, TimeZone, Utc};
use invoicepro_core::{
    Client, Clock, CollectionName, CollectionService, DocumentRepository, DocumentStore,
    MemorySlotStorage, SlotStorage, StoreConfig, StoreError, StorageError, TrashService,
    DEMO_USER_ID,
};
use serde_json::json;
use std::cell::Cell;

struct StepClock {
    next: Cell<DateTime<Utc>>,
}

impl StepClock {
    fn new() -> Self {
        Self {
            next: Cell::new(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()),
        }
    }
}

impl Clock for StepClock {
    fn now(&self) -> DateTime<Utc> {
        let now = self.next.get();
        self.next.set(now + Duration::seconds(1));
        now
    }
}

fn memory_store() -> DocumentStore<MemorySlotStorage> {
    DocumentStore::with_clock(MemorySlotStorage::new(), StoreConfig::default(), StepClock::new())
}

#[test]
fn first_load_seeds_and_persists_document() {
    let store = memory_store();
    assert!(store.read_raw().unwrap().is_none());

    let doc = store.load().unwrap();
    assert_eq!(doc.version, "3.1.0");
    assert_eq!(doc.users.len(), 1);
    assert_eq!(doc.users[0].id, DEMO_USER_ID);
    assert!(doc.clients.is_empty());
    assert!(doc.invoices.is_empty());
    assert!(doc.products.is_empty());

    let raw = store.read_raw().unwrap().expect("seed should be persisted");
    let persisted: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(persisted["users"][0]["email"], "demo@invoice.com");
    assert_eq!(persisted["lastUpdated"], doc.last_updated.as_str());
}

#[test]
fn load_returns_independent_copies() {
    let store = memory_store();
    let mut first = store.load().unwrap();
    first.clients.push(Client::new("C1", "U1", "Unsaved"));

    let second = store.load().unwrap();
    assert!(second.clients.is_empty());
}

#[test]
fn save_stamps_last_updated_and_replaces_document() {
    let store = memory_store();
    let mut doc = store.load().unwrap();
    let seeded_stamp = doc.last_updated.clone();

    doc.clients.push(Client::new("C1", "U1", "Acme"));
    store.save(&mut doc).unwrap();
    assert_ne!(doc.last_updated, seeded_stamp);

    let reloaded = store.load().unwrap();
    assert_eq!(reloaded, doc);
}

#[test]
fn later_save_of_stale_copy_wins() {
    let store = memory_store();
    let mut first = store.load().unwrap();
    let mut second = store.load().unwrap();

    first.clients.push(Client::new("C1", "U1", "First"));
    store.save(&mut first).unwrap();
    second.clients.push(Client::new("C2", "U1", "Second"));
    store.save(&mut second).unwrap();

    let ids: Vec<String> = store
        .load()
        .unwrap()
        .clients
        .into_iter()
        .map(|client| client.id)
        .collect();
    assert_eq!(ids, vec!["C2".to_string()]);
}

#[test]
fn quota_failure_reports_error_and_keeps_previous_document() {
    let store = DocumentStore::with_clock(
        MemorySlotStorage::with_quota(4 * 1024),
        StoreConfig::default(),
        StepClock::new(),
    );
    let before = store.load().unwrap();

    let mut doc = before.clone();
    let mut big = Client::new("C1", "U1", "Big");
    big.extra
        .insert("notes".to_string(), "x".repeat(8 * 1024).into());
    doc.clients.push(big);

    let err = store.save(&mut doc).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Storage(StorageError::QuotaExceeded { .. })
    ));
    assert_eq!(doc.last_updated, before.last_updated);
    assert_eq!(store.load().unwrap(), before);
}

#[test]
fn corrupt_slot_is_reported_and_left_untouched() {
    let storage = MemorySlotStorage::new();
    storage.write_slot("InvoiceProDB", "{not json").unwrap();
    let store = DocumentStore::with_clock(storage, StoreConfig::default(), StepClock::new());

    let err = store.load().unwrap_err();
    assert!(matches!(err, StoreError::Corrupt { ref key, .. } if key == "InvoiceProDB"));
    assert_eq!(store.read_raw().unwrap().as_deref(), Some("{not json"));
}

#[test]
fn reset_discards_document_and_next_load_reseeds() {
    let store = memory_store();
    store
        .modify(|doc| {
            doc.clients.push(Client::new("C1", "U1", "Acme"));
            Some(())
        })
        .unwrap();

    store.reset().unwrap();
    assert!(store.read_raw().unwrap().is_none());
    assert!(store.load().unwrap().clients.is_empty());
}

#[test]
fn modify_skips_save_when_nothing_changed() {
    let store = memory_store();
    let seeded = store.load().unwrap();

    let outcome = store.modify(|_| None::<()>).unwrap();
    assert!(outcome.is_none());
    assert_eq!(store.load().unwrap().last_updated, seeded.last_updated);
}

#[test]
fn custom_storage_key_and_seed_version_are_honored() {
    let config = StoreConfig::default()
        .with_storage_key("OtherDB")
        .with_seed_version("9.9.9");
    let store = DocumentStore::with_clock(MemorySlotStorage::new(), config, StepClock::new());

    assert_eq!(store.load().unwrap().version, "9.9.9");
    assert!(store.storage().read_slot("OtherDB").unwrap().is_some());
    assert!(store.storage().read_slot("InvoiceProDB").unwrap().is_none());
}

#[test]
fn app_written_document_loads_and_keeps_foreign_keys_across_saves() {
    let fixture = json!({
        "version": "3.0.0",
        "lastUpdated": "2024-04-30T08:00:00.000Z",
        "users": [{
            "id": "U1",
            "name": "Owner",
            "email": "owner@shop.test",
            "isActive": true,
            "settings": {
                "currency": "$",
                "company": { "logo": "data:image/png;base64,AAAA", "extra1": "VAT 123" },
                "invoice": { "signature": "data:image/png;base64,BBBB" },
                "prefs": { "theme": "dark" }
            }
        }],
        "clients": [
            { "id": "cli_1714464000000", "name": "Walk-in", "phone": "017" },
            { "id": "C1", "userId": "U1", "name": "Acme" }
        ],
        "invoices": [
            { "id": "INV-1", "clientId": "cli_1714464000000", "status": "pending", "total": "250" }
        ],
        "products": [],
        "activities": [],
        "settings": {},
        "savedCategories": { "U1": ["Custom"] }
    });
    let storage = MemorySlotStorage::new();
    storage
        .write_slot("InvoiceProDB", &fixture.to_string())
        .unwrap();
    let store = DocumentStore::with_clock(storage, StoreConfig::default(), StepClock::new());

    let doc = store.load().unwrap();
    assert_eq!(doc.clients.len(), 2);
    assert_eq!(doc.settings.app_name, "InvoicePro");
    let readers = CollectionService::new(&store);
    let visible = readers.user_clients("U1").unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, "C1");

    let trash = TrashService::new(&store);
    assert!(trash.move_to_trash(CollectionName::Clients, "C1").unwrap());
    assert!(trash
        .move_to_trash(CollectionName::Invoices, "INV-1")
        .unwrap());
    assert!(trash
        .permanent_delete(CollectionName::Clients, "cli_1714464000000")
        .unwrap());

    let raw = store.read_raw().unwrap().expect("document persisted");
    let persisted: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(persisted["savedCategories"], json!({ "U1": ["Custom"] }));
    let settings = &persisted["users"][0]["settings"];
    assert_eq!(settings["currency"], "$");
    assert_eq!(settings["company"]["extra1"], "VAT 123");
    assert_eq!(settings["invoice"]["signature"], "data:image/png;base64,BBBB");
    assert_eq!(settings["prefs"], json!({ "theme": "dark" }));
    assert_eq!(persisted["settings"]["appName"], "InvoicePro");

    let invoice = &persisted["invoices"][0];
    assert_eq!(invoice["isDeleted"], true);
    assert!(invoice.get("userId").is_none());
    assert_eq!(invoice["total"], "250");

    let ids: Vec<&str> = persisted["clients"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|client| client["id"].as_str())
        .collect();
    assert_eq!(ids, vec!["C1"]);
}
