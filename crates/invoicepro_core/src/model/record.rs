//! Trashable record shapes and their shared soft-delete state.
//!
//! # Invariants
//! - `TrashState` fields are private; `mark_trashed` and `clear` are the only
//!   writers, so `isDeleted` and `deletedAt` move together.
//! - A record is trashed iff `isDeleted == true` (strict). Every other value,
//!   including an absent flag, counts as active.
//! - `id` and `userId` are fixed at creation; nothing in this crate rewrites them.
//! - A missing `userId` loads as empty and is omitted again on save.

use crate::model::collection::CollectionName;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Soft-delete markers embedded in every trashable record.
///
/// Serialized flat into the owning record; both keys are omitted while the
/// record is active.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrashState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    is_deleted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    deleted_at: Option<String>,
}

impl TrashState {
    pub fn is_trashed(&self) -> bool {
        self.is_deleted == Some(true)
    }

    pub fn is_active(&self) -> bool {
        !self.is_trashed()
    }

    /// Raw ISO-8601 deletion timestamp, if present.
    pub fn deleted_at(&self) -> Option<&str> {
        self.deleted_at.as_deref()
    }

    /// Parsed deletion timestamp; `None` when absent or unparsable.
    pub fn deleted_at_time(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
            .as_deref()
            .and_then(|value| DateTime::parse_from_rfc3339(value).ok())
            .map(|value| value.with_timezone(&Utc))
    }

    /// True when neither marker key would be serialized.
    pub fn is_unmarked(&self) -> bool {
        self.is_deleted.is_none() && self.deleted_at.is_none()
    }

    /// Sets both markers. Re-marking a trashed record re-stamps `deletedAt`.
    pub(crate) fn mark_trashed(&mut self, timestamp: String) {
        self.is_deleted = Some(true);
        self.deleted_at = Some(timestamp);
    }

    /// Drops both markers so the record serializes as never trashed.
    pub(crate) fn clear(&mut self) {
        self.is_deleted = None;
        self.deleted_at = None;
    }
}

/// Behavior shared by every record living in a trashable collection.
pub trait TrashableRecord: Clone {
    const COLLECTION: CollectionName;

    fn id(&self) -> &str;
    fn user_id(&self) -> &str;
    fn trash_state(&self) -> &TrashState;
    fn trash_state_mut(&mut self) -> &mut TrashState;
    fn into_record(self) -> Record;

    fn is_trashed(&self) -> bool {
        self.trash_state().is_trashed()
    }

    /// Ownerless records belong to nobody, not to the empty user id.
    fn is_owned_by(&self, user_id: &str) -> bool {
        !user_id.is_empty() && self.user_id() == user_id
    }

    /// Visible to the active-record readers of `user_id`.
    fn is_active_for(&self, user_id: &str) -> bool {
        self.is_owned_by(user_id) && !self.is_trashed()
    }

    /// Visible to the trash readers of `user_id`.
    fn is_trashed_for(&self, user_id: &str) -> bool {
        self.is_owned_by(user_id) && self.is_trashed()
    }
}

/// Customer record (`clients` collection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    /// Empty when the writer recorded no owner; such records match no user.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub trash: TrashState,
    /// Entity fields this crate does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Client {
    pub fn new(id: impl Into<String>, user_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            name: name.into(),
            email: None,
            phone: None,
            company: None,
            created_at: None,
            trash: TrashState::default(),
            extra: Map::new(),
        }
    }
}

/// Billing document (`invoices` collection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<InvoiceStatus>,
    /// Number or numeric string, as written by the invoice editor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub trash: TrashState,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Invoice {
    pub fn new(id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            client_id: None,
            status: None,
            total: None,
            created_at: None,
            trash: TrashState::default(),
            extra: Map::new(),
        }
    }

    /// Total as a number; missing or unparsable totals count as zero.
    pub fn total_amount(&self) -> f64 {
        self.total.as_ref().map_or(0.0, parse_amount)
    }

    pub fn has_status(&self, status: &InvoiceStatus) -> bool {
        self.status.as_ref() == Some(status)
    }
}

/// Invoice workflow state. Unrecognized values are preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InvoiceStatus {
    Draft,
    Pending,
    Paid,
    Overdue,
    Cancelled,
    Other(String),
}

impl From<String> for InvoiceStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "draft" => Self::Draft,
            "pending" => Self::Pending,
            "paid" => Self::Paid,
            "overdue" => Self::Overdue,
            "cancelled" => Self::Cancelled,
            _ => Self::Other(value),
        }
    }
}

impl From<InvoiceStatus> for String {
    fn from(value: InvoiceStatus) -> Self {
        match value {
            InvoiceStatus::Draft => "draft".to_string(),
            InvoiceStatus::Pending => "pending".to_string(),
            InvoiceStatus::Paid => "paid".to_string(),
            InvoiceStatus::Overdue => "overdue".to_string(),
            InvoiceStatus::Cancelled => "cancelled".to_string(),
            InvoiceStatus::Other(other) => other,
        }
    }
}

/// Catalog item (`products` collection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub trash: TrashState,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    pub fn new(id: impl Into<String>, user_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            name: name.into(),
            price: None,
            category: None,
            created_at: None,
            trash: TrashState::default(),
            extra: Map::new(),
        }
    }

    pub fn price_amount(&self) -> f64 {
        self.price.as_ref().map_or(0.0, parse_amount)
    }
}

/// Product grouping (`categories` collection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub trash: TrashState,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Category {
    pub fn new(id: impl Into<String>, user_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            name: name.into(),
            trash: TrashState::default(),
            extra: Map::new(),
        }
    }
}

macro_rules! trashable {
    ($ty:ident, $collection:ident) => {
        impl TrashableRecord for $ty {
            const COLLECTION: CollectionName = CollectionName::$collection;

            fn id(&self) -> &str {
                &self.id
            }

            fn user_id(&self) -> &str {
                &self.user_id
            }

            fn trash_state(&self) -> &TrashState {
                &self.trash
            }

            fn trash_state_mut(&mut self) -> &mut TrashState {
                &mut self.trash
            }

            fn into_record(self) -> Record {
                Record::$ty(self)
            }
        }
    };
}

trashable!(Client, Clients);
trashable!(Invoice, Invoices);
trashable!(Product, Products);
trashable!(Category, Categories);

/// A record from any trashable collection, tagged by its collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Client(Client),
    Invoice(Invoice),
    Product(Product),
    Category(Category),
}

impl Record {
    pub fn collection(&self) -> CollectionName {
        match self {
            Self::Client(_) => CollectionName::Clients,
            Self::Invoice(_) => CollectionName::Invoices,
            Self::Product(_) => CollectionName::Products,
            Self::Category(_) => CollectionName::Categories,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Client(record) => record.id(),
            Self::Invoice(record) => record.id(),
            Self::Product(record) => record.id(),
            Self::Category(record) => record.id(),
        }
    }

    pub fn user_id(&self) -> &str {
        match self {
            Self::Client(record) => record.user_id(),
            Self::Invoice(record) => record.user_id(),
            Self::Product(record) => record.user_id(),
            Self::Category(record) => record.user_id(),
        }
    }

    pub fn trash_state(&self) -> &TrashState {
        match self {
            Self::Client(record) => record.trash_state(),
            Self::Invoice(record) => record.trash_state(),
            Self::Product(record) => record.trash_state(),
            Self::Category(record) => record.trash_state(),
        }
    }

    /// Short human label used by trash listings.
    pub fn display_name(&self) -> &str {
        match self {
            Self::Client(record) => &record.name,
            Self::Invoice(record) => &record.id,
            Self::Product(record) => &record.name,
            Self::Category(record) => &record.name,
        }
    }
}

/// Parses a JSON number or numeric string the way a lenient form reader does:
/// the longest leading decimal prefix wins, anything else is zero.
pub fn parse_amount(value: &Value) -> f64 {
    match value {
        Value::Number(number) => number.as_f64().unwrap_or(0.0),
        Value::String(text) => parse_leading_decimal(text.trim()),
        _ => 0.0,
    }
}

fn parse_leading_decimal(text: &str) -> f64 {
    let bytes = text.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }

    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        end += 1 + frac_digits;
    }
    if int_digits + frac_digits == 0 {
        return 0.0;
    }

    // Exponent only counts when at least one digit follows it.
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut cursor = end + 1;
        if matches!(bytes.get(cursor), Some(b'+' | b'-')) {
            cursor += 1;
        }
        let exp_digits = count_digits(&bytes[cursor..]);
        if exp_digits > 0 {
            end = cursor + exp_digits;
        }
    }

    text[..end]
        .trim_end_matches('.')
        .parse::<f64>()
        .unwrap_or(0.0)
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|byte| byte.is_ascii_digit()).count()
}

#[cfg(test)]
mod tests {
    use super::{parse_amount, Client, InvoiceStatus, TrashState, TrashableRecord};
    use serde_json::json;

    #[test]
    fn trash_state_markers_move_together() {
        let mut state = TrashState::default();
        assert!(state.is_active());
        assert!(state.is_unmarked());

        state.mark_trashed("2024-05-01T10:00:00.000Z".to_string());
        assert!(state.is_trashed());
        assert_eq!(state.deleted_at(), Some("2024-05-01T10:00:00.000Z"));
        assert!(state.deleted_at_time().is_some());

        state.clear();
        assert!(state.is_unmarked());
        assert!(state.is_active());
    }

    #[test]
    fn explicit_false_flag_counts_as_active() {
        let client: Client = serde_json::from_value(json!({
            "id": "C1",
            "userId": "U1",
            "name": "Acme",
            "isDeleted": false
        }))
        .unwrap();
        assert!(client.trash.is_active());
        assert!(!client.trash.is_unmarked());
    }

    #[test]
    fn active_client_serializes_without_trash_keys() {
        let client = Client::new("C1", "U1", "Acme");
        let value = serde_json::to_value(&client).unwrap();
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("isDeleted"));
        assert!(!object.contains_key("deletedAt"));
        assert_eq!(object["userId"], json!("U1"));
    }

    #[test]
    fn unknown_fields_round_trip_through_extra() {
        let source = json!({
            "id": "C1",
            "userId": "U1",
            "name": "Acme",
            "status": "active",
            "address": { "city": "Dhaka" },
            "isDeleted": true,
            "deletedAt": "2024-05-01T10:00:00.000Z"
        });
        let client: Client = serde_json::from_value(source.clone()).unwrap();
        assert!(client.trash.is_trashed());
        assert_eq!(client.extra.get("status"), Some(&json!("active")));
        assert!(!client.extra.contains_key("isDeleted"));
        assert_eq!(serde_json::to_value(&client).unwrap(), source);
    }

    #[test]
    fn invoice_status_preserves_unknown_values() {
        let status: InvoiceStatus = serde_json::from_value(json!("partially_paid")).unwrap();
        assert_eq!(status, InvoiceStatus::Other("partially_paid".to_string()));
        assert_eq!(
            serde_json::to_value(InvoiceStatus::Pending).unwrap(),
            json!("pending")
        );
    }

    #[test]
    fn amounts_accept_numbers_and_numeric_strings() {
        assert_eq!(parse_amount(&json!(12.5)), 12.5);
        assert_eq!(parse_amount(&json!("100.50")), 100.5);
        assert_eq!(parse_amount(&json!(" 42abc")), 42.0);
        assert_eq!(parse_amount(&json!("-3.")), -3.0);
        assert_eq!(parse_amount(&json!("৳100")), 0.0);
        assert_eq!(parse_amount(&json!(null)), 0.0);
    }

    #[test]
    fn amounts_accept_exponent_suffix() {
        assert_eq!(parse_amount(&json!("1e3")), 1000.0);
        assert_eq!(parse_amount(&json!("2.5E-1 due")), 0.25);
        assert_eq!(parse_amount(&json!("7e")), 7.0);
        assert_eq!(parse_amount(&json!("4e+x")), 4.0);
        assert_eq!(parse_amount(&json!(".5")), 0.5);
        assert_eq!(parse_amount(&json!("-.")), 0.0);
    }

    #[test]
    fn record_without_owner_loads_and_matches_nobody() {
        let source = json!({ "id": "cli_1700000000000", "name": "Walk-in" });
        let client: Client = serde_json::from_value(source.clone()).unwrap();
        assert_eq!(client.user_id, "");
        assert!(!client.is_owned_by(""));
        assert!(!client.is_active_for("U1"));
        assert_eq!(serde_json::to_value(&client).unwrap(), source);
    }
}
