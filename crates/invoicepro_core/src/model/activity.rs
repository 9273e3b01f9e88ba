//! Audit trail entries.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// One persisted activity entry, newest first in `Document::activities`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Event kind such as `client_trashed`; serialized as `type`.
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub timestamp: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Caller-supplied part of an activity; id and timestamp are assigned on append.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewActivity {
    pub user_id: Option<String>,
    pub kind: String,
    pub title: String,
    pub description: String,
    pub extra: Map<String, Value>,
}

impl NewActivity {
    pub fn new(
        user_id: impl Into<String>,
        kind: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            user_id: Some(user_id.into()),
            kind: kind.into(),
            title: title.into(),
            description: description.into(),
            extra: Map::new(),
        }
    }

    pub(crate) fn into_activity(self, timestamp: String) -> Activity {
        Activity {
            id: generate_activity_id(),
            user_id: self.user_id,
            kind: self.kind,
            title: self.title,
            description: self.description,
            timestamp,
            extra: self.extra,
        }
    }
}

fn generate_activity_id() -> String {
    format!("ACT-{}", Uuid::new_v4().simple())
}
