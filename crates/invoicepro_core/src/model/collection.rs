//! Names of the trashable collections.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// A user-scoped, trash-aware collection inside the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionName {
    Clients,
    Invoices,
    Products,
    Categories,
}

impl CollectionName {
    /// Every trashable collection, in document order.
    pub const ALL: [CollectionName; 4] = [
        CollectionName::Clients,
        CollectionName::Invoices,
        CollectionName::Products,
        CollectionName::Categories,
    ];

    /// Document key of this collection.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Clients => "clients",
            Self::Invoices => "invoices",
            Self::Products => "products",
            Self::Categories => "categories",
        }
    }
}

impl Display for CollectionName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a caller names a collection that is not trashable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCollection(pub String);

impl Display for UnknownCollection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "collection `{}` not found; expected clients|invoices|products|categories",
            self.0
        )
    }
}

impl Error for UnknownCollection {}

impl FromStr for CollectionName {
    type Err = UnknownCollection;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "clients" => Ok(Self::Clients),
            "invoices" => Ok(Self::Invoices),
            "products" => Ok(Self::Products),
            "categories" => Ok(Self::Categories),
            other => Err(UnknownCollection(other.to_string())),
        }
    }
}
