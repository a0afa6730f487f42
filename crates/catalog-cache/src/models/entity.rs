//! Catalog entities as supplied by, and returned to, the service layer.

use super::identifier::{DatabaseIdentifier, PartitionIdentifier, TableIdentifier};
use super::layout::{FieldSchema, StorageLayout};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A catalog: the top-level namespace.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location_uri: String,
}

/// A database within a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Database {
    pub catalog: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location_uri: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub parameters: HashMap<String, String>,
}

impl Database {
    pub fn identifier(&self) -> Result<DatabaseIdentifier> {
        DatabaseIdentifier::new(&self.catalog, &self.name)
    }
}

/// A table. `storage` is `None` for entities without a physical layout,
/// such as views.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Table {
    pub catalog: String,
    pub database: String,
    pub name: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub create_time: i64,
    #[serde(default)]
    pub table_type: String,
    #[serde(default)]
    pub partition_keys: Vec<FieldSchema>,
    #[serde(default)]
    pub parameters: HashMap<String, String>,
    #[serde(default)]
    pub view_original_text: Option<String>,
    #[serde(default)]
    pub view_expanded_text: Option<String>,
    #[serde(default)]
    pub storage: Option<StorageLayout>,
}

impl Table {
    pub fn identifier(&self) -> Result<TableIdentifier> {
        TableIdentifier::new(&self.catalog, &self.database, &self.name)
    }
}

/// A partition of a table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Partition {
    pub catalog: String,
    pub database: String,
    pub table: String,
    pub values: Vec<String>,
    #[serde(default)]
    pub create_time: i64,
    #[serde(default)]
    pub parameters: HashMap<String, String>,
    #[serde(default)]
    pub storage: Option<StorageLayout>,
}

impl Partition {
    pub fn identifier(&self) -> Result<PartitionIdentifier> {
        TableIdentifier::new(&self.catalog, &self.database, &self.table)?
            .partition(self.values.clone())
    }
}
