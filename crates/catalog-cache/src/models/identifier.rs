//! Typed, validated identifiers for cached entities.
//!
//! Constructors normalize names the way keys expect them and reject any
//! component containing the key delimiter, so every key built from an
//! identifier can be split back unambiguously.

use crate::config::KeyConfig;
use crate::error::{CacheError, Result};
use crate::keys;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A database within a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DatabaseIdentifier {
    pub catalog: String,
    pub database: String,
}

impl DatabaseIdentifier {
    pub fn new(catalog: &str, database: &str) -> Result<Self> {
        let catalog = keys::normalize_identifier(catalog);
        let database = keys::normalize_identifier(database);
        keys::validate_component(&catalog)?;
        keys::validate_component(&database)?;
        Ok(Self { catalog, database })
    }

    pub fn key(&self) -> String {
        keys::build_db_key(&self.catalog, &self.database)
    }

    /// Prefix shared by the keys of every table in this database.
    pub fn table_prefix(&self) -> String {
        keys::build_db_key_prefix(&self.catalog, &self.database)
    }

    /// Rebuild an identifier from a database key.
    pub fn from_key(key: &str) -> Result<Self> {
        let (catalog, database) = keys::split_db_key(key)?;
        Ok(Self { catalog, database })
    }

    pub fn table(&self, table: &str) -> Result<TableIdentifier> {
        TableIdentifier::new(&self.catalog, &self.database, table)
    }
}

impl fmt::Display for DatabaseIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.catalog, self.database)
    }
}

/// A table within a database.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableIdentifier {
    pub catalog: String,
    pub database: String,
    pub table: String,
}

impl TableIdentifier {
    pub fn new(catalog: &str, database: &str, table: &str) -> Result<Self> {
        let catalog = keys::normalize_identifier(catalog);
        let database = keys::normalize_identifier(database);
        let table = keys::normalize_identifier(table);
        keys::validate_component(&catalog)?;
        keys::validate_component(&database)?;
        keys::validate_component(&table)?;
        Ok(Self {
            catalog,
            database,
            table,
        })
    }

    pub fn database_id(&self) -> DatabaseIdentifier {
        DatabaseIdentifier {
            catalog: self.catalog.clone(),
            database: self.database.clone(),
        }
    }

    pub fn key(&self) -> String {
        keys::build_table_key(&self.catalog, &self.database, &self.table)
    }

    /// Prefix shared by every key scoped under this table (partitions,
    /// column statistics).
    pub fn scoped_prefix(&self) -> String {
        keys::as_prefix(self.key())
    }

    pub fn column_key(&self, column: &str) -> Result<String> {
        keys::validate_component(column)?;
        Ok(keys::build_table_col_key(
            &self.catalog,
            &self.database,
            &self.table,
            column,
        ))
    }

    pub fn partition(&self, values: Vec<String>) -> Result<PartitionIdentifier> {
        PartitionIdentifier::new(self.clone(), values)
    }
}

impl fmt::Display for TableIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.catalog, self.database, self.table)
    }
}

/// A partition, identified by its table and its values in partition-key order.
/// Values are kept verbatim. A partition has at least one value and no value
/// is empty, which keeps distinct value lists on distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartitionIdentifier {
    pub table: TableIdentifier,
    pub values: Vec<String>,
}

impl PartitionIdentifier {
    pub fn new(table: TableIdentifier, values: Vec<String>) -> Result<Self> {
        if values.is_empty() {
            return Err(CacheError::InvalidIdentifier {
                component: format!("{}[]", table),
                message: "a partition needs at least one value".to_string(),
            });
        }
        for value in &values {
            if value.is_empty() {
                return Err(CacheError::InvalidIdentifier {
                    component: format!("{}{:?}", table, values),
                    message: "partition values must not be empty".to_string(),
                });
            }
            keys::validate_component(value)?;
        }
        Ok(Self { table, values })
    }

    /// Partition key relative to its table.
    pub fn partition_key(&self) -> String {
        keys::build_partition_key(&self.values)
    }

    /// Key unique across all tables: table key, delimiter, partition key.
    pub fn key(&self) -> String {
        let mut key = self.table.scoped_prefix();
        key.push_str(&self.partition_key());
        key
    }

    /// Name used when filtering partitions: values joined with `/`.
    pub fn name(&self) -> String {
        self.values.join(KeyConfig::PARTITION_NAME_SEPARATOR)
    }

    pub fn column_stats_key(&self, column: &str) -> Result<String> {
        keys::validate_component(column)?;
        let mut key = self.table.scoped_prefix();
        key.push_str(&keys::build_partition_col_stats_key(&self.values, column));
        Ok(key)
    }
}

impl fmt::Display for PartitionIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.table, self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;

    #[test]
    fn test_table_identifier_normalizes() {
        let id = TableIdentifier::new("Hive", " Sales ", "Orders").unwrap();
        assert_eq!(id.to_string(), "hive.sales.orders");
        assert_eq!(id.key(), keys::build_table_key("hive", "sales", "orders"));
    }

    #[test]
    fn test_rejects_delimiter() {
        let bad = format!("a{}b", KeyConfig::DELIMITER);
        assert!(matches!(
            TableIdentifier::new("hive", &bad, "t"),
            Err(CacheError::InvalidIdentifier { .. })
        ));
        let table = TableIdentifier::new("hive", "db", "t").unwrap();
        assert!(table.partition(vec![bad.clone()]).is_err());
        assert!(table.column_key(&bad).is_err());
    }

    #[test]
    fn test_database_key_roundtrip() {
        let db = DatabaseIdentifier::new("hive", "default").unwrap();
        assert_eq!(DatabaseIdentifier::from_key(&db.key()).unwrap(), db);
    }

    #[test]
    fn test_partition_values_kept_verbatim() {
        let table = TableIdentifier::new("hive", "db", "t").unwrap();
        let part = table
            .partition(vec!["2024-01-01".into(), "EU".into()])
            .unwrap();
        assert_eq!(part.name(), "2024-01-01/EU");
        assert!(part.key().starts_with(&table.scoped_prefix()));
    }

    #[test]
    fn test_rejects_empty_partition_values() {
        let table = TableIdentifier::new("hive", "db", "t").unwrap();
        for values in [vec![], vec![String::new()], vec!["a".into(), String::new()]] {
            assert!(matches!(
                table.partition(values),
                Err(CacheError::InvalidIdentifier { .. })
            ));
        }
    }

    #[test]
    fn test_partition_keys_do_not_collide_across_tables() {
        let a = TableIdentifier::new("hive", "db", "a").unwrap();
        let ab = TableIdentifier::new("hive", "db", "ab").unwrap();
        let pa = a.partition(vec!["b".into()]).unwrap();
        assert!(!pa.key().starts_with(&ab.scoped_prefix()));
    }
}
