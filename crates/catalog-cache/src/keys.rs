//! Cache key construction.
//!
//! Keys are component strings joined by [`KeyConfig::DELIMITER`]. Joining is
//! unambiguous only while no component contains the delimiter, which the
//! typed identifiers in [`crate::models`] enforce through
//! [`validate_component`].
//!
//! | Key                   | Components                                  |
//! |-----------------------|---------------------------------------------|
//! | catalog               | catalog                                     |
//! | database              | catalog, db                                 |
//! | table                 | catalog, db, table (normalized)             |
//! | table column          | catalog, db, table, column                  |
//! | partition             | partition values                            |
//! | partition column stat | partition values, column                    |

use crate::config::KeyConfig;
use crate::error::{CacheError, Result};

/// Normalize a catalog, database or table name: trimmed and lower-cased.
pub fn normalize_identifier(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Reject a key component that contains the reserved delimiter.
pub fn validate_component(component: &str) -> Result<()> {
    if component.contains(KeyConfig::DELIMITER) {
        return Err(CacheError::InvalidIdentifier {
            component: component.escape_debug().to_string(),
            message: "contains the reserved key delimiter".to_string(),
        });
    }
    Ok(())
}

/// Join parts with the delimiter, in the order given.
pub fn build_key<S: AsRef<str>>(parts: &[S]) -> String {
    let mut key = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            key.push(KeyConfig::DELIMITER);
        }
        key.push_str(part.as_ref());
    }
    key
}

/// Append one trailing delimiter, turning a key into a scan/delete prefix.
pub fn as_prefix(mut key: String) -> String {
    key.push(KeyConfig::DELIMITER);
    key
}

pub fn build_catalog_key(catalog: &str) -> String {
    catalog.to_string()
}

pub fn build_db_key(catalog: &str, db: &str) -> String {
    build_key(&[catalog, db])
}

/// Database key with a trailing delimiter, matching every table key under it.
pub fn build_db_key_prefix(catalog: &str, db: &str) -> String {
    as_prefix(build_db_key(catalog, db))
}

/// Table key; each component is normalized before joining.
pub fn build_table_key(catalog: &str, db: &str, table: &str) -> String {
    build_key(&[
        normalize_identifier(catalog),
        normalize_identifier(db),
        normalize_identifier(table),
    ])
}

pub fn build_table_col_key(catalog: &str, db: &str, table: &str, column: &str) -> String {
    build_key(&[catalog, db, table, column])
}

/// Partition values joined in order; no values yields the empty key.
pub fn build_partition_key<S: AsRef<str>>(values: &[S]) -> String {
    build_key(values)
}

pub fn build_partition_col_stats_key<S: AsRef<str>>(values: &[S], column: &str) -> String {
    let mut key = build_partition_key(values);
    key.push(KeyConfig::DELIMITER);
    key.push_str(column);
    key
}

/// Split a database key back into `(catalog, db)`.
///
/// Anything other than exactly two components means the key was corrupted or
/// built by something other than [`build_db_key`].
pub fn split_db_key(key: &str) -> Result<(String, String)> {
    let parts: Vec<&str> = key.split(KeyConfig::DELIMITER).collect();
    match parts.as_slice() {
        [catalog, db] => Ok((catalog.to_string(), db.to_string())),
        _ => Err(CacheError::MalformedKey {
            key: key.escape_debug().to_string(),
            expected: 2,
            actual: parts.len(),
        }),
    }
}
