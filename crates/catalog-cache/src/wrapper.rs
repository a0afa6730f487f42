//! Cached wrappers for tables and partitions.
//!
//! A wrapper keeps the entity with its storage layout detached, the hash of
//! the shared layout, and the two layout fields that stay per-entity
//! (location and parameters). Wrappers never leave the cache.

use crate::layout_store::StorageLayoutStore;
use crate::models::{LayoutHash, Partition, StorageLayout, Table};
use std::collections::HashMap;

/// Layout reference plus the per-entity layout fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct LayoutRef {
    pub hash: Option<LayoutHash>,
    pub location: String,
    pub parameters: HashMap<String, String>,
}

impl LayoutRef {
    /// Register `layout` (if any) with the store and keep its per-entity fields.
    fn register(layout: Option<StorageLayout>, store: &StorageLayoutStore) -> Self {
        match layout {
            Some(layout) => {
                let hash = store.put_if_absent(&layout);
                Self {
                    hash: Some(hash),
                    location: layout.location,
                    parameters: layout.parameters,
                }
            }
            None => Self::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TableWrapper {
    pub(crate) table: Table,
    pub(crate) layout: LayoutRef,
}

impl TableWrapper {
    /// Wrap `table`, taking one reference on its layout in `store`.
    pub fn new(mut table: Table, store: &StorageLayoutStore) -> Self {
        let layout = LayoutRef::register(table.storage.take(), store);
        Self { table, layout }
    }

    pub fn layout_hash(&self) -> Option<LayoutHash> {
        self.layout.hash
    }

    pub fn location(&self) -> &str {
        &self.layout.location
    }

    pub fn parameters(&self) -> &HashMap<String, String> {
        &self.layout.parameters
    }

    /// Give back this wrapper's layout reference.
    pub fn release(&self, store: &StorageLayoutStore) {
        if let Some(hash) = &self.layout.hash {
            store.release(hash);
        }
    }
}

#[derive(Debug, Clone)]
pub struct PartitionWrapper {
    pub(crate) partition: Partition,
    pub(crate) layout: LayoutRef,
}

impl PartitionWrapper {
    /// Wrap `partition`, taking one reference on its layout in `store`.
    pub fn new(mut partition: Partition, store: &StorageLayoutStore) -> Self {
        let layout = LayoutRef::register(partition.storage.take(), store);
        Self { partition, layout }
    }

    pub fn layout_hash(&self) -> Option<LayoutHash> {
        self.layout.hash
    }

    pub fn location(&self) -> &str {
        &self.layout.location
    }

    pub fn parameters(&self) -> &HashMap<String, String> {
        &self.layout.parameters
    }

    pub fn values(&self) -> &[String] {
        &self.partition.values
    }

    /// Give back this wrapper's layout reference.
    pub fn release(&self, store: &StorageLayoutStore) {
        if let Some(hash) = &self.layout.hash {
            store.release(hash);
        }
    }
}
