//! Rebuilds caller-owned entities from wrappers and shared layouts.
//!
//! Every call deep-copies both the wrapper's entity and the shared layout, so
//! the result shares no state with the cache in either direction.

use crate::error::{CacheError, Result};
use crate::layout_store::StorageLayoutStore;
use crate::models::{Partition, StorageLayout, Table};
use crate::wrapper::{LayoutRef, PartitionWrapper, TableWrapper};
use tracing::error;

/// Assemble a full table from its wrapper.
pub fn assemble_table(wrapper: &TableWrapper, store: &StorageLayoutStore) -> Result<Table> {
    let mut table = wrapper.table.clone();
    table.storage = resolve_layout(&wrapper.layout, store, || {
        format!(
            "table {}.{}.{}",
            wrapper.table.catalog, wrapper.table.database, wrapper.table.name
        )
    })?;
    Ok(table)
}

/// Assemble a full partition from its wrapper.
pub fn assemble_partition(
    wrapper: &PartitionWrapper,
    store: &StorageLayoutStore,
) -> Result<Partition> {
    let mut partition = wrapper.partition.clone();
    partition.storage = resolve_layout(&wrapper.layout, store, || {
        format!(
            "partition {}.{}.{}{:?}",
            wrapper.partition.catalog,
            wrapper.partition.database,
            wrapper.partition.table,
            wrapper.partition.values
        )
    })?;
    Ok(partition)
}

/// Copy of the referenced layout with defaults filled and per-entity fields
/// laid over it. A hash the store cannot resolve is cache corruption.
fn resolve_layout(
    layout: &LayoutRef,
    store: &StorageLayoutStore,
    describe: impl FnOnce() -> String,
) -> Result<Option<StorageLayout>> {
    let Some(hash) = &layout.hash else {
        return Ok(None);
    };

    let Some(mut shared) = store.get(hash) else {
        let entity = describe();
        error!("Dangling storage layout {} referenced by {}", hash, entity);
        return Err(CacheError::DanglingLayout {
            entity,
            hash: hash.to_hex(),
        });
    };

    shared.fill_structural_defaults();
    shared.location = layout.location.clone();
    shared.parameters = layout.parameters.clone();
    Ok(Some(shared))
}
