//! The shared catalog cache.
//!
//! Owns every entity map and the layout store. All keys are derived from
//! typed identifiers; callers never see or build keys themselves.
//!
//! Lock discipline: a read assembles while holding its wrapper's shard read
//! guard, and takes the layout store lock inside it. Writers never hold a
//! wrapper-map lock while touching the store, so the two lock orders cannot
//! cross, and a layout reference cannot be released while a reader is still
//! assembling from it.

use super::stats::{CacheStats, LookupCounters};
use crate::assemble::{assemble_partition, assemble_table};
use crate::config::{CacheConfig, KeyConfig};
use crate::error::{CacheError, Result};
use crate::filter::PatternCache;
use crate::keys;
use crate::layout_store::StorageLayoutStore;
use crate::models::{
    Catalog, ColumnStatistics, Database, DatabaseIdentifier, Partition, PartitionIdentifier, Table,
    TableIdentifier,
};
use crate::wrapper::{PartitionWrapper, TableWrapper};
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// Deduplicating in-memory cache of catalog metadata.
pub struct SharedCache {
    config: CacheConfig,
    layouts: StorageLayoutStore,
    catalogs: DashMap<String, Catalog>,
    databases: DashMap<String, Database>,
    tables: DashMap<String, TableWrapper>,
    partitions: DashMap<String, PartitionWrapper>,
    table_col_stats: DashMap<String, ColumnStatistics>,
    partition_col_stats: DashMap<String, ColumnStatistics>,
    patterns: PatternCache,
    lookups: LookupCounters,
    shut_down: AtomicBool,
}

impl std::fmt::Debug for SharedCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedCache")
            .field("tables", &self.tables.len())
            .field("partitions", &self.partitions.len())
            .field("layouts", &self.layouts.len())
            .field("reclaim", &self.config.layout_reclaim)
            .field("shut_down", &self.shut_down.load(Ordering::Relaxed))
            .finish()
    }
}

impl SharedCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            layouts: StorageLayoutStore::new(config.layout_reclaim),
            catalogs: DashMap::new(),
            databases: DashMap::new(),
            tables: DashMap::new(),
            partitions: DashMap::new(),
            table_col_stats: DashMap::new(),
            partition_col_stats: DashMap::new(),
            patterns: PatternCache::new(config.pattern_cache_capacity, config.pattern_cache_ttl),
            lookups: LookupCounters::default(),
            shut_down: AtomicBool::new(false),
            config,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Read access to the layout store, for inspection.
    pub fn layout_store(&self) -> &StorageLayoutStore {
        &self.layouts
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_shut_down() {
            warn!("Rejected write to a shut down cache");
            return Err(CacheError::ShutDown);
        }
        Ok(())
    }

    /// Undo an insert that raced with [`shutdown`](Self::shutdown): a write
    /// that passed `ensure_open` may land after the maps were cleared, and
    /// its layout reference may have been cleared without a release.
    fn discard_if_shut_down<V>(&self, map: &DashMap<String, V>, key: &str) -> bool {
        if !self.is_shut_down() {
            return false;
        }
        debug!("Discarding write that raced with shutdown");
        map.remove(key);
        self.layouts.clear();
        true
    }

    /// An assembly failure after shutdown is a wrapper whose layout was
    /// already cleared, which reads report as absent.
    fn settle_assembly<T>(&self, assembled: Result<T>) -> Result<Option<T>> {
        match assembled {
            Ok(entity) => Ok(Some(entity)),
            Err(_) if self.is_shut_down() => Ok(None),
            Err(e) => Err(e),
        }
    }

    // ========================================
    // Catalogs
    // ========================================

    pub fn put_catalog(&self, mut catalog: Catalog) -> Result<()> {
        self.ensure_open()?;
        catalog.name = keys::normalize_identifier(&catalog.name);
        keys::validate_component(&catalog.name)?;
        let key = keys::build_catalog_key(&catalog.name);
        self.catalogs.insert(key.clone(), catalog);
        if self.discard_if_shut_down(&self.catalogs, &key) {
            return Err(CacheError::ShutDown);
        }
        Ok(())
    }

    pub fn get_catalog(&self, name: &str) -> Option<Catalog> {
        if self.is_shut_down() {
            return None;
        }
        let key = keys::build_catalog_key(&keys::normalize_identifier(name));
        self.catalogs.get(&key).map(|c| c.value().clone())
    }

    /// Remove a catalog entry. Databases under it are left alone.
    pub fn invalidate_catalog(&self, name: &str) -> bool {
        let key = keys::build_catalog_key(&keys::normalize_identifier(name));
        self.catalogs.remove(&key).is_some()
    }

    pub fn list_catalogs(&self, pattern: &str) -> Result<Vec<String>> {
        let pattern = self.patterns.get_or_compile(pattern)?;
        if self.is_shut_down() {
            return Ok(Vec::new());
        }
        let mut names: Vec<String> = self
            .catalogs
            .iter()
            .map(|entry| entry.key().clone())
            .filter(|name| pattern.matches(name))
            .collect();
        names.sort();
        Ok(names)
    }

    // ========================================
    // Databases
    // ========================================

    pub fn put_database(&self, mut database: Database) -> Result<()> {
        self.ensure_open()?;
        let id = database.identifier()?;
        database.catalog = id.catalog.clone();
        database.name = id.database.clone();
        let key = id.key();
        self.databases.insert(key.clone(), database);
        if self.discard_if_shut_down(&self.databases, &key) {
            return Err(CacheError::ShutDown);
        }
        Ok(())
    }

    pub fn get_database(&self, id: &DatabaseIdentifier) -> Option<Database> {
        if self.is_shut_down() {
            return None;
        }
        self.databases.get(&id.key()).map(|db| db.value().clone())
    }

    /// Remove a database and every table cached under it.
    pub fn invalidate_database(&self, id: &DatabaseIdentifier) -> bool {
        let prefix = id.table_prefix();
        let tables: Vec<TableIdentifier> = self
            .tables
            .iter()
            .filter_map(|entry| {
                entry
                    .key()
                    .strip_prefix(prefix.as_str())
                    .map(|table| TableIdentifier {
                        catalog: id.catalog.clone(),
                        database: id.database.clone(),
                        table: table.to_string(),
                    })
            })
            .collect();

        for table in &tables {
            self.invalidate_table(table);
        }

        // Partitions and statistics can be cached without their table.
        let in_scope = |key: &str| key.starts_with(prefix.as_str());
        let orphans = remove_where(&self.partitions, in_scope);
        for wrapper in &orphans {
            wrapper.release(&self.layouts);
        }
        remove_where(&self.table_col_stats, in_scope);
        remove_where(&self.partition_col_stats, in_scope);

        let removed = self.databases.remove(&id.key()).is_some();
        debug!(
            "Invalidated database {} ({} cached tables, {} orphaned partitions)",
            id,
            tables.len(),
            orphans.len()
        );
        removed
    }

    pub fn list_databases(&self, catalog: &str, pattern: &str) -> Result<Vec<DatabaseIdentifier>> {
        let pattern = self.patterns.get_or_compile(pattern)?;
        if self.is_shut_down() {
            return Ok(Vec::new());
        }
        let catalog = keys::normalize_identifier(catalog);
        let prefix = keys::as_prefix(keys::build_catalog_key(&catalog));
        let mut ids: Vec<DatabaseIdentifier> = self
            .databases
            .iter()
            .filter_map(|entry| entry.key().strip_prefix(prefix.as_str()).map(str::to_string))
            .filter(|name| pattern.matches(name))
            .map(|database| DatabaseIdentifier {
                catalog: catalog.clone(),
                database,
            })
            .collect();
        ids.sort();
        Ok(ids)
    }

    // ========================================
    // Tables
    // ========================================

    /// Cache `table`, replacing any previous entry and releasing the
    /// previous entry's layout.
    pub fn put_table(&self, mut table: Table) -> Result<()> {
        self.ensure_open()?;
        let id = table.identifier()?;
        table.catalog = id.catalog.clone();
        table.database = id.database.clone();
        table.name = id.table.clone();

        let key = id.key();
        let wrapper = TableWrapper::new(table, &self.layouts);
        if let Some(previous) = self.tables.insert(key.clone(), wrapper) {
            previous.release(&self.layouts);
        }
        if self.discard_if_shut_down(&self.tables, &key) {
            return Err(CacheError::ShutDown);
        }
        debug!("Cached table {}", id);
        Ok(())
    }

    /// Assembled copy of the cached table, or `None` on a miss.
    pub fn get_table(&self, id: &TableIdentifier) -> Result<Option<Table>> {
        if self.is_shut_down() {
            return Ok(None);
        }
        let found = match self.tables.get(&id.key()) {
            Some(wrapper) => self.settle_assembly(assemble_table(wrapper.value(), &self.layouts))?,
            None => None,
        };
        Ok(self.lookups.record(found))
    }

    /// Remove a table with its partitions and column statistics.
    pub fn invalidate_table(&self, id: &TableIdentifier) -> bool {
        let removed = match self.tables.remove(&id.key()) {
            Some((_, wrapper)) => {
                wrapper.release(&self.layouts);
                true
            }
            None => false,
        };

        let scope = id.scoped_prefix();
        let partitions = remove_where(&self.partitions, |key| key.starts_with(scope.as_str()));
        for wrapper in &partitions {
            wrapper.release(&self.layouts);
        }
        let table_stats = remove_where(&self.table_col_stats, |key| key.starts_with(scope.as_str()));
        let part_stats =
            remove_where(&self.partition_col_stats, |key| key.starts_with(scope.as_str()));

        if removed || !partitions.is_empty() {
            debug!(
                "Invalidated table {} ({} partitions, {} column stats)",
                id,
                partitions.len(),
                table_stats.len() + part_stats.len()
            );
        }
        removed
    }

    /// Tables in `database` whose names match `pattern`, sorted.
    pub fn list_tables(
        &self,
        database: &DatabaseIdentifier,
        pattern: &str,
    ) -> Result<Vec<TableIdentifier>> {
        let pattern = self.patterns.get_or_compile(pattern)?;
        if self.is_shut_down() {
            return Ok(Vec::new());
        }
        let prefix = database.table_prefix();
        let mut ids: Vec<TableIdentifier> = self
            .tables
            .iter()
            .filter_map(|entry| entry.key().strip_prefix(prefix.as_str()).map(str::to_string))
            .filter(|name| pattern.matches(name))
            .map(|table| TableIdentifier {
                catalog: database.catalog.clone(),
                database: database.database.clone(),
                table,
            })
            .collect();
        ids.sort();
        Ok(ids)
    }

    // ========================================
    // Partitions
    // ========================================

    /// Cache `partition`, replacing any previous entry and releasing the
    /// previous entry's layout.
    pub fn put_partition(&self, mut partition: Partition) -> Result<()> {
        self.ensure_open()?;
        let id = partition.identifier()?;
        partition.catalog = id.table.catalog.clone();
        partition.database = id.table.database.clone();
        partition.table = id.table.table.clone();

        let key = id.key();
        let wrapper = PartitionWrapper::new(partition, &self.layouts);
        if let Some(previous) = self.partitions.insert(key.clone(), wrapper) {
            previous.release(&self.layouts);
        }
        if self.discard_if_shut_down(&self.partitions, &key) {
            return Err(CacheError::ShutDown);
        }
        debug!("Cached partition {}", id);
        Ok(())
    }

    /// Assembled copy of the cached partition, or `None` on a miss.
    pub fn get_partition(&self, id: &PartitionIdentifier) -> Result<Option<Partition>> {
        if self.is_shut_down() {
            return Ok(None);
        }
        let found = match self.partitions.get(&id.key()) {
            Some(wrapper) => {
                self.settle_assembly(assemble_partition(wrapper.value(), &self.layouts))?
            }
            None => None,
        };
        Ok(self.lookups.record(found))
    }

    /// Assembled copies of every cached partition of `table`.
    pub fn get_partitions(&self, table: &TableIdentifier) -> Result<Vec<Partition>> {
        if self.is_shut_down() {
            return Ok(Vec::new());
        }
        let scope = table.scoped_prefix();
        let mut partitions = Vec::new();
        for entry in self.partitions.iter() {
            if entry.key().starts_with(scope.as_str()) {
                match self.settle_assembly(assemble_partition(entry.value(), &self.layouts))? {
                    Some(partition) => partitions.push(partition),
                    None => return Ok(Vec::new()),
                }
            }
        }
        partitions.sort_by(|a, b| a.values.cmp(&b.values));
        Ok(partitions)
    }

    /// Remove a partition and its column statistics.
    pub fn invalidate_partition(&self, id: &PartitionIdentifier) -> bool {
        let removed = match self.partitions.remove(&id.key()) {
            Some((_, wrapper)) => {
                wrapper.release(&self.layouts);
                true
            }
            None => false,
        };

        // Only keys whose remainder is a bare column name belong to this
        // partition; longer value lists share the textual prefix.
        let scope = keys::as_prefix(id.key());
        remove_where(&self.partition_col_stats, |key| {
            key.strip_prefix(scope.as_str())
                .is_some_and(|column| !column.contains(KeyConfig::DELIMITER))
        });

        if removed {
            debug!("Invalidated partition {}", id);
        }
        removed
    }

    /// Partitions of `table` whose names (values joined with `/`) match
    /// `pattern`, sorted by values.
    pub fn list_partitions(
        &self,
        table: &TableIdentifier,
        pattern: &str,
    ) -> Result<Vec<PartitionIdentifier>> {
        let pattern = self.patterns.get_or_compile(pattern)?;
        if self.is_shut_down() {
            return Ok(Vec::new());
        }
        let scope = table.scoped_prefix();
        let mut ids: Vec<PartitionIdentifier> = self
            .partitions
            .iter()
            .filter(|entry| entry.key().starts_with(scope.as_str()))
            .map(|entry| PartitionIdentifier {
                table: table.clone(),
                values: entry.value().values().to_vec(),
            })
            .filter(|id| pattern.matches(&id.name()))
            .collect();
        ids.sort();
        Ok(ids)
    }

    // ========================================
    // Column statistics
    // ========================================

    pub fn put_table_column_stats(
        &self,
        table: &TableIdentifier,
        stats: ColumnStatistics,
    ) -> Result<()> {
        self.ensure_open()?;
        let key = table.column_key(&stats.column_name)?;
        self.table_col_stats.insert(key.clone(), stats);
        if self.discard_if_shut_down(&self.table_col_stats, &key) {
            return Err(CacheError::ShutDown);
        }
        Ok(())
    }

    pub fn get_table_column_stats(
        &self,
        table: &TableIdentifier,
        column: &str,
    ) -> Result<Option<ColumnStatistics>> {
        let key = table.column_key(column)?;
        if self.is_shut_down() {
            return Ok(None);
        }
        Ok(self.table_col_stats.get(&key).map(|s| s.value().clone()))
    }

    pub fn invalidate_table_column_stats(
        &self,
        table: &TableIdentifier,
        column: &str,
    ) -> Result<bool> {
        let key = table.column_key(column)?;
        Ok(self.table_col_stats.remove(&key).is_some())
    }

    pub fn put_partition_column_stats(
        &self,
        partition: &PartitionIdentifier,
        stats: ColumnStatistics,
    ) -> Result<()> {
        self.ensure_open()?;
        let key = partition.column_stats_key(&stats.column_name)?;
        self.partition_col_stats.insert(key.clone(), stats);
        if self.discard_if_shut_down(&self.partition_col_stats, &key) {
            return Err(CacheError::ShutDown);
        }
        Ok(())
    }

    pub fn get_partition_column_stats(
        &self,
        partition: &PartitionIdentifier,
        column: &str,
    ) -> Result<Option<ColumnStatistics>> {
        let key = partition.column_stats_key(column)?;
        if self.is_shut_down() {
            return Ok(None);
        }
        Ok(self.partition_col_stats.get(&key).map(|s| s.value().clone()))
    }

    // ========================================
    // Maintenance
    // ========================================

    /// Remove zero-referenced layouts. Only finds work under deferred reclaim.
    pub fn sweep_layouts(&self) -> usize {
        self.layouts.sweep()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            catalogs: self.catalogs.len(),
            databases: self.databases.len(),
            tables: self.tables.len(),
            partitions: self.partitions.len(),
            table_column_stats: self.table_col_stats.len(),
            partition_column_stats: self.partition_col_stats.len(),
            layouts: self.layouts.len(),
            hits: self.lookups.hits(),
            misses: self.lookups.misses(),
        }
    }

    /// Drop every cached entry and layout and refuse further writes.
    ///
    /// Call once the service has stopped issuing writes; reads after
    /// shutdown report misses and lists come back empty.
    pub fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }
        let stats = self.stats();
        self.tables.clear();
        self.partitions.clear();
        self.table_col_stats.clear();
        self.partition_col_stats.clear();
        self.databases.clear();
        self.catalogs.clear();
        self.layouts.clear();
        self.patterns.invalidate_all();
        info!(
            "Catalog cache shut down ({} tables, {} partitions, {} layouts released)",
            stats.tables, stats.partitions, stats.layouts
        );
    }
}

impl Default for SharedCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

/// Remove and return every value whose key satisfies `pred`.
fn remove_where<V>(map: &DashMap<String, V>, pred: impl Fn(&str) -> bool) -> Vec<V> {
    let keys: Vec<String> = map
        .iter()
        .filter(|entry| pred(entry.key().as_str()))
        .map(|entry| entry.key().clone())
        .collect();
    keys.into_iter()
        .filter_map(|key| map.remove(&key).map(|(_, value)| value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutReclaim;
    use crate::models::{ColumnStatsData, FieldSchema, StorageLayout};
    use std::collections::HashMap;
    use std::time::Duration;

    fn layout(columns: &[&str]) -> StorageLayout {
        StorageLayout {
            columns: columns
                .iter()
                .map(|c| FieldSchema::new(*c, "string"))
                .collect(),
            input_format: Some("TextInputFormat".into()),
            ..Default::default()
        }
    }

    fn table(db: &str, name: &str, storage: Option<StorageLayout>) -> Table {
        Table {
            catalog: "hive".into(),
            database: db.into(),
            name: name.into(),
            storage,
            ..Default::default()
        }
    }

    fn partition(table: &str, values: &[&str], location: &str) -> Partition {
        Partition {
            catalog: "hive".into(),
            database: "sales".into(),
            table: table.into(),
            values: values.iter().map(|v| v.to_string()).collect(),
            storage: Some(StorageLayout {
                location: location.into(),
                ..layout(&["id"])
            }),
            ..Default::default()
        }
    }

    fn tid(db: &str, name: &str) -> TableIdentifier {
        TableIdentifier::new("hive", db, name).unwrap()
    }

    fn long_stats(column: &str) -> ColumnStatistics {
        ColumnStatistics::new(
            column,
            "bigint",
            ColumnStatsData::Long {
                low: Some(0),
                high: Some(10),
                num_nulls: 0,
                num_distinct: 10,
            },
        )
    }

    #[test]
    fn test_put_get_table() {
        let cache = SharedCache::default();
        cache
            .put_table(table("Sales", "Orders", Some(layout(&["id"]))))
            .unwrap();

        let got = cache.get_table(&tid("sales", "orders")).unwrap().unwrap();
        assert_eq!(got.name, "orders");
        assert_eq!(got.database, "sales");
        assert_eq!(got.storage.unwrap().columns.len(), 1);
    }

    #[test]
    fn test_miss_is_none_and_counted() {
        let cache = SharedCache::default();
        assert!(cache.get_table(&tid("sales", "nope")).unwrap().is_none());
        assert_eq!(cache.stats().misses, 1);
        assert_eq!(cache.stats().hits, 0);
    }

    #[test]
    fn test_overwrite_releases_old_layout() {
        let cache = SharedCache::default();
        cache
            .put_table(table("sales", "orders", Some(layout(&["a"]))))
            .unwrap();
        let old = layout(&["a"]).content_hash();
        assert!(cache.layout_store().contains(&old));

        cache
            .put_table(table("sales", "orders", Some(layout(&["b"]))))
            .unwrap();

        assert!(cache.layout_store().get(&old).is_none());
        assert_eq!(cache.layout_store().len(), 1);
    }

    #[test]
    fn test_overwrite_under_deferred_reclaim_needs_sweep() {
        let cache = SharedCache::new(CacheConfig::deferred(Duration::from_secs(1)));
        assert_eq!(cache.layout_store().reclaim(), LayoutReclaim::Deferred);
        cache
            .put_table(table("sales", "orders", Some(layout(&["a"]))))
            .unwrap();
        cache
            .put_table(table("sales", "orders", Some(layout(&["b"]))))
            .unwrap();
        let old = layout(&["a"]).content_hash();

        assert_eq!(cache.layout_store().ref_count(&old), Some(0));
        assert_eq!(cache.sweep_layouts(), 1);
        assert!(cache.layout_store().get(&old).is_none());
    }

    #[test]
    fn test_shared_layout_survives_one_owner_leaving() {
        let cache = SharedCache::default();
        cache
            .put_table(table("sales", "a", Some(layout(&["id"]))))
            .unwrap();
        cache
            .put_table(table("sales", "b", Some(layout(&["id"]))))
            .unwrap();
        assert_eq!(cache.stats().layouts, 1);

        assert!(cache.invalidate_table(&tid("sales", "a")));
        assert!(cache.get_table(&tid("sales", "b")).unwrap().is_some());
        assert_eq!(cache.stats().layouts, 1);

        assert!(cache.invalidate_table(&tid("sales", "b")));
        assert_eq!(cache.stats().layouts, 0);
        assert!(!cache.invalidate_table(&tid("sales", "b")));
    }

    #[test]
    fn test_list_tables_filters_by_scope_and_pattern() {
        let cache = SharedCache::default();
        for (db, name) in [
            ("sales", "orders_01"),
            ("sales", "orders_2024"),
            ("sales", "returns"),
            ("sales_archive", "orders_01"),
        ] {
            cache.put_table(table(db, name, None)).unwrap();
        }
        let sales = DatabaseIdentifier::new("hive", "sales").unwrap();

        let names: Vec<String> = cache
            .list_tables(&sales, "orders_??|ret*")
            .unwrap()
            .into_iter()
            .map(|id| id.table)
            .collect();
        assert_eq!(names, vec!["orders_01", "returns"]);
        assert_eq!(cache.list_tables(&sales, "*").unwrap().len(), 3);
        assert!(cache.list_tables(&sales, "(").is_err());
    }

    #[test]
    fn test_partitions_share_layout_with_own_location() {
        let cache = SharedCache::default();
        cache
            .put_partition(partition("orders", &["2024", "01"], "/wh/orders/2024/01"))
            .unwrap();
        cache
            .put_partition(partition("orders", &["2024", "02"], "/wh/orders/2024/02"))
            .unwrap();
        assert_eq!(cache.stats().layouts, 1);

        let id = tid("sales", "orders")
            .partition(vec!["2024".into(), "02".into()])
            .unwrap();
        let got = cache.get_partition(&id).unwrap().unwrap();
        assert_eq!(got.storage.unwrap().location, "/wh/orders/2024/02");

        let all = cache.get_partitions(&tid("sales", "orders")).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].values, vec!["2024", "01"]);
    }

    #[test]
    fn test_list_partitions_by_name() {
        let cache = SharedCache::default();
        for month in ["01", "02", "11"] {
            cache
                .put_partition(partition("orders", &["2024", month], "/wh"))
                .unwrap();
        }
        cache
            .put_partition(partition("orders_x", &["2024", "01"], "/wh"))
            .unwrap();

        let ids = cache
            .list_partitions(&tid("sales", "orders"), "2024/0?")
            .unwrap();
        let names: Vec<String> = ids.iter().map(PartitionIdentifier::name).collect();
        assert_eq!(names, vec!["2024/01", "2024/02"]);
    }

    #[test]
    fn test_invalidate_table_cascades() {
        let cache = SharedCache::default();
        let orders = tid("sales", "orders");
        cache
            .put_table(table("sales", "orders", Some(layout(&["id"]))))
            .unwrap();
        cache
            .put_partition(partition("orders", &["2024"], "/wh/2024"))
            .unwrap();
        cache
            .put_table_column_stats(&orders, long_stats("id"))
            .unwrap();
        let part = orders.partition(vec!["2024".into()]).unwrap();
        cache
            .put_partition_column_stats(&part, long_stats("id"))
            .unwrap();

        assert!(cache.invalidate_table(&orders));

        let stats = cache.stats();
        assert_eq!(stats.tables, 0);
        assert_eq!(stats.partitions, 0);
        assert_eq!(stats.table_column_stats, 0);
        assert_eq!(stats.partition_column_stats, 0);
        assert_eq!(stats.layouts, 0);
    }

    #[test]
    fn test_invalidate_partition_keeps_longer_siblings_stats() {
        let cache = SharedCache::default();
        let orders = tid("sales", "orders");
        let short = orders.partition(vec!["a".into()]).unwrap();
        let long = orders.partition(vec!["a".into(), "b".into()]).unwrap();
        cache
            .put_partition(partition("orders", &["a"], "/wh/a"))
            .unwrap();
        cache
            .put_partition_column_stats(&short, long_stats("id"))
            .unwrap();
        cache
            .put_partition_column_stats(&long, long_stats("id"))
            .unwrap();

        assert!(cache.invalidate_partition(&short));
        assert!(cache
            .get_partition_column_stats(&short, "id")
            .unwrap()
            .is_none());
        assert!(cache
            .get_partition_column_stats(&long, "id")
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_invalidate_database_removes_only_its_tables() {
        let cache = SharedCache::default();
        cache
            .put_database(Database {
                catalog: "hive".into(),
                name: "sales".into(),
                ..Default::default()
            })
            .unwrap();
        cache.put_table(table("sales", "a", None)).unwrap();
        cache.put_table(table("sales", "b", None)).unwrap();
        cache.put_table(table("sales_archive", "a", None)).unwrap();

        let sales = DatabaseIdentifier::new("hive", "sales").unwrap();
        assert!(cache.invalidate_database(&sales));
        assert!(cache.get_database(&sales).is_none());
        assert_eq!(cache.stats().tables, 1);
        assert!(cache.get_table(&tid("sales_archive", "a")).unwrap().is_some());
    }

    #[test]
    fn test_catalogs_and_databases() {
        let cache = SharedCache::default();
        cache
            .put_catalog(Catalog {
                name: "Hive".into(),
                location_uri: "/wh".into(),
                ..Default::default()
            })
            .unwrap();
        cache
            .put_catalog(Catalog {
                name: "spark".into(),
                ..Default::default()
            })
            .unwrap();
        for name in ["default", "sales"] {
            cache
                .put_database(Database {
                    catalog: "hive".into(),
                    name: name.into(),
                    parameters: HashMap::from([("k".to_string(), "v".to_string())]),
                    ..Default::default()
                })
                .unwrap();
        }

        assert_eq!(cache.get_catalog("HIVE").unwrap().location_uri, "/wh");
        assert_eq!(cache.list_catalogs("h*").unwrap(), vec!["hive"]);
        let dbs = cache.list_databases("hive", "*").unwrap();
        assert_eq!(dbs.len(), 2);
        assert_eq!(dbs[0].database, "default");
        assert!(cache.invalidate_catalog("hive"));
        assert!(cache.get_catalog("hive").is_none());
    }

    #[test]
    fn test_column_stats_roundtrip_and_validation() {
        let cache = SharedCache::default();
        let orders = tid("sales", "orders");
        cache
            .put_table_column_stats(&orders, long_stats("id"))
            .unwrap();

        let got = cache.get_table_column_stats(&orders, "id").unwrap().unwrap();
        assert_eq!(got.data.num_nulls(), 0);
        assert!(cache.get_table_column_stats(&orders, "ID").unwrap().is_none());
        assert!(cache
            .invalidate_table_column_stats(&orders, "id")
            .unwrap());

        let bad = format!("x{}y", KeyConfig::DELIMITER);
        assert!(cache.get_table_column_stats(&orders, &bad).is_err());
    }

    #[test]
    fn test_rejects_identifier_with_delimiter() {
        let cache = SharedCache::default();
        let bad = format!("a{}b", KeyConfig::DELIMITER);
        let err = cache.put_table(table(&bad, "t", None)).unwrap_err();
        assert!(matches!(err, CacheError::InvalidIdentifier { .. }));
        assert_eq!(cache.stats().tables, 0);
    }

    #[test]
    fn test_invalidate_database_removes_partitions_cached_without_table() {
        let cache = SharedCache::default();
        let orders = tid("sales", "orders");
        let part = orders.partition(vec!["2024".into()]).unwrap();
        cache
            .put_partition(partition("orders", &["2024"], "/wh/2024"))
            .unwrap();
        cache
            .put_partition_column_stats(&part, long_stats("id"))
            .unwrap();
        cache
            .put_table_column_stats(&orders, long_stats("id"))
            .unwrap();
        cache.put_table(table("sales_archive", "orders", None)).unwrap();

        cache.invalidate_database(&orders.database_id());

        assert!(cache.get_partition(&part).unwrap().is_none());
        assert!(cache.list_partitions(&orders, "*").unwrap().is_empty());
        assert!(cache
            .get_partition_column_stats(&part, "id")
            .unwrap()
            .is_none());
        let stats = cache.stats();
        assert_eq!(
            (stats.partitions, stats.table_column_stats, stats.layouts),
            (0, 0, 0)
        );
        assert_eq!(stats.tables, 1);
    }

    #[test]
    fn test_rejects_partition_without_values() {
        let cache = SharedCache::default();
        for values in [&[][..], &[""][..]] {
            let err = cache
                .put_partition(partition("orders", values, "/wh"))
                .unwrap_err();
            assert!(matches!(err, CacheError::InvalidIdentifier { .. }));
        }
        assert_eq!(cache.stats().partitions, 0);
        assert_eq!(cache.stats().layouts, 0);
    }

    #[test]
    fn test_reads_after_shutdown_ignore_late_wrappers() {
        let cache = SharedCache::default();
        cache.shutdown();

        // A write that passed the open check before shutdown can land after
        // the maps were cleared; its layout is already gone.
        let late = partition("orders", &["2024"], "/wh");
        let id = late.identifier().unwrap();
        cache
            .partitions
            .insert(id.key(), PartitionWrapper::new(late, &cache.layouts));
        cache.layouts.clear();

        assert!(cache.get_partition(&id).unwrap().is_none());
        assert!(cache.get_partitions(&id.table).unwrap().is_empty());
        assert!(cache.list_partitions(&id.table, "*").unwrap().is_empty());
    }

    #[test]
    fn test_late_write_is_discarded_after_shutdown() {
        let cache = SharedCache::default();
        cache.shutdown();

        let late = table("sales", "orders", Some(layout(&["id"])));
        let key = late.identifier().unwrap().key();
        cache
            .tables
            .insert(key.clone(), TableWrapper::new(late, &cache.layouts));

        assert!(cache.discard_if_shut_down(&cache.tables, &key));
        assert_eq!(cache.stats().tables, 0);
        assert_eq!(cache.stats().layouts, 0);
    }

    #[test]
    fn test_shutdown_releases_everything() {
        let cache = SharedCache::default();
        cache
            .put_table(table("sales", "orders", Some(layout(&["id"]))))
            .unwrap();
        cache
            .put_partition(partition("orders", &["2024"], "/wh"))
            .unwrap();

        cache.shutdown();
        cache.shutdown();

        assert!(cache.is_shut_down());
        assert_eq!(cache.stats().tables, 0);
        assert_eq!(cache.stats().layouts, 0);
        assert!(cache.get_table(&tid("sales", "orders")).unwrap().is_none());
        assert!(matches!(
            cache.put_table(table("sales", "orders", None)),
            Err(CacheError::ShutDown)
        ));
    }
}
