//! Catalog Cache - in-memory cache for table catalog metadata.
//!
//! Caches catalogs, databases, tables, partitions and column statistics for a
//! metadata service. Storage layouts, which are usually identical across the
//! partitions of a table, are stored once per distinct content and shared by
//! reference; callers always get back a fully assembled, independent copy.
//!
//! # Example
//!
//! ```rust
//! use catalog_cache::{SharedCache, Table, TableIdentifier, StorageLayout};
//!
//! # fn main() -> catalog_cache::Result<()> {
//! let cache = SharedCache::default();
//! cache.put_table(Table {
//!     catalog: "hive".into(),
//!     database: "sales".into(),
//!     name: "orders".into(),
//!     storage: Some(StorageLayout::default()),
//!     ..Default::default()
//! })?;
//!
//! let id = TableIdentifier::new("hive", "sales", "orders")?;
//! let table = cache.get_table(&id)?.expect("cached");
//! assert_eq!(table.storage.unwrap().bucket_columns, Some(vec![]));
//! # Ok(())
//! # }
//! ```

pub mod assemble;
pub mod cache;
pub mod config;
pub mod error;
pub mod filter;
pub mod keys;
pub mod layout_store;
pub mod models;
pub mod wrapper;

pub use cache::{CacheStats, LayoutSweeper, SharedCache};
pub use config::{CacheConfig, KeyConfig, LayoutReclaim};
pub use error::{CacheError, Result};
pub use filter::{NamePattern, PatternCache};
pub use layout_store::StorageLayoutStore;
pub use models::{
    Catalog, ColumnStatistics, ColumnStatsData, Database, DatabaseIdentifier, FieldSchema,
    LayoutHash, Partition, PartitionIdentifier, SerDeInfo, SkewedInfo, SortOrder, StorageLayout,
    Table, TableIdentifier,
};
pub use wrapper::{PartitionWrapper, TableWrapper};
