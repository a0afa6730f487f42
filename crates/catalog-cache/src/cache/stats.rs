//! Cache statistics.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time view of cache contents and lookup counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of cached catalogs.
    pub catalogs: usize,
    /// Number of cached databases.
    pub databases: usize,
    /// Number of cached table wrappers.
    pub tables: usize,
    /// Number of cached partition wrappers.
    pub partitions: usize,
    /// Number of cached table column statistics.
    pub table_column_stats: usize,
    /// Number of cached partition column statistics.
    pub partition_column_stats: usize,
    /// Number of distinct storage layouts held, referenced or not.
    pub layouts: usize,
    /// Table and partition lookups answered from the cache.
    pub hits: u64,
    /// Table and partition lookups that found nothing.
    pub misses: u64,
}

impl CacheStats {
    /// Fraction of lookups that hit, or `None` before any lookup.
    pub fn hit_ratio(&self) -> Option<f64> {
        let total = self.hits + self.misses;
        (total > 0).then(|| self.hits as f64 / total as f64)
    }
}

/// Lock-free hit/miss counters.
#[derive(Debug, Default)]
pub(crate) struct LookupCounters {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl LookupCounters {
    /// Count a lookup outcome and pass it through.
    pub fn record<T>(&self, found: Option<T>) -> Option<T> {
        let counter = if found.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}
