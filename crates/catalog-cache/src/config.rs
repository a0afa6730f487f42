//! Centralized configuration for the catalog cache.
//!
//! Constants live on unit structs the way the rest of the crate reads them;
//! [`CacheConfig`] carries the knobs a service may override at construction.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Key layout constants.
pub struct KeyConfig;

impl KeyConfig {
    /// Reserved delimiter joining key components. A control character never
    /// present in catalog identifiers.
    pub const DELIMITER: char = '\u{0001}';
    /// Separator between partition values in a partition's display name.
    pub const PARTITION_NAME_SEPARATOR: &'static str = "/";
}

/// When zero-referenced storage layouts leave the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutReclaim {
    /// Removed inside the release that drops the last reference.
    #[default]
    Eager,
    /// Kept until an explicit or periodic sweep.
    Deferred,
}

/// Configuration for cache behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct CacheConfig {
    /// Reclaim policy for storage layouts.
    pub layout_reclaim: LayoutReclaim,
    /// Interval between background sweeps (deferred reclaim only).
    pub sweep_interval: Duration,
    /// Maximum number of compiled name patterns kept.
    pub pattern_cache_capacity: u64,
    /// Time-to-live for compiled name patterns.
    pub pattern_cache_ttl: Duration,
}

impl CacheConfig {
    /// Default sweep interval (1 minute).
    pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;
    /// Default number of memoized patterns.
    pub const DEFAULT_PATTERN_CACHE_CAPACITY: u64 = 256;
    /// Default pattern TTL (10 minutes).
    pub const DEFAULT_PATTERN_CACHE_TTL_SECS: u64 = 600;

    /// Config using deferred reclaim with the given sweep interval.
    pub fn deferred(sweep_interval: Duration) -> Self {
        Self {
            layout_reclaim: LayoutReclaim::Deferred,
            sweep_interval,
            ..Self::default()
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            layout_reclaim: LayoutReclaim::Eager,
            sweep_interval: Duration::from_secs(CacheConfig::DEFAULT_SWEEP_INTERVAL_SECS),
            pattern_cache_capacity: CacheConfig::DEFAULT_PATTERN_CACHE_CAPACITY,
            pattern_cache_ttl: Duration::from_secs(CacheConfig::DEFAULT_PATTERN_CACHE_TTL_SECS),
        }
    }
}
