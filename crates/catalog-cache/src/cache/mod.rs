//! The shared cache and its maintenance.
//!
//! - [`SharedCache`]: entity maps, layout dedup, listing and invalidation
//! - [`LayoutSweeper`]: periodic reclaim for deferred layout release
//! - [`CacheStats`]: sizes and lookup counters

mod shared;
mod stats;
mod sweeper;

pub use shared::SharedCache;
pub use stats::CacheStats;
pub use sweeper::LayoutSweeper;
