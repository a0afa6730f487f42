//! Content-addressed store of shared storage layouts.
//!
//! Each distinct layout is stored once under its [`LayoutHash`] together with
//! the number of wrappers referencing it. Insert, increment, decrement and
//! removal for one hash all happen under that hash's shard lock, so racing
//! writers converge on a single stored instance and a consistent count.

use crate::config::LayoutReclaim;
use crate::models::{LayoutHash, StorageLayout};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, warn};

struct LayoutEntry {
    layout: StorageLayout,
    refs: usize,
}

/// Reference-counted, content-addressed layout store.
pub struct StorageLayoutStore {
    entries: DashMap<LayoutHash, LayoutEntry>,
    reclaim: LayoutReclaim,
}

impl StorageLayoutStore {
    pub fn new(reclaim: LayoutReclaim) -> Self {
        Self {
            entries: DashMap::new(),
            reclaim,
        }
    }

    pub fn reclaim(&self) -> LayoutReclaim {
        self.reclaim
    }

    /// Record one more reference to `layout`, storing its shared part if this
    /// is the first. Always returns the content hash.
    pub fn put_if_absent(&self, layout: &StorageLayout) -> LayoutHash {
        let hash = layout.content_hash();
        match self.entries.entry(hash) {
            Entry::Occupied(mut occupied) => {
                occupied.get_mut().refs += 1;
            }
            Entry::Vacant(vacant) => {
                vacant.insert(LayoutEntry {
                    layout: layout.shared_part(),
                    refs: 1,
                });
                debug!("Stored new storage layout {}", hash);
            }
        }
        hash
    }

    /// Copy of the stored layout, if present.
    pub fn get(&self, hash: &LayoutHash) -> Option<StorageLayout> {
        self.entries.get(hash).map(|entry| entry.layout.clone())
    }

    pub fn contains(&self, hash: &LayoutHash) -> bool {
        self.entries.contains_key(hash)
    }

    /// Drop one reference and return how many remain.
    ///
    /// Under eager reclaim the entry is removed as its count reaches zero;
    /// under deferred reclaim it stays until [`StorageLayoutStore::sweep`].
    pub fn release(&self, hash: &LayoutHash) -> usize {
        match self.entries.entry(*hash) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                entry.refs = entry.refs.saturating_sub(1);
                let remaining = entry.refs;
                if remaining == 0 && self.reclaim == LayoutReclaim::Eager {
                    occupied.remove();
                    debug!("Removed unreferenced storage layout {}", hash);
                }
                remaining
            }
            Entry::Vacant(_) => {
                warn!("Release of unknown storage layout {}", hash);
                0
            }
        }
    }

    /// Number of live references to `hash`, if stored.
    pub fn ref_count(&self, hash: &LayoutHash) -> Option<usize> {
        self.entries.get(hash).map(|entry| entry.refs)
    }

    /// Remove every zero-referenced layout. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.refs > 0);
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            debug!("Swept {} unreferenced storage layouts", removed);
        }
        removed
    }

    /// Number of stored layouts, referenced or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every layout regardless of references. Only for shutdown, after
    /// every wrapper is gone.
    pub(crate) fn clear(&self) {
        self.entries.clear();
    }
}

impl Default for StorageLayoutStore {
    fn default() -> Self {
        Self::new(LayoutReclaim::default())
    }
}
