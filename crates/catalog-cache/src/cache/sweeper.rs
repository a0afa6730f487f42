//! Background reclaim of unreferenced layouts.
//!
//! Only useful with [`LayoutReclaim::Deferred`](crate::config::LayoutReclaim);
//! under eager reclaim every sweep finds nothing.

use super::shared::SharedCache;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Periodic sweeper task. Stops when dropped, when [`stop`](Self::stop) is
/// called, or once the cache is shut down.
#[derive(Debug)]
pub struct LayoutSweeper {
    handle: JoinHandle<()>,
}

impl LayoutSweeper {
    /// Spawn a sweeper on the current tokio runtime using the cache's
    /// configured interval.
    pub fn spawn(cache: Arc<SharedCache>) -> Self {
        let interval = cache.config().sweep_interval;
        Self::spawn_with_interval(cache, interval)
    }

    pub fn spawn_with_interval(cache: Arc<SharedCache>, period: Duration) -> Self {
        info!("Starting layout sweeper (every {:?})", period);
        let handle = tokio::spawn(async move {
            // `interval` rejects a zero period.
            let mut ticker = tokio::time::interval(period.max(Duration::from_millis(1)));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if cache.is_shut_down() {
                    debug!("Cache shut down, layout sweeper exiting");
                    break;
                }
                let removed = cache.sweep_layouts();
                if removed > 0 {
                    debug!("Swept {} unreferenced layouts", removed);
                }
            }
        });
        Self { handle }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for LayoutSweeper {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
