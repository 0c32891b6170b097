//! Stale Sweep Task
//!
//! Background task that periodically drops entries past their freshness
//! window. Reads never need it: a stale entry is still served until replaced.
//! The sweep only bounds memory for keys nobody asks for again.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedCache;

/// Spawns a background task that sweeps stale entries every `interval_secs`.
///
/// The write lock is held only for the sweep itself. Sweeping does not count
/// evictions.
///
/// # Returns
/// A JoinHandle for the spawned task, aborted during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = shared_cache::<serde_json::Value>();
/// let sweep_handle = spawn_sweep_task(cache.clone(), 60);
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task<T>(cache: SharedCache<T>, interval_secs: u64) -> JoinHandle<()>
where
    T: Send + Sync + 'static,
{
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting stale sweep task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.write().await.sweep_stale();

            if removed > 0 {
                info!("Stale sweep: removed {} entries", removed);
            } else {
                debug!("Stale sweep: nothing to remove");
            }
        }
    })
}
