//! Liveness Sweeper
//!
//! Clients can disappear without a close frame (network partition, crash).
//! The sweeper periodically evicts connections with no inbound activity
//! inside the timeout window and closes their sockets.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::registry::ConnectionRegistry;

/// Start the periodic sweep task.
///
/// The first tick is consumed immediately, so the first sweep runs one
/// `interval` after startup. The task exits when `shutdown` is cancelled.
pub fn spawn_sweeper(
    registry: Arc<ConnectionRegistry>,
    interval: Duration,
    timeout: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    let period = interval.max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;
        loop {
            tokio::select! {
                () = shutdown.cancelled() => {
                    debug!("Liveness sweeper stopped");
                    break;
                }
                _ = ticker.tick() => {
                    sweep(&registry, timeout, Instant::now());
                }
            }
        }
    })
}

/// Run one sweep pass and return how many connections were evicted.
pub fn sweep(registry: &ConnectionRegistry, timeout: Duration, now: Instant) -> usize {
    let mut evicted = 0usize;

    for entry in registry.snapshot() {
        if !entry.meta.is_stale(timeout, now) {
            continue;
        }
        // Re-checked under the lock: an auth after the snapshot wins
        let Some(handle) = registry.remove_if_stale(entry.handle.id(), timeout, now) else {
            continue;
        };
        if !handle.close() {
            debug!(conn_id = %handle.id(), "Evicted connection was already closed");
        }
        info!(
            conn_id = %handle.id(),
            user_id = entry.meta.user_id.as_deref().unwrap_or("-"),
            "Cleaning up inactive client"
        );
        evicted += 1;
    }

    if evicted > 0 {
        info!(evicted, remaining = registry.len(), "Liveness sweep completed");
    }
    evicted
}
