//! Background expiry sweep for the region cache
//!
//! Reads already treat expired entries as absent; the sweep only reclaims
//! the storage they occupy.

use crate::cache::TtlCache;
use crate::error::CostError;
use crate::metrics;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};

/// Spawn the periodic sweep task
///
/// The first sweep runs one full `interval` after spawning.
pub fn spawn_sweep_task(cache: Arc<dyn TtlCache>, interval: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        sweep_loop(cache, interval).await;
    })
}

async fn sweep_loop(cache: Arc<dyn TtlCache>, period: Duration) {
    let mut interval = time::interval_at(time::Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        match cache.sweep_expired().await {
            Ok(removed) => {
                metrics::record_cache_swept(removed);
                tracing::info!(removed = removed, "Scheduled cache sweep completed");
            }
            Err(e) => {
                tracing::error!(error = %e, "Scheduled cache sweep failed");
            }
        }
    }
}

/// Run a sweep immediately (CLI and tests)
pub async fn run_sweep_now(cache: &dyn TtlCache) -> Result<u64, CostError> {
    tracing::info!("Running manual cache sweep");

    let removed = cache.sweep_expired().await?;
    metrics::record_cache_swept(removed);

    tracing::info!(removed = removed, "Manual cache sweep completed");

    Ok(removed)
}
