use std::time::Duration;

use chrono::TimeDelta;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use palaver_types::error::ChatError;

use crate::registry::Registry;

/// Background task that expires participants whose heartbeat went stale.
///
/// Every tick queries the store afresh; nothing about staleness is carried
/// between ticks. A failed sweep is logged and retried on the next tick.
pub async fn run_presence_sweep(registry: Registry, interval: Duration, threshold: TimeDelta) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        match sweep_once(&registry, threshold).await {
            Ok(expired) => {
                if !expired.is_empty() {
                    info!("Presence sweep: expired {} participants {:?}", expired.len(), expired);
                }
            }
            Err(e) => {
                warn!("Presence sweep failed, retrying next tick: {}", e);
            }
        }
    }
}

pub async fn sweep_once(
    registry: &Registry,
    threshold: TimeDelta,
) -> Result<Vec<String>, ChatError> {
    registry.expire_stale(threshold, registry.now()).await
}
