use std::sync::Arc;

use metrics::counter;
use tokio::time::{interval, Duration};

use crate::db::GameStore;

/// Periodically drop game records past their retention window.
pub async fn run_expiry_sweeper(store: Arc<dyn GameStore>, interval_secs: u64) {
    let mut ticker = interval(Duration::from_secs(interval_secs.max(1)));

    loop {
        ticker.tick().await;
        sweep_once(store.as_ref()).await;
    }
}

/// One sweep. Failures are logged and retried on the next tick.
pub async fn sweep_once(store: &dyn GameStore) -> u64 {
    match store.purge_expired().await {
        Ok(0) => {
            tracing::debug!("Expiry sweeper: nothing to purge");
            0
        }
        Ok(purged) => {
            counter!("expired_games_purged_total").increment(purged);
            tracing::info!(purged, "Expired games purged");
            purged
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to purge expired games");
            0
        }
    }
}
