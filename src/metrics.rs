use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus exporter and register all application metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    // Pre-register counters so they appear even before the first increment.
    counter!("games_submitted_total").absolute(0);
    counter!("games_scored_total").absolute(0);
    counter!("game_evaluations_failed_total").absolute(0);
    counter!("corrupt_game_records_total").absolute(0);
    counter!("expired_games_purged_total").absolute(0);

    Ok(handle)
}

/// Handle backed by a recorder that is not installed globally, for tests that
/// build several apps in one process.
pub fn detached_handle() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}
