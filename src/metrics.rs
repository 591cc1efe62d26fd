use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus exporter and register all application metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    // Pre-register counters so they appear even before the first increment.
    counter!("trades_created_total").absolute(0);
    counter!("trades_updated_total").absolute(0);
    counter!("trades_deleted_total").absolute(0);
    counter!("winrate_recalculations_total").absolute(0);

    histogram!("winrate_recalculation_seconds").record(0.0);

    Ok(handle)
}

/// A handle backed by a recorder that is not installed globally. Used where
/// more than one app is built per process.
pub fn detached_handle() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}
