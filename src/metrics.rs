//! Prometheus metrics

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Setup Prometheus metrics exporter
/// Returns a handle that can be used to retrieve metrics
pub fn setup_metrics() -> Result<metrics_exporter_prometheus::PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus exporter: {}", e))?;

    tracing::info!("Prometheus metrics exporter installed");

    Ok(handle)
}

/// Record a request answered from the local cache (`kind` is `meta` or `refs`)
pub fn record_cache_hit(kind: &'static str) {
    metrics::counter!("hub_mirror_cache_hits_total", "kind" => kind).increment(1);
}

/// Record a request that needed the origin
pub fn record_cache_miss(kind: &'static str) {
    metrics::counter!("hub_mirror_cache_misses_total", "kind" => kind).increment(1);
}

/// Record an origin fetch and the status it returned
pub fn record_origin_fetch(kind: &'static str, status: u16) {
    metrics::counter!("hub_mirror_origin_fetches_total",
        "kind" => kind,
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record a listing entry dropped because its path-info could not be read
pub fn record_listing_entry_skipped() {
    metrics::counter!("hub_mirror_listing_entries_skipped_total").increment(1);
}
