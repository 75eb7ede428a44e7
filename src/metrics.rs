use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize Prometheus metrics exporter
///
/// Fails if a recorder is already installed for this process.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    init_metric_descriptions();

    Ok(handle)
}

/// Initialize metric descriptions (can be called multiple times safely)
fn init_metric_descriptions() {
    describe_counter!(
        "livecost_predictions_total",
        "Total number of composed predictions"
    );
    describe_histogram!(
        "livecost_prediction_duration_seconds",
        "Composition duration in seconds"
    );
    describe_counter!(
        "livecost_region_cache_total",
        "Region multiplier lookups by cache outcome"
    );
    describe_counter!(
        "livecost_composition_failures_total",
        "Compositions that failed, by collaborator"
    );
    describe_counter!(
        "livecost_cache_swept_total",
        "Expired cache entries removed by sweeps"
    );
    describe_gauge!("livecost_info", "Service version information");

    gauge!("livecost_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Record a successful prediction
pub fn record_prediction(confidence: &'static str, duration: Duration) {
    counter!("livecost_predictions_total", "confidence" => confidence).increment(1);
    histogram!("livecost_prediction_duration_seconds").record(duration.as_secs_f64());
}

/// Record a region lookup served from (or missing) the cache
pub fn record_region_cache(hit: bool) {
    let outcome = if hit { "hit" } else { "miss" };
    counter!("livecost_region_cache_total", "outcome" => outcome).increment(1);
}

/// Record a failed composition
pub fn record_composition_failure(component: &'static str) {
    counter!("livecost_composition_failures_total", "component" => component).increment(1);
}

/// Record entries removed by an expiry sweep
pub fn record_cache_swept(removed: u64) {
    counter!("livecost_cache_swept_total").increment(removed);
}
