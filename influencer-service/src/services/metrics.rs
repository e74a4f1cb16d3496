//! Metrics collection and Prometheus export.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;

/// Global handle to the Prometheus recorder.
pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Safe to call more than once; only the
/// first call installs anything.
pub fn init_metrics() {
    METRICS_HANDLE.get_or_init(|| {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        if let Err(e) = metrics::set_global_recorder(recorder) {
            tracing::warn!(error = %e, "Metrics recorder already installed");
        }
        handle
    });
}

/// Current metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized".to_string())
}

/// Record how long a repository query took.
pub fn record_db_query(operation: &'static str, elapsed: Duration) {
    histogram!("influencer_db_query_duration_seconds", "operation" => operation)
        .record(elapsed.as_secs_f64());
}

/// Count an `ai_analysis` normalization by outcome.
pub fn record_normalization(outcome: &'static str) {
    counter!("influencer_ai_analysis_normalized_total", "outcome" => outcome).increment(1);
}
