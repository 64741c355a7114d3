//! Metrics collection for student-service.
//!
//! HTTP request metrics come from the shared middleware; this module owns the
//! Prometheus recorder and the per-operation counter.

use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global Prometheus recorder. Safe to call more than once.
pub fn init_metrics() {
    if METRICS_HANDLE.get().is_some() {
        return;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let _ = METRICS_HANDLE.set(handle);
        }
        Err(e) => tracing::warn!("Failed to install Prometheus recorder: {}", e),
    }
}

/// Get metrics output in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

/// Count a controller operation by outcome (`ok`, `not_found`, `rejected`, `failed`).
pub fn record_operation(operation: &'static str, outcome: &'static str) {
    counter!(
        "student_operations_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}
