//! Prometheus Metrics
//!
//! Forwarded request counts and upstream latency, exposed at `/metrics`.

use std::sync::OnceLock;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use parking_lot::Mutex;

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
static INIT_LOCK: Mutex<()> = Mutex::new(());

/// Initialize the Prometheus metrics recorder.
///
/// Calling this again after a successful install returns the existing handle.
///
/// # Errors
///
/// Returns `BuildError` if the global recorder cannot be installed.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let _guard = INIT_LOCK.lock();
    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    describe_counter!(
        "device_proxy_requests_total",
        "Requests relayed, by method and upstream status"
    );
    describe_counter!(
        "device_proxy_upstream_errors_total",
        "Requests that failed before the upstream answered"
    );
    describe_histogram!(
        "device_proxy_upstream_duration_seconds",
        "Time spent waiting on the upstream"
    );
    Ok(PROMETHEUS_HANDLE.get_or_init(|| handle).clone())
}

/// Get the Prometheus handle for rendering metrics.
#[must_use]
pub fn get_metrics_handle() -> Option<PrometheusHandle> {
    PROMETHEUS_HANDLE.get().cloned()
}

/// Record a relayed upstream answer.
pub fn record_forwarded(method: &str, status: u16, elapsed: Duration) {
    counter!(
        "device_proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("device_proxy_upstream_duration_seconds").record(elapsed.as_secs_f64());
}

/// Record a request the upstream never answered.
pub fn record_upstream_error(method: &str) {
    counter!("device_proxy_upstream_errors_total", "method" => method.to_string()).increment(1);
}
