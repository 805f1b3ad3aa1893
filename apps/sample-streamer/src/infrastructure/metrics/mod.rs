//! Prometheus Metrics Module
//!
//! Exposes streamer metrics in Prometheus format.
//!
//! # Metrics Categories
//!
//! - **Sessions**: sessions started, currently active, and their duration
//! - **Chunks**: chunks and bytes pushed to clients
//! - **Errors**: failed pushes
//!
//! # Integration
//!
//! Metrics are exposed at `/metrics` on the streamer port.

use std::sync::OnceLock;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use parking_lot::Mutex;

// =============================================================================
// Global Metrics Handle
// =============================================================================

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
    register_metrics();
    Ok(PROMETHEUS_HANDLE.get_or_init(|| handle).clone())
}

/// Get the Prometheus handle for rendering metrics.
///
/// Returns `None` if metrics have not been initialized.
#[must_use]
pub fn get_metrics_handle() -> Option<PrometheusHandle> {
    PROMETHEUS_HANDLE.get().cloned()
}

// =============================================================================
// Metric Registration
// =============================================================================

fn register_metrics() {
    describe_counter!(
        "sample_streamer_sessions_total",
        "Total streaming sessions started"
    );
    describe_gauge!(
        "sample_streamer_active_sessions",
        "Number of sessions currently streaming"
    );
    describe_histogram!(
        "sample_streamer_session_duration_seconds",
        "Time from session start to close"
    );
    describe_counter!(
        "sample_streamer_chunks_sent_total",
        "Total chunk messages pushed to clients"
    );
    describe_counter!(
        "sample_streamer_bytes_sent_total",
        "Total payload bytes pushed to clients"
    );
    describe_counter!(
        "sample_streamer_push_failures_total",
        "Total pushes that failed on the transport"
    );
}

// =============================================================================
// Metric Recording Functions
// =============================================================================

/// Record a session entering the streaming phase.
pub fn record_session_started() {
    counter!("sample_streamer_sessions_total").increment(1);
    gauge!("sample_streamer_active_sessions").increment(1.0);
}

/// Record a session closing.
pub fn record_session_closed(duration: Duration) {
    gauge!("sample_streamer_active_sessions").decrement(1.0);
    histogram!("sample_streamer_session_duration_seconds").record(duration.as_secs_f64());
}

/// Record a chunk message pushed to a client.
pub fn record_chunk_sent(bytes: usize) {
    counter!("sample_streamer_chunks_sent_total").increment(1);
    counter!("sample_streamer_bytes_sent_total").increment(bytes as u64);
}

/// Record a failed push.
pub fn record_push_failure() {
    counter!("sample_streamer_push_failures_total").increment(1);
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_without_recorder_is_a_no_op() {
        record_session_started();
        record_chunk_sent(42);
        record_push_failure();
        record_session_closed(Duration::from_millis(5));
    }

    #[test]
    fn init_is_idempotent() {
        let first = init_metrics().unwrap();
        let second = init_metrics().unwrap();
        record_chunk_sent(10);
        assert!(second.render().contains("sample_streamer_chunks_sent_total"));
        drop(first);
        assert!(get_metrics_handle().is_some());
    }
}
