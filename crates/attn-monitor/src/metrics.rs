//! Prometheus metrics for monitoring sessions.

use std::net::SocketAddr;

use attn_models::StatusKind;
use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::{MonitorError, MonitorResult};

/// Metric names as constants for consistency.
pub mod names {
    pub const FRAMES_CLASSIFIED_TOTAL: &str = "attn_frames_classified_total";
    pub const SESSIONS_PERSISTED_TOTAL: &str = "attn_sessions_persisted_total";
}

/// Install the Prometheus recorder with a scrape endpoint on `addr`.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> MonitorResult<()> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| MonitorError::Metrics(e.to_string()))
}

/// Record one classified frame.
pub fn record_frame(status: StatusKind) {
    counter!(names::FRAMES_CLASSIFIED_TOTAL, "status" => status.as_str()).increment(1);
}

/// Record a session log written to the store.
pub fn record_session_persisted() {
    counter!(names::SESSIONS_PERSISTED_TOTAL).increment(1);
}
