//! Prometheus metrics recorder and metric names.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Currently joined participants (gauge).
pub const PARTICIPANTS_ACTIVE: &str = "chat_participants_active";
/// Accepted joins (counter).
pub const JOINS_TOTAL: &str = "chat_joins_total";
/// Rejected join handshakes (counter, labels: reason).
pub const JOIN_REJECTIONS_TOTAL: &str = "chat_join_rejections_total";
/// Chat messages broadcast (counter, labels: category).
pub const MESSAGES_TOTAL: &str = "chat_messages_total";
/// Failed per-recipient writes (counter).
pub const DELIVERY_FAILURES_TOTAL: &str = "chat_delivery_failures_total";

/// Install the global Prometheus recorder.
///
/// Must be called at most once per process.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    tracing::info!("Prometheus metrics recorder installed");
    Ok(handle)
}

/// Render Prometheus text format from a recorder handle.
pub fn render(handle: &PrometheusHandle) -> String {
    handle.render()
}
