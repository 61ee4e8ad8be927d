//! Metrics collection and exposition.
//!
//! # Metrics
//! - `kv_router_requests_total` (counter): lookups by outcome
//! - `kv_router_mirrored_total` (counter): mirrored commands by cluster
//! - `kv_router_reloads_total` (counter): configuration reloads by result
//! - `kv_router_routes` (gauge): prefix rules in the active table
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Outcome labels are static strings, no per-key cardinality
//! - Cluster labels are shared `Arc<str>`s, so recording does not copy them

use std::net::SocketAddr;
use std::sync::Arc;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder with an HTTP scrape listener.
///
/// Must be called from inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record the outcome of a single lookup.
pub fn record_route(outcome: &'static str) {
    metrics::counter!("kv_router_requests_total", "outcome" => outcome).increment(1);
}

/// Record a command copied to a mirror cluster.
///
/// The label shares `cluster`'s allocation.
pub fn record_mirror(cluster: &Arc<str>) {
    metrics::counter!("kv_router_mirrored_total", "cluster" => Arc::clone(cluster)).increment(1);
}

/// Record a configuration reload attempt.
pub fn record_reload(success: bool) {
    let result = if success { "success" } else { "failure" };
    metrics::counter!("kv_router_reloads_total", "result" => result).increment(1);
}

/// Publish the number of prefix rules in the active table.
pub fn set_route_count(count: usize) {
    metrics::gauge!("kv_router_routes").set(count as f64);
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics::SharedString;

    #[test]
    fn mirror_label_shares_cluster_name() {
        let cluster: Arc<str> = Arc::from("shadow");
        let label = SharedString::from(Arc::clone(&cluster));
        assert_eq!(&*label, "shadow");
        assert_eq!(Arc::strong_count(&cluster), 2);

        // No recorder installed: recording is a no-op.
        record_mirror(&cluster);
        assert_eq!(Arc::strong_count(&cluster), 2);
    }
}
