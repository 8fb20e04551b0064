//! Metrics collection and exposition.
//!
//! # Metrics
//! - `todo_requests_total` (counter): requests by resource, method, status
//! - `todo_request_duration_seconds` (histogram): latency distribution
//! - `todo_items` (gauge): todos currently stored
//!
//! Recording is a no-op until a recorder is installed, so the store and
//! handlers can record unconditionally.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed request.
pub fn record_request(resource: &str, method: &str, status: u16, start: Instant) {
    let resource = resource.to_string();
    let method = method.to_string();
    let status = status.to_string();
    counter!(
        "todo_requests_total",
        "resource" => resource.clone(),
        "method" => method.clone(),
        "status" => status.clone()
    )
    .increment(1);
    histogram!(
        "todo_request_duration_seconds",
        "resource" => resource,
        "method" => method,
        "status" => status
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record the current size of the todo collection.
pub fn record_todo_count(count: usize) {
    gauge!("todo_items").set(count as f64);
}
