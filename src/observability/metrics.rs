//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gate_requests_total` (counter): requests by method, status
//! - `gate_request_duration_seconds` (histogram): latency distribution
//! - `gate_rate_limited_total` (counter): rejected writes by reason
//! - `gate_access_denied_total` (counter): hour/role denials by reason
//! - `gate_rate_limit_tracked_clients` (gauge): clients in the limiter
//! - `gate_messages_total` (counter): messages accepted
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exporter on `addr`. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    let status = status.to_string();
    counter!("gate_requests_total", "method" => method.to_string(), "status" => status.clone())
        .increment(1);
    histogram!("gate_request_duration_seconds", "method" => method.to_string(), "status" => status)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_rate_limited(reason: &'static str) {
    counter!("gate_rate_limited_total", "reason" => reason).increment(1);
}

pub fn record_access_denied(reason: &'static str) {
    counter!("gate_access_denied_total", "reason" => reason).increment(1);
}

pub fn record_tracked_clients(count: usize) {
    gauge!("gate_rate_limit_tracked_clients").set(count as f64);
}

pub fn record_message_created() {
    counter!("gate_messages_total").increment(1);
}
