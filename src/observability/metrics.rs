//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): forwarded requests by route, method, status
//! - `gateway_request_duration_seconds` (histogram): backend round-trip latency
//! - `gateway_upstream_failures_total` (counter): transport failures by route, kind
//! - `role_cache_hits_total`, `role_cache_misses_total` (counters)
//! - `role_fetches_total`, `role_fetch_joined_total`, `role_fetch_failures_total` (counters)
//! - `role_fetch_duration_seconds` (histogram): role endpoint latency
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    let builder = PrometheusBuilder::new().with_http_listener(addr);
    match builder.install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(route: &'static str, method: &str, status: u16, elapsed: Duration) {
    counter!(
        "gateway_requests_total",
        "route" => route,
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("gateway_request_duration_seconds", "route" => route).record(elapsed.as_secs_f64());
}

pub fn record_upstream_failure(route: &'static str, kind: &str) {
    counter!(
        "gateway_upstream_failures_total",
        "route" => route,
        "kind" => kind.to_string()
    )
    .increment(1);
}

/// Bump one of the role cache counters listed above.
pub fn record_role_event(name: &'static str) {
    counter!(name).increment(1);
}

pub fn record_role_fetch_duration(elapsed: Duration) {
    histogram!("role_fetch_duration_seconds").record(elapsed.as_secs_f64());
}
