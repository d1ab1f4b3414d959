//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status, upstream
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//! - `gateway_bindings_fetch_total` (counter): bindings fetches by service, outcome
//! - `gateway_config_cache_total` (counter): aggregated-config cache hits/misses

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on a dedicated listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed request.
pub fn record_request(method: &str, status: u16, upstream: &str, start: Instant) {
    counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "upstream" => upstream.to_string()
    )
    .increment(1);
    histogram!(
        "gateway_request_duration_seconds",
        "method" => method.to_string(),
        "upstream" => upstream.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record the outcome of one bindings fetch.
pub fn record_bindings_fetch(service: &str, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!(
        "gateway_bindings_fetch_total",
        "service" => service.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record an aggregated-config cache lookup.
pub fn record_config_cache(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!("gateway_config_cache_total", "result" => result).increment(1);
}
