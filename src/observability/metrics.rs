//! Prometheus metrics.
//!
//! # Metrics
//! - `hub_requests_total` (counter): requests by method, status
//! - `hub_request_duration_seconds` (histogram): handler latency
//! - `hub_rank_fetches_total` (counter): rank resolutions by mode, outcome
//! - `hub_provider_calls_total` (counter): provider calls by provider, mode
//! - `hub_rate_limited_total` (counter): rejected requests by reason
//!
//! Recording is always safe; without an installed exporter the macros are
//! no-ops.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    let status = status.to_string();
    counter!("hub_requests_total", "method" => method.to_string(), "status" => status.clone()).increment(1);
    histogram!("hub_request_duration_seconds", "method" => method.to_string(), "status" => status)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_rank_fetch(mode: &'static str, outcome: &'static str) {
    counter!("hub_rank_fetches_total", "mode" => mode, "outcome" => outcome).increment(1);
}

pub fn record_provider_call(provider: &'static str, mode: &'static str) {
    counter!("hub_provider_calls_total", "provider" => provider, "mode" => mode).increment(1);
}

pub fn record_rate_limited(reason: &'static str) {
    counter!("hub_rate_limited_total", "reason" => reason).increment(1);
}
