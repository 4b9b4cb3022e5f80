//! Metrics collection and exposition.
//!
//! # Metrics
//! - `paper_provider_attempts_total` (counter): provider calls by prompt, outcome
//! - `paper_credentials_expired_total` (counter): expiries by reason
//! - `paper_credentials_active` (gauge): credentials currently usable
//! - `paper_flow_duration_seconds` (histogram): flow latency by flow, outcome

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_provider_attempt(prompt: &str, outcome: &'static str) {
    counter!(
        "paper_provider_attempts_total",
        "prompt" => prompt.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_credential_expired(reason: &'static str) {
    counter!("paper_credentials_expired_total", "reason" => reason).increment(1);
}

pub fn record_active_credentials(count: usize) {
    gauge!("paper_credentials_active").set(count as f64);
}

pub fn record_flow(flow: &str, success: bool, start: Instant) {
    let outcome = if success { "success" } else { "error" };
    histogram!(
        "paper_flow_duration_seconds",
        "flow" => flow.to_string(),
        "outcome" => outcome
    )
    .record(start.elapsed().as_secs_f64());
}
