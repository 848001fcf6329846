//! Metrics collection and exposition.
//!
//! # Metrics
//! - `edgeops_probe_requests_total` (counter): probes served, by endpoint
//! - `edgeops_probe_duration_seconds` (histogram): handler latency, by endpoint
//! - `edgeops_console_cycles_total` (counter): console poll cycles, by outcome
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - The Prometheus listener is opt-in (`observability.metrics_enabled`)

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics recorder"),
    }
}

/// Record one served probe.
pub fn record_probe(endpoint: &'static str, started: Instant) {
    metrics::counter!("edgeops_probe_requests_total", "endpoint" => endpoint).increment(1);
    metrics::histogram!("edgeops_probe_duration_seconds", "endpoint" => endpoint)
        .record(started.elapsed().as_secs_f64());
}

/// Record a finished console cycle.
pub fn record_cycle(outcome: &'static str) {
    metrics::counter!("edgeops_console_cycles_total", "outcome" => outcome).increment(1);
}
