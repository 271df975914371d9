//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define request metrics (RPS, latency, errors)
//! - Expose a Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `quillpress_requests_total` (counter): total requests by method, route, status
//! - `quillpress_request_duration_seconds` (histogram): latency distribution
//!
//! # Design Decisions
//! - Updates go through the `metrics` facade; without an installed
//!   recorder they are no-ops, so tests need no setup
//! - The route label is the matched pattern, never the raw path, to keep
//!   label cardinality bounded

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

pub const REQUESTS_TOTAL: &str = "quillpress_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "quillpress_request_duration_seconds";

/// Install the Prometheus recorder and its scrape listener on `addr`.
///
/// Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one finished request.
pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    let method = method.to_string();
    let route = route.to_string();
    let status = status.to_string();

    metrics::counter!(
        REQUESTS_TOTAL,
        "method" => method.clone(),
        "route" => route.clone(),
        "status" => status.clone()
    )
    .increment(1);
    metrics::histogram!(
        REQUEST_DURATION_SECONDS,
        "method" => method,
        "route" => route,
        "status" => status
    )
    .record(start.elapsed().as_secs_f64());
}
