//! Metrics collection and exposition.
//!
//! # Metrics
//! - `edge_requests_total` (counter): requests by route, method, status
//! - `edge_request_duration_seconds` (histogram): latency by route
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - The exporter serves its own HTTP listener, separate from routed traffic
//! - Every label has a fixed value set; extension methods share `"other"`

use std::net::SocketAddr;
use std::time::Instant;

use axum::http::{Method, StatusCode};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::routing::RouteKind;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Label for `method`: the standard methods by name, anything else `"other"`.
pub fn method_label(method: &Method) -> &'static str {
    match *method {
        Method::GET => "GET",
        Method::HEAD => "HEAD",
        Method::POST => "POST",
        Method::PUT => "PUT",
        Method::DELETE => "DELETE",
        Method::CONNECT => "CONNECT",
        Method::OPTIONS => "OPTIONS",
        Method::TRACE => "TRACE",
        Method::PATCH => "PATCH",
        _ => "other",
    }
}

/// Record one completed request.
pub fn record_request(route: RouteKind, method: &Method, status: StatusCode, start: Instant) {
    metrics::counter!(
        "edge_requests_total",
        "route" => route.as_str(),
        "method" => method_label(method),
        "status" => status.as_u16().to_string()
    )
    .increment(1);
    metrics::histogram!("edge_request_duration_seconds", "route" => route.as_str())
        .record(start.elapsed().as_secs_f64());
}
