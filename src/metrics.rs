/// Prometheus metrics shared by all services in the process
///
/// Request counters are labelled by route template, never by raw path, so
/// ids in URLs do not explode label cardinality.

use axum::{
    extract::{MatchedPath, Request},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};
use std::time::Instant;

lazy_static! {
    pub static ref REQUESTS: IntCounterVec = register_int_counter_vec!(
        "shelf_http_requests_total",
        "Requests served, by method, route template and status code",
        &["method", "route", "status"]
    )
    .unwrap();

    pub static ref REQUEST_SECONDS: HistogramVec = register_histogram_vec!(
        "shelf_http_request_duration_seconds",
        "Time spent serving a request",
        &["method", "route"],
        vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0]
    )
    .unwrap();

    /// One increment per media id resolved during collection aggregation
    pub static ref MEDIA_FETCHES: IntCounterVec = register_int_counter_vec!(
        "media_fetch_total",
        "Media service lookups made while hydrating collections, by outcome",
        &["outcome"]
    )
    .unwrap();
}

/// Prometheus text exposition of the default registry
pub fn render_metrics() -> String {
    let mut out = Vec::new();
    if let Err(e) = TextEncoder::new().encode(&prometheus::gather(), &mut out) {
        tracing::warn!(error = %e, "Failed to encode metrics");
    }
    String::from_utf8_lossy(&out).into_owned()
}

pub fn observe_request(method: &str, route: &str, status: u16, seconds: f64) {
    let status = status.to_string();
    REQUESTS.with_label_values(&[method, route, &status]).inc();
    REQUEST_SECONDS
        .with_label_values(&[method, route])
        .observe(seconds);
}

pub fn record_media_fetch(outcome: &str) {
    MEDIA_FETCHES.with_label_values(&[outcome]).inc();
}

/// Middleware timing every request
pub async fn track_requests(req: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = req.method().as_str().to_owned();
    let route = match req.extensions().get::<MatchedPath>() {
        Some(matched) => matched.as_str().to_owned(),
        None => "unmatched".to_owned(),
    };

    let response = next.run(req).await;
    observe_request(
        &method,
        &route,
        response.status().as_u16(),
        started.elapsed().as_secs_f64(),
    );
    response
}

/// GET /metrics
pub async fn metrics_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        render_metrics(),
    )
}
