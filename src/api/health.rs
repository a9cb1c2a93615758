/// Health check endpoints for liveness and readiness
///
/// Every service exposes the same three routes:
/// - `/health`: static status with service name and version
/// - `/health/live`: the process answers
/// - `/health/ready`: the service database answers (503 otherwise)

use crate::{context::ServiceState, db};
use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use serde_json::{json, Value};
use std::time::Instant;

/// Build health check routes
pub fn routes<S: ServiceState>() -> Router<S> {
    Router::new()
        .route("/health", get(health_basic::<S>))
        .route("/health/live", get(liveness))
        .route("/health/ready", get(readiness::<S>))
}

/// Basic health check
pub async fn health_basic<S: ServiceState>() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": S::KIND.as_str(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Liveness check
pub async fn liveness() -> Json<Value> {
    Json(json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Readiness check
///
/// Returns 200 if the database round-trip succeeds, 503 if not.
pub async fn readiness<S: ServiceState>(
    State(ctx): State<S>,
) -> Result<Json<Value>, StatusCode> {
    let start = Instant::now();

    if let Err(e) = db::test_connection(ctx.db()).await {
        tracing::warn!(service = %S::KIND, error = %e, "readiness_failed: database check failed");
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    Ok(Json(json!({
        "status": "ready",
        "service": S::KIND.as_str(),
        "database_ms": start.elapsed().as_millis() as u64,
        "version": env!("CARGO_PKG_VERSION")
    })))
}
