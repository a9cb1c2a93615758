/// HTTP server setup and routing
use crate::{
    api,
    config::{CorsConfig, ServerConfig, ServiceKind},
    context::{AuthContext, CollectionContext, MediaContext, ServiceState},
    error::{ShelfError, ShelfResult},
    metrics,
};
use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use futures::future;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

/// Build the router of one service
/// Returns Router<()> because state is already provided
pub fn build_router<S: ServiceState>(ctx: S, routes: Router<S>) -> Router {
    let cors = cors_layer(&ctx.config().cors);

    Router::new()
        .route("/metrics", get(metrics::metrics_handler))
        .merge(api::health::routes::<S>())
        .merge(routes)
        .fallback(not_found)
        // Provide state - converts Router<S> to Router<()>
        .with_state(ctx)
        .layer(middleware::from_fn(metrics::track_requests))
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}

/// CORS for the configured frontend origins; `*` allows any origin
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origin = if config.allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
}

/// 404 handler
async fn not_found() -> Response {
    ShelfError::NotFound("Endpoint not found".to_string()).into_response()
}

/// Start every enabled service and wait until all of them stop
pub async fn serve(config: Arc<ServerConfig>) -> ShelfResult<()> {
    let services = config
        .service
        .enabled
        .iter()
        .map(|kind| serve_service(*kind, Arc::clone(&config)));

    future::try_join_all(services).await?;

    Ok(())
}

/// Open one service's database and serve its router
async fn serve_service(kind: ServiceKind, config: Arc<ServerConfig>) -> ShelfResult<()> {
    let app = match kind {
        ServiceKind::Auth => build_router(
            AuthContext::new(Arc::clone(&config)).await?,
            api::auth::routes(),
        ),
        ServiceKind::Media => build_router(
            MediaContext::new(Arc::clone(&config)).await?,
            api::media::routes(),
        ),
        ServiceKind::Collection => build_router(
            CollectionContext::new(Arc::clone(&config)).await?,
            api::collection::routes(),
        ),
    };

    let addr = format!("{}:{}", config.service.hostname, config.service.port_for(kind));

    // Create TCP listener
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ShelfError::Internal(format!("Failed to bind {} service to {}: {}", kind, addr, e)))?;

    info!(service = %kind, "Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(kind))
        .await
        .map_err(|e| ShelfError::Internal(format!("{} server error: {}", kind, e)))?;

    info!(service = %kind, "Stopped");

    Ok(())
}

async fn shutdown_signal(kind: ServiceKind) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(service = %kind, error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!(service = %kind, "Shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::test_config, db};
    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::ServiceExt;

    async fn media_app(origins: Vec<String>) -> Router {
        let mut config = test_config();
        config.cors.allowed_origins = origins;
        let pool = db::memory_pool(ServiceKind::Media).await;
        build_router(
            MediaContext::with_pool(Arc::new(config), pool),
            api::media::routes(),
        )
    }

    async fn preflight(app: Router, origin: &str) -> Response {
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/api/media")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PATCH")
            .body(Body::empty())
            .unwrap();
        app.oneshot(request).await.unwrap()
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin() {
        let app = media_app(vec!["http://localhost:3000".to_string()]).await;
        let response = preflight(app, "http://localhost:3000").await;

        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:3000"
        );
    }

    #[tokio::test]
    async fn test_cors_ignores_other_origins() {
        let app = media_app(vec!["http://localhost:3000".to_string()]).await;
        let response = preflight(app, "http://evil.example").await;

        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[tokio::test]
    async fn test_cors_wildcard() {
        let app = media_app(vec!["*".to_string()]).await;
        let response = preflight(app, "http://anywhere.example").await;

        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let app = media_app(vec![]).await;

        let request = Request::builder().uri("/api/media").body(Body::empty()).unwrap();
        app.clone().oneshot(request).await.unwrap();

        let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("http_requests_total"));
        assert!(text.contains("/api/media"));
    }
}
