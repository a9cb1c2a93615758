/// Request extractors whose rejections use the standard error body
///
/// axum's own `Json`, `Path` and `Query` answer bad input with plain-text
/// 400/415/422 responses. These wrappers turn every rejection into
/// `ShelfError::Validation`, i.e. a 400 with `{"success":false,"error":..}`.
use crate::error::ShelfError;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequest, FromRequestParts,
    },
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ShelfError))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ShelfError))]
pub struct Path<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ShelfError))]
pub struct Query<T>(pub T);

impl From<JsonRejection> for ShelfError {
    fn from(rejection: JsonRejection) -> Self {
        ShelfError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ShelfError {
    fn from(rejection: PathRejection) -> Self {
        ShelfError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ShelfError {
    fn from(rejection: QueryRejection) -> Self {
        ShelfError::Validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        api::{collection, media, test_util::call},
        config::{test_config, ServiceKind},
        context::{CollectionContext, MediaContext},
        db, server,
    };
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::json;
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn media_app() -> Router {
        let pool = db::memory_pool(ServiceKind::Media).await;
        server::build_router(
            MediaContext::with_pool(Arc::new(test_config()), pool),
            media::routes(),
        )
    }

    #[tokio::test]
    async fn test_wrong_typed_body_is_json_400() {
        let app = media_app().await;
        let body = json!({"title": 3, "creator": "c", "type": "book", "user_id": 1});

        let (status, body) = call(&app, "POST", "/api/media", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_missing_content_type_is_json_400() {
        let app = media_app().await;
        let request = Request::builder()
            .method("POST")
            .uri("/api/media")
            .body(Body::from(r#"{"title":"t"}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_bad_path_and_query_are_json_400() {
        let app = media_app().await;

        let (status, body) = call(&app, "GET", "/api/media/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, body) = call(&app, "GET", "/api/media?user_id=x", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_collection_rejections_use_error_body() {
        let pool = db::memory_pool(ServiceKind::Collection).await;
        let config = Arc::new(test_config());
        let source = Arc::new(
            crate::aggregation::HttpMediaSource::new(&config.media_client).unwrap(),
        );
        let app = server::build_router(
            CollectionContext::with_source(config, pool, source),
            collection::routes(),
        );

        let cases = [
            ("POST", "/api/collections", Some(json!({"user_id": 1, "name": 5}))),
            ("POST", "/api/collection-media", Some(json!({"collection_ids": "3"}))),
            ("GET", "/api/collection/abc", None),
            ("GET", "/api/collections/abc/media", None),
        ];

        for (method, uri, body) in cases {
            let (status, reply) = call(&app, method, uri, body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{} {}", method, uri);
            assert_eq!(reply["success"], false, "{} {}", method, uri);
        }
    }
}
