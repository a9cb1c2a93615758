/// Media service endpoints
use crate::{
    api::extract::{Json, Path, Query},
    context::MediaContext,
    error::ShelfResult,
    media::{
        CreateMediaRequest, ListMediaQuery, ListMediaResponse, MediaCreatedResponse,
        MediaResponse, MetadataResponse, UpdateMediaRequest,
    },
};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Router,
};

/// Build media routes
pub fn routes() -> Router<MediaContext> {
    Router::new()
        .route("/api/media", post(create_media).get(list_media))
        .route("/api/media/:id", get(get_media).patch(update_media))
        .route("/api/media/:id/metadata", get(get_metadata))
}

/// POST /api/media
async fn create_media(
    State(ctx): State<MediaContext>,
    Json(req): Json<CreateMediaRequest>,
) -> ShelfResult<(StatusCode, Json<MediaCreatedResponse>)> {
    let (media, metadata) = req.into_parts()?;
    let (id, date_added) = ctx.catalog.create_media(media, metadata).await?;

    Ok((
        StatusCode::CREATED,
        Json(MediaCreatedResponse {
            success: true,
            id,
            date_added,
        }),
    ))
}

/// GET /api/media
async fn list_media(
    State(ctx): State<MediaContext>,
    Query(query): Query<ListMediaQuery>,
) -> ShelfResult<Json<ListMediaResponse>> {
    let media = ctx.catalog.list_media(query.user_id).await?;
    Ok(Json(ListMediaResponse { media }))
}

/// GET /api/media/:id
async fn get_media(
    State(ctx): State<MediaContext>,
    Path(id): Path<i64>,
) -> ShelfResult<Json<MediaResponse>> {
    let media = ctx.catalog.get_media(id).await?;

    Ok(Json(MediaResponse {
        success: true,
        media: Some(media),
    }))
}

/// PATCH /api/media/:id
async fn update_media(
    State(ctx): State<MediaContext>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateMediaRequest>,
) -> ShelfResult<Json<MediaResponse>> {
    let (patch, metadata) = req.into_parts()?;
    let media = ctx.catalog.update_media(id, patch, metadata).await?;

    Ok(Json(MediaResponse {
        success: true,
        media: Some(media),
    }))
}

/// GET /api/media/:id/metadata
async fn get_metadata(
    State(ctx): State<MediaContext>,
    Path(id): Path<i64>,
) -> ShelfResult<Json<MetadataResponse>> {
    let metadata = ctx.catalog.get_metadata(id).await?;

    Ok(Json(MetadataResponse {
        success: true,
        metadata,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::test_util::call,
        config::{test_config, ServiceKind},
        db, server,
    };
    use serde_json::{json, Value};
    use std::sync::Arc;

    async fn app() -> Router {
        let pool = db::memory_pool(ServiceKind::Media).await;
        let ctx = MediaContext::with_pool(Arc::new(test_config()), pool);
        server::build_router(ctx, routes())
    }

    fn book(user_id: i64, title: &str) -> Value {
        json!({
            "title": title,
            "creator": "Octavia E. Butler",
            "type": "book",
            "user_id": user_id,
            "year": 1993,
            "metadata": {"isbn": "0-941423-99-9"}
        })
    }

    async fn create(app: &Router, body: Value) -> i64 {
        let (status, body) = call(app, "POST", "/api/media", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn test_create_and_fetch() {
        let app = app().await;

        let (status, created) =
            call(&app, "POST", "/api/media", Some(book(1, "Parable of the Sower"))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["success"], true);
        assert!(created["date_added"].is_string());
        let id = created["id"].as_i64().unwrap();

        let (status, body) = call(&app, "GET", &format!("/api/media/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["media"]["title"], "Parable of the Sower");
        assert_eq!(body["media"]["type"], "book");
        assert_eq!(body["media"]["status"], "Not Started");
        assert_eq!(body["media"]["date_added"], created["date_added"]);

        let (_, body) = call(&app, "GET", &format!("/api/media/{}/metadata", id), None).await;
        assert_eq!(
            body["metadata"],
            json!([{"name": "isbn", "value": "0-941423-99-9"}])
        );
    }

    #[tokio::test]
    async fn test_create_reports_missing_fields() {
        let app = app().await;
        let (status, body) = call(&app, "POST", "/api/media", Some(json!({"type": "book"}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required fields: title, creator, user_id");
    }

    #[tokio::test]
    async fn test_missing_media_is_404() {
        let app = app().await;
        let (status, body) = call(&app, "GET", "/api/media/999", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Media not found");
    }

    #[tokio::test]
    async fn test_patch_updates_and_replaces_metadata() {
        let app = app().await;
        let id = create(&app, book(1, "Kindred")).await;
        let uri = format!("/api/media/{}", id);

        let patch = json!({
            "status": "In Progress",
            "metadata": [{"name": "pages", "value": "264"}]
        });
        let (status, body) = call(&app, "PATCH", &uri, Some(patch)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["media"]["status"], "In Progress");
        assert_eq!(body["media"]["title"], "Kindred");

        let (_, body) = call(&app, "GET", &format!("{}/metadata", uri), None).await;
        assert_eq!(body["metadata"], json!([{"name": "pages", "value": "264"}]));
    }

    #[tokio::test]
    async fn test_patch_rejects_unknown_status() {
        let app = app().await;
        let id = create(&app, book(1, "Kindred")).await;

        let (status, _) = call(
            &app,
            "PATCH",
            &format!("/api/media/{}", id),
            Some(json!({"status": "Abandoned"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_patch_missing_media_is_404() {
        let app = app().await;
        let (status, _) =
            call(&app, "PATCH", "/api/media/77", Some(json!({"title": "x"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_media() {
        let app = app().await;
        create(&app, book(1, "Kindred")).await;
        create(&app, book(2, "Dawn")).await;

        let (status, body) = call(&app, "GET", "/api/media", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["media"].as_array().unwrap().len(), 2);

        let (_, body) = call(&app, "GET", "/api/media?user_id=2", None).await;
        let media = body["media"].as_array().unwrap();
        assert_eq!(media.len(), 1);
        assert_eq!(media[0]["title"], "Dawn");
    }
}
