/// Collection service endpoints
use crate::{
    aggregation::CollectionMediaResponse,
    api::extract::{Json, Path, Query},
    collection::{
        BulkLinkRequest, BulkLinkResponse, CollectionResponse, CreateCollectionRequest,
        CreatedResponse, LinkMediaRequest, ListCollectionsQuery, ListCollectionsResponse,
        MediaCollectionsResponse, MessageResponse, UpdateCollectionRequest,
    },
    context::CollectionContext,
    error::ShelfResult,
};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Router,
};

/// Build collection routes
///
/// Single-collection reads are served under both `/api/collection` and
/// `/api/collections`; frontends use either.
pub fn routes() -> Router<CollectionContext> {
    Router::new()
        .route("/api/collections", post(create_collection).get(list_collections))
        .route("/api/collections/:id", get(get_collection))
        .route("/api/collections/:id/media", get(collection_media))
        .route("/api/collection", post(link_media))
        .route("/api/collection/:id", get(get_collection).put(update_collection))
        .route("/api/collection/:id/media", get(collection_media))
        .route("/api/collection-media", post(bulk_link_media))
        .route("/api/collection-media/:media_id", get(media_collections))
}

/// POST /api/collections
async fn create_collection(
    State(ctx): State<CollectionContext>,
    Json(req): Json<CreateCollectionRequest>,
) -> ShelfResult<(StatusCode, Json<CreatedResponse>)> {
    let (user_id, name) = req.validate()?;
    let id = ctx
        .collections
        .create_collection(user_id, name, req.description.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            success: true,
            message: "Collection added".to_string(),
            id,
        }),
    ))
}

/// GET /api/collections?user_id=N
async fn list_collections(
    State(ctx): State<CollectionContext>,
    Query(query): Query<ListCollectionsQuery>,
) -> ShelfResult<Json<ListCollectionsResponse>> {
    let collections = ctx.collections.list_collections(query.user_id()?).await?;

    Ok(Json(ListCollectionsResponse {
        success: true,
        collections,
    }))
}

/// GET /api/collection/:id
async fn get_collection(
    State(ctx): State<CollectionContext>,
    Path(id): Path<i64>,
) -> ShelfResult<Json<CollectionResponse>> {
    let collection = ctx.collections.get_collection(id).await?;

    Ok(Json(CollectionResponse {
        success: true,
        collection,
    }))
}

/// PUT /api/collection/:id
async fn update_collection(
    State(ctx): State<CollectionContext>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateCollectionRequest>,
) -> ShelfResult<Json<MessageResponse>> {
    ctx.collections.update_collection(id, req).await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Collection updated".to_string(),
    }))
}

/// POST /api/collection
async fn link_media(
    State(ctx): State<CollectionContext>,
    Json(req): Json<LinkMediaRequest>,
) -> ShelfResult<(StatusCode, Json<CreatedResponse>)> {
    let id = ctx.collections.link_media(req.into_link()?).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            success: true,
            message: "Media added to collection".to_string(),
            id,
        }),
    ))
}

/// POST /api/collection-media
async fn bulk_link_media(
    State(ctx): State<CollectionContext>,
    Json(req): Json<BulkLinkRequest>,
) -> ShelfResult<(StatusCode, Json<BulkLinkResponse>)> {
    let (media_id, user_id, collection_ids) = req.validate()?;
    let created = ctx
        .collections
        .bulk_link_media(media_id, user_id, &collection_ids)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(BulkLinkResponse {
            success: true,
            created,
        }),
    ))
}

/// GET /api/collection-media/:media_id
async fn media_collections(
    State(ctx): State<CollectionContext>,
    Path(media_id): Path<i64>,
) -> ShelfResult<Json<MediaCollectionsResponse>> {
    let collections = ctx.collections.media_collections(media_id).await?;

    Ok(Json(MediaCollectionsResponse {
        success: true,
        collections,
    }))
}

/// GET /api/collection/:id/media
async fn collection_media(
    State(ctx): State<CollectionContext>,
    Path(id): Path<i64>,
) -> ShelfResult<Json<CollectionMediaResponse>> {
    let result = ctx.gateway.collection_media(id).await?;
    Ok(Json(result.into()))
}
