/// Auth service endpoints
use crate::{
    api::extract::Json,
    context::AuthContext,
    credentials::{
        CredentialsRequest, ListUsersResponse, LoginResponse, UserCreatedResponse,
    },
    error::{ShelfError, ShelfResult},
};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};

/// Build auth routes
pub fn routes() -> Router<AuthContext> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/users", get(list_users).post(create_user))
}

async fn store_user(ctx: &AuthContext, req: &CredentialsRequest) -> ShelfResult<i64> {
    ctx.credentials
        .register(
            req.username.as_deref().unwrap_or_default(),
            req.password.as_deref().unwrap_or_default(),
        )
        .await
}

/// POST /api/auth/register
async fn register(
    State(ctx): State<AuthContext>,
    Json(req): Json<CredentialsRequest>,
) -> ShelfResult<(StatusCode, Json<UserCreatedResponse>)> {
    let id = store_user(&ctx, &req).await?;

    Ok((
        StatusCode::CREATED,
        Json(UserCreatedResponse {
            success: true,
            message: "User registered".to_string(),
            id,
        }),
    ))
}

/// POST /api/auth/login
async fn login(
    State(ctx): State<AuthContext>,
    Json(req): Json<CredentialsRequest>,
) -> ShelfResult<Json<LoginResponse>> {
    let (Some(username), Some(password)) = (
        req.username.as_deref().filter(|u| !u.is_empty()),
        req.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(ShelfError::Validation(
            "Username and password required".to_string(),
        ));
    };

    let user_id = ctx.credentials.authenticate(username, password).await?;
    tracing::info!(user_id, "Login successful");

    Ok(Json(LoginResponse {
        success: true,
        user_id,
        message: "Login successful".to_string(),
    }))
}

/// POST /api/auth/logout
///
/// There are no server-side sessions, so this always succeeds.
async fn logout() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Logged out"
    }))
}

/// GET /api/users
async fn list_users(State(ctx): State<AuthContext>) -> ShelfResult<Json<ListUsersResponse>> {
    let users = ctx.credentials.list_users().await?;

    Ok(Json(ListUsersResponse {
        success: true,
        users,
    }))
}

/// POST /api/users
async fn create_user(
    State(ctx): State<AuthContext>,
    Json(req): Json<CredentialsRequest>,
) -> ShelfResult<(StatusCode, Json<UserCreatedResponse>)> {
    let id = store_user(&ctx, &req).await?;

    Ok((
        StatusCode::CREATED,
        Json(UserCreatedResponse {
            success: true,
            message: "User created".to_string(),
            id,
        }),
    ))
}
