/// Unified error types for the SortedShelf services
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type shared by the auth, media and collection services
#[derive(Error, Debug)]
pub enum ShelfError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Missing or malformed request fields
    #[error("{0}")]
    Validation(String),

    /// Bad credentials
    #[error("{0}")]
    Authentication(String),

    /// Not found errors
    #[error("{0}")]
    NotFound(String),

    /// Conflict errors (e.g., duplicate username)
    #[error("{0}")]
    Conflict(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ShelfError {
    /// Convert a write failure, turning a UNIQUE violation into a conflict
    pub fn on_unique(err: sqlx::Error, message: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ShelfError::Conflict(message.to_string())
            }
            _ => ShelfError::Database(err),
        }
    }

    /// Convert a write failure, turning a FOREIGN KEY violation into not-found
    pub fn on_foreign_key(err: sqlx::Error, message: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                ShelfError::NotFound(message.to_string())
            }
            _ => ShelfError::Database(err),
        }
    }

    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ShelfError::Validation(_) => StatusCode::BAD_REQUEST,
            ShelfError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ShelfError::NotFound(_) => StatusCode::NOT_FOUND,
            ShelfError::Conflict(_) => StatusCode::CONFLICT,
            ShelfError::Database(_) | ShelfError::Internal(_) | ShelfError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

/// Convert ShelfError to HTTP response
impl IntoResponse for ShelfError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "request_failed");
        }

        let body = Json(ErrorResponse {
            success: false,
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}

/// Result type alias for service operations
pub type ShelfResult<T> = Result<T, ShelfError>;
