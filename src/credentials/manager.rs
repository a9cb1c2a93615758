/// Credential store backed by the auth database
use crate::{
    credentials::password,
    db::user::{User, UserSummary},
    error::{ShelfError, ShelfResult},
};
use sqlx::SqlitePool;

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const USERNAME_TAKEN: &str = "Username already exists";

/// Credential store service
pub struct CredentialStore {
    db: SqlitePool,
}

impl CredentialStore {
    /// Create a new credential store
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Register a new user and return its id
    pub async fn register(&self, username: &str, password: &str) -> ShelfResult<i64> {
        if username.is_empty() || password.is_empty() {
            return Err(ShelfError::Validation(
                "Username and password required".to_string(),
            ));
        }

        if self.username_exists(username).await? {
            return Err(ShelfError::Conflict(USERNAME_TAKEN.to_string()));
        }

        let password_hash = hash_blocking(password.to_string()).await?;

        // The UNIQUE index still guards against a concurrent registration
        let id = sqlx::query("INSERT INTO user (username, password_hash) VALUES (?1, ?2)")
            .bind(username)
            .bind(&password_hash)
            .execute(&self.db)
            .await
            .map_err(|e| ShelfError::on_unique(e, USERNAME_TAKEN))?
            .last_insert_rowid();

        tracing::info!(user_id = id, username, "Registered user");

        Ok(id)
    }

    /// Verify credentials and return the user id
    ///
    /// Unknown usernames and wrong passwords produce the same error.
    pub async fn authenticate(&self, username: &str, password: &str) -> ShelfResult<i64> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash FROM user WHERE username = ?1",
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ShelfError::Authentication(INVALID_CREDENTIALS.to_string()))?;

        let candidate = password.to_string();
        let stored = user.password_hash.clone();
        let valid = tokio::task::spawn_blocking(move || password::verify_password(&candidate, &stored))
            .await
            .map_err(|e| ShelfError::Internal(format!("Password verification task failed: {}", e)))??;

        if !valid {
            tracing::debug!(username, "Rejected login");
            return Err(ShelfError::Authentication(INVALID_CREDENTIALS.to_string()));
        }

        Ok(user.id)
    }

    /// List every user without password hashes
    pub async fn list_users(&self) -> ShelfResult<Vec<UserSummary>> {
        let users = sqlx::query_as::<_, UserSummary>("SELECT id, username FROM user ORDER BY id")
            .fetch_all(&self.db)
            .await?;

        Ok(users)
    }

    /// Database handle, used by readiness checks
    pub fn pool(&self) -> &SqlitePool {
        &self.db
    }

    /// Check if username exists
    async fn username_exists(&self, username: &str) -> ShelfResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user WHERE username = ?1")
            .bind(username)
            .fetch_one(&self.db)
            .await?;

        Ok(count > 0)
    }
}

/// Argon2 is CPU bound, keep it off the async workers
async fn hash_blocking(password: String) -> ShelfResult<String> {
    tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|e| ShelfError::Internal(format!("Password hashing task failed: {}", e)))?
}
