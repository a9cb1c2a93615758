/// Database layer for the SortedShelf services
///
/// Each service owns its own SQLite database. This module builds the pools
/// and applies the schema embedded from `./migrations/<service>`.

pub mod collection;
pub mod media;
pub mod user;

use crate::{
    config::ServiceKind,
    error::{ShelfError, ShelfResult},
};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;

/// Database connection options
#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    pub max_connections: u32,
    pub enable_wal: bool,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            max_connections: 10,
            enable_wal: true,
        }
    }
}

/// Create a SQLite connection pool
pub async fn create_pool(path: &Path, options: DatabaseOptions) -> ShelfResult<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(options.max_connections)
        .connect_with(
            SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(if options.enable_wal {
                    SqliteJournalMode::Wal
                } else {
                    SqliteJournalMode::Delete
                })
                .foreign_keys(true)
                .busy_timeout(std::time::Duration::from_secs(5)),
        )
        .await?;

    Ok(pool)
}

/// Apply the embedded schema for one service
pub async fn run_migrations(pool: &SqlitePool, kind: ServiceKind) -> ShelfResult<()> {
    let migrator = match kind {
        ServiceKind::Auth => sqlx::migrate!("./migrations/auth"),
        ServiceKind::Media => sqlx::migrate!("./migrations/media"),
        ServiceKind::Collection => sqlx::migrate!("./migrations/collection"),
    };

    migrator
        .run(pool)
        .await
        .map_err(|e| ShelfError::Internal(format!("Migration failed for {}: {}", kind, e)))?;

    Ok(())
}

/// Test database connection
pub async fn test_connection(pool: &SqlitePool) -> ShelfResult<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Single-connection in-memory database with a service schema applied
#[cfg(test)]
pub(crate) async fn memory_pool(kind: ServiceKind) -> SqlitePool {
    use std::str::FromStr;

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(
            SqliteConnectOptions::from_str("sqlite::memory:")
                .unwrap()
                .foreign_keys(true),
        )
        .await
        .unwrap();

    run_migrations(&pool, kind).await.unwrap();
    pool
}
