/// Per-service application contexts
///
/// Each service gets its own database pool and store. Nothing is shared
/// between services except immutable configuration.
use crate::{
    aggregation::{AggregationGateway, HttpMediaSource, MediaSource},
    collection::CollectionStore,
    config::{ServerConfig, ServiceKind},
    credentials::CredentialStore,
    db,
    error::ShelfResult,
    media::MediaCatalog,
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// State every service router needs
pub trait ServiceState: Clone + Send + Sync + 'static {
    /// Which service this state belongs to
    const KIND: ServiceKind;

    /// Process configuration
    fn config(&self) -> &ServerConfig;

    /// The service's database pool
    fn db(&self) -> &SqlitePool;
}

/// Open, migrate and check the database of one service
async fn open_database(config: &ServerConfig, kind: ServiceKind) -> ShelfResult<SqlitePool> {
    let options = db::DatabaseOptions {
        max_connections: config.storage.max_connections,
        ..Default::default()
    };

    let pool = db::create_pool(config.storage.db_path(kind), options).await?;
    db::run_migrations(&pool, kind).await?;
    db::test_connection(&pool).await?;

    tracing::info!(service = %kind, path = ?config.storage.db_path(kind), "Database ready");

    Ok(pool)
}

/// Auth service context
#[derive(Clone)]
pub struct AuthContext {
    pub config: Arc<ServerConfig>,
    pub credentials: Arc<CredentialStore>,
}

impl AuthContext {
    pub async fn new(config: Arc<ServerConfig>) -> ShelfResult<Self> {
        let db = open_database(&config, ServiceKind::Auth).await?;
        Ok(Self::with_pool(config, db))
    }

    pub fn with_pool(config: Arc<ServerConfig>, db: SqlitePool) -> Self {
        Self {
            config,
            credentials: Arc::new(CredentialStore::new(db)),
        }
    }
}

impl ServiceState for AuthContext {
    const KIND: ServiceKind = ServiceKind::Auth;

    fn config(&self) -> &ServerConfig {
        &self.config
    }

    fn db(&self) -> &SqlitePool {
        self.credentials.pool()
    }
}

/// Media service context
#[derive(Clone)]
pub struct MediaContext {
    pub config: Arc<ServerConfig>,
    pub catalog: Arc<MediaCatalog>,
}

impl MediaContext {
    pub async fn new(config: Arc<ServerConfig>) -> ShelfResult<Self> {
        let db = open_database(&config, ServiceKind::Media).await?;
        Ok(Self::with_pool(config, db))
    }

    pub fn with_pool(config: Arc<ServerConfig>, db: SqlitePool) -> Self {
        Self {
            config,
            catalog: Arc::new(MediaCatalog::new(db)),
        }
    }
}

impl ServiceState for MediaContext {
    const KIND: ServiceKind = ServiceKind::Media;

    fn config(&self) -> &ServerConfig {
        &self.config
    }

    fn db(&self) -> &SqlitePool {
        self.catalog.pool()
    }
}

/// Collection service context
#[derive(Clone)]
pub struct CollectionContext {
    pub config: Arc<ServerConfig>,
    pub collections: Arc<CollectionStore>,
    pub gateway: Arc<AggregationGateway>,
}

impl CollectionContext {
    pub async fn new(config: Arc<ServerConfig>) -> ShelfResult<Self> {
        let db = open_database(&config, ServiceKind::Collection).await?;
        let source = Arc::new(HttpMediaSource::new(&config.media_client)?);

        tracing::info!(
            media_service = %config.media_client.base_url,
            timeout_secs = config.media_client.timeout_secs,
            max_concurrent = config.media_client.max_concurrent,
            "Media service client configured"
        );

        Ok(Self::with_source(config, db, source))
    }

    pub fn with_source(
        config: Arc<ServerConfig>,
        db: SqlitePool,
        source: Arc<dyn MediaSource>,
    ) -> Self {
        let collections = Arc::new(CollectionStore::new(db));
        let gateway = Arc::new(AggregationGateway::new(
            Arc::clone(&collections),
            source,
            config.media_client.max_concurrent,
        ));

        Self {
            config,
            collections,
            gateway,
        }
    }
}

impl ServiceState for CollectionContext {
    const KIND: ServiceKind = ServiceKind::Collection;

    fn config(&self) -> &ServerConfig {
        &self.config
    }

    fn db(&self) -> &SqlitePool {
        self.collections.pool()
    }
}
