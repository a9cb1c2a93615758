/// Collection store backed by the collection database
use crate::{
    collection::{NewLink, UpdateCollectionRequest},
    db::collection::{Collection, CollectionMediaLink, CollectionRef},
    error::{ShelfError, ShelfResult},
};
use chrono::Utc;
use sqlx::SqlitePool;

const COLLECTION_NOT_FOUND: &str = "Collection not found";

/// Collection store service
pub struct CollectionStore {
    db: SqlitePool,
}

impl CollectionStore {
    /// Create a new collection store
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Create a collection and return its id
    pub async fn create_collection(
        &self,
        user_id: i64,
        name: &str,
        description: Option<&str>,
    ) -> ShelfResult<i64> {
        let id = sqlx::query(
            "INSERT INTO collection (user_id, name, description, date_added) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(user_id)
        .bind(name)
        .bind(description)
        .bind(Utc::now())
        .execute(&self.db)
        .await?
        .last_insert_rowid();

        tracing::info!(collection_id = id, user_id, "Created collection");

        Ok(id)
    }

    /// Collections owned by a user
    pub async fn list_collections(&self, user_id: i64) -> ShelfResult<Vec<Collection>> {
        let collections = sqlx::query_as::<_, Collection>(
            "SELECT id, user_id, name, description, date_added
             FROM collection WHERE user_id = ?1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(collections)
    }

    /// Get one collection
    pub async fn get_collection(&self, id: i64) -> ShelfResult<Collection> {
        sqlx::query_as::<_, Collection>(
            "SELECT id, user_id, name, description, date_added FROM collection WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ShelfError::NotFound(COLLECTION_NOT_FOUND.to_string()))
    }

    /// Rename and/or re-describe a collection
    pub async fn update_collection(
        &self,
        id: i64,
        update: UpdateCollectionRequest,
    ) -> ShelfResult<()> {
        let mut collection = self.get_collection(id).await?;

        if update.is_empty() {
            return Err(ShelfError::Validation("No fields to update".to_string()));
        }

        if let Some(name) = update.name {
            collection.name = name;
        }
        if let Some(description) = update.description {
            collection.description = description;
        }

        sqlx::query("UPDATE collection SET name = ?1, description = ?2 WHERE id = ?3")
            .bind(&collection.name)
            .bind(&collection.description)
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    /// Add one media id to a collection
    ///
    /// The media id is trusted; the collection id must exist.
    pub async fn link_media(&self, link: NewLink) -> ShelfResult<i64> {
        let date_added = link.date_added.unwrap_or_else(link_timestamp);

        let id = sqlx::query(
            "INSERT INTO collection_media (collection_id, media_id, user_id, date_added, rating)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(link.collection_id)
        .bind(link.media_id)
        .bind(link.user_id)
        .bind(&date_added)
        .bind(link.rating)
        .execute(&self.db)
        .await
        .map_err(|e| ShelfError::on_foreign_key(e, COLLECTION_NOT_FOUND))?
        .last_insert_rowid();

        tracing::debug!(
            link_id = id,
            collection_id = link.collection_id,
            media_id = link.media_id,
            "Linked media to collection"
        );

        Ok(id)
    }

    /// Add one media id to several collections, all or nothing
    pub async fn bulk_link_media(
        &self,
        media_id: i64,
        user_id: i64,
        collection_ids: &[i64],
    ) -> ShelfResult<usize> {
        let date_added = link_timestamp();
        let mut tx = self.db.begin().await?;

        for collection_id in collection_ids {
            sqlx::query(
                "INSERT INTO collection_media (collection_id, media_id, user_id, date_added)
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(collection_id)
            .bind(media_id)
            .bind(user_id)
            .bind(&date_added)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                ShelfError::on_foreign_key(e, &format!("Collection {} not found", collection_id))
            })?;
        }

        tx.commit().await?;

        tracing::info!(
            media_id,
            user_id,
            links = collection_ids.len(),
            "Linked media to collections"
        );

        Ok(collection_ids.len())
    }

    /// Every collection that contains a media id, each once
    pub async fn media_collections(&self, media_id: i64) -> ShelfResult<Vec<CollectionRef>> {
        let collections = sqlx::query_as::<_, CollectionRef>(
            "SELECT id, name, description FROM collection
             WHERE id IN (SELECT collection_id FROM collection_media WHERE media_id = ?1)
             ORDER BY id",
        )
        .bind(media_id)
        .fetch_all(&self.db)
        .await?;

        Ok(collections)
    }

    /// Links of a collection in insertion order
    pub async fn links(&self, collection_id: i64) -> ShelfResult<Vec<CollectionMediaLink>> {
        let links = sqlx::query_as::<_, CollectionMediaLink>(
            "SELECT id, collection_id, media_id, user_id, date_added, rating
             FROM collection_media WHERE collection_id = ?1 ORDER BY id",
        )
        .bind(collection_id)
        .fetch_all(&self.db)
        .await?;

        Ok(links)
    }

    /// Database handle, used by readiness checks
    pub fn pool(&self) -> &SqlitePool {
        &self.db
    }
}

fn link_timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
