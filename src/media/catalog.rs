/// Media catalog service backed by the media database
use crate::{
    db::media::{MediaItem, MediaSummary, MetadataEntry},
    error::{ShelfError, ShelfResult},
    media::{MediaPatch, NewMedia},
};
use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};

const MEDIA_COLUMNS: &str =
    "id, user_id, title, creator, year, type, publish_date, cover_url, status, date_added";

/// Media catalog service
pub struct MediaCatalog {
    db: SqlitePool,
}

impl MediaCatalog {
    /// Create a new media catalog
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Insert a media item and its metadata in one transaction
    pub async fn create_media(
        &self,
        media: NewMedia,
        metadata: Vec<MetadataEntry>,
    ) -> ShelfResult<(i64, DateTime<Utc>)> {
        let now = Utc::now();
        let mut tx = self.db.begin().await?;

        let id = sqlx::query(
            "INSERT INTO media (user_id, title, creator, year, type, publish_date, cover_url, status, date_added)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(media.user_id)
        .bind(&media.title)
        .bind(&media.creator)
        .bind(media.year)
        .bind(&media.media_type)
        .bind(&media.publish_date)
        .bind(&media.cover_url)
        .bind(media.status.as_str())
        .bind(now)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        insert_metadata(&mut tx, id, &metadata).await?;

        tx.commit().await?;

        tracing::info!(
            media_id = id,
            user_id = media.user_id,
            metadata_entries = metadata.len(),
            "Created media item"
        );

        Ok((id, now))
    }

    /// Get one media item
    pub async fn get_media(&self, id: i64) -> ShelfResult<MediaItem> {
        let row = sqlx::query(&format!("SELECT {} FROM media WHERE id = ?1", MEDIA_COLUMNS))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(media_not_found)?;

        MediaItem::from_row(&row)
    }

    /// Apply a partial update; a supplied metadata list replaces the whole set
    pub async fn update_media(
        &self,
        id: i64,
        patch: MediaPatch,
        metadata: Option<Vec<MetadataEntry>>,
    ) -> ShelfResult<MediaItem> {
        let mut tx = self.db.begin().await?;

        let row = sqlx::query(&format!("SELECT {} FROM media WHERE id = ?1", MEDIA_COLUMNS))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(media_not_found)?;
        let mut item = MediaItem::from_row(&row)?;

        patch.apply(&mut item);

        sqlx::query(
            "UPDATE media
             SET title = ?1, creator = ?2, year = ?3, type = ?4, status = ?5,
                 publish_date = ?6, cover_url = ?7
             WHERE id = ?8",
        )
        .bind(&item.title)
        .bind(&item.creator)
        .bind(item.year)
        .bind(&item.media_type)
        .bind(item.status.as_str())
        .bind(&item.publish_date)
        .bind(&item.cover_url)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if let Some(entries) = &metadata {
            sqlx::query("DELETE FROM media_metadata WHERE media_id = ?1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            insert_metadata(&mut tx, id, entries).await?;
        }

        tx.commit().await?;

        tracing::debug!(
            media_id = id,
            metadata_replaced = metadata.is_some(),
            "Updated media item"
        );

        Ok(item)
    }

    /// List media, optionally narrowed to one owner
    pub async fn list_media(&self, user_id: Option<i64>) -> ShelfResult<Vec<MediaSummary>> {
        let items = match user_id {
            Some(user_id) => {
                sqlx::query_as::<_, MediaSummary>(
                    "SELECT id, user_id, title, creator, year, type, publish_date, status
                     FROM media WHERE user_id = ?1 ORDER BY id",
                )
                .bind(user_id)
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, MediaSummary>(
                    "SELECT id, user_id, title, creator, year, type, publish_date, status
                     FROM media ORDER BY id",
                )
                .fetch_all(&self.db)
                .await?
            }
        };

        Ok(items)
    }

    /// Metadata for a media id; unknown ids simply have none
    pub async fn get_metadata(&self, media_id: i64) -> ShelfResult<Vec<MetadataEntry>> {
        let entries = sqlx::query_as::<_, MetadataEntry>(
            "SELECT name, value FROM media_metadata WHERE media_id = ?1 ORDER BY id",
        )
        .bind(media_id)
        .fetch_all(&self.db)
        .await?;

        Ok(entries)
    }

    /// Database handle, used by readiness checks
    pub fn pool(&self) -> &SqlitePool {
        &self.db
    }
}

async fn insert_metadata(
    tx: &mut Transaction<'_, Sqlite>,
    media_id: i64,
    entries: &[MetadataEntry],
) -> ShelfResult<()> {
    for entry in entries {
        sqlx::query("INSERT INTO media_metadata (media_id, name, value) VALUES (?1, ?2, ?3)")
            .bind(media_id)
            .bind(&entry.name)
            .bind(&entry.value)
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}

fn media_not_found() -> ShelfError {
    ShelfError::NotFound("Media not found".to_string())
}
