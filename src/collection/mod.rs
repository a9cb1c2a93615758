/// Collections and their links to media items
///
/// Media ids stored here belong to the media service and are never checked
/// against it; readers must tolerate links to media that no longer exist.

mod store;

pub use store::CollectionStore;

use crate::{
    db::collection::{Collection, CollectionRef},
    error::{ShelfError, ShelfResult},
    validation::{self, double_option},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Validated single link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLink {
    pub collection_id: i64,
    pub media_id: i64,
    pub user_id: i64,
    pub rating: Option<i64>,
    pub date_added: Option<String>,
}

/// POST /api/collections body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCollectionRequest {
    #[serde(default)]
    pub user_id: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl CreateCollectionRequest {
    pub fn validate(&self) -> ShelfResult<(i64, &str)> {
        let name = validation::non_empty(&self.name);
        if !validation::is_supplied(self.user_id.as_ref()) || name.is_none() {
            return Err(ShelfError::Validation("user_id and name required".to_string()));
        }
        let user_id = validation::require_i64(self.user_id.as_ref(), "user_id")?;
        Ok((user_id, name.unwrap_or_default()))
    }
}

/// GET /api/collections query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListCollectionsQuery {
    pub user_id: Option<String>,
}

impl ListCollectionsQuery {
    pub fn user_id(&self) -> ShelfResult<i64> {
        let raw = self
            .user_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ShelfError::Validation("user_id required".to_string()))?;
        raw.trim()
            .parse()
            .map_err(|_| ShelfError::Validation("user_id must be an integer".to_string()))
    }
}

/// PUT /api/collection/:id body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCollectionRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
}

impl UpdateCollectionRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

/// POST /api/collection body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkMediaRequest {
    #[serde(default)]
    pub user_id: Option<Value>,
    #[serde(default)]
    pub collection_id: Option<Value>,
    #[serde(default)]
    pub media_id: Option<Value>,
    #[serde(default)]
    pub rating: Option<Value>,
    #[serde(default)]
    pub date_added: Option<String>,
}

impl LinkMediaRequest {
    pub fn into_link(self) -> ShelfResult<NewLink> {
        if !validation::is_supplied(self.user_id.as_ref())
            || !validation::is_supplied(self.collection_id.as_ref())
            || !validation::is_supplied(self.media_id.as_ref())
        {
            return Err(ShelfError::Validation(
                "user_id, collection_id, and media_id required".to_string(),
            ));
        }

        Ok(NewLink {
            collection_id: validation::require_i64(self.collection_id.as_ref(), "collection_id")?,
            media_id: validation::require_i64(self.media_id.as_ref(), "media_id")?,
            user_id: validation::require_i64(self.user_id.as_ref(), "user_id")?,
            rating: validation::optional_i64(self.rating.as_ref(), "rating")?,
            date_added: self.date_added.filter(|d| !d.is_empty()),
        })
    }
}

/// POST /api/collection-media body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BulkLinkRequest {
    #[serde(default)]
    pub user_id: Option<Value>,
    #[serde(default)]
    pub media_id: Option<Value>,
    #[serde(default)]
    pub collection_ids: Option<Vec<Value>>,
}

impl BulkLinkRequest {
    /// Returns (media_id, user_id, collection ids). Entries of
    /// `collection_ids` that are not JSON integers are dropped.
    pub fn validate(&self) -> ShelfResult<(i64, i64, Vec<i64>)> {
        if !validation::is_supplied(self.user_id.as_ref())
            || !validation::is_supplied(self.media_id.as_ref())
            || self.collection_ids.as_ref().map_or(true, Vec::is_empty)
        {
            return Err(ShelfError::Validation(
                "user_id, media_id, and collection_ids required".to_string(),
            ));
        }

        let media_id = validation::require_i64(self.media_id.as_ref(), "media_id")?;
        let user_id = validation::require_i64(self.user_id.as_ref(), "user_id")?;
        let collection_ids = self
            .collection_ids
            .iter()
            .flatten()
            .filter_map(Value::as_i64)
            .collect();

        Ok((media_id, user_id, collection_ids))
    }
}

/// Creation response for collections and links
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub success: bool,
    pub message: String,
    pub id: i64,
}

/// Generic acknowledgement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// Bulk link response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkLinkResponse {
    pub success: bool,
    pub created: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionResponse {
    pub success: bool,
    pub collection: Collection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListCollectionsResponse {
    pub success: bool,
    pub collections: Vec<Collection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaCollectionsResponse {
    pub success: bool,
    pub collections: Vec<CollectionRef>,
}
