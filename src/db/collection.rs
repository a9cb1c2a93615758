/// Collection database models
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Collection record in the database
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Collection {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub date_added: DateTime<Utc>,
}

/// Collection fields returned by the reverse media lookup
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct CollectionRef {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// Link between a collection and a media id owned by the media service
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct CollectionMediaLink {
    pub id: i64,
    pub collection_id: i64,
    /// Not checked against the media service
    pub media_id: i64,
    pub user_id: i64,
    pub date_added: Option<String>,
    pub rating: Option<i64>,
}
