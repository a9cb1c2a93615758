/// Media catalog database models
use crate::error::{ShelfError, ShelfResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row};
use std::fmt;
use std::str::FromStr;

/// Reading progress of a media item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaStatus {
    #[default]
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Completed")]
    Completed,
}

impl MediaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaStatus::NotStarted => "Not Started",
            MediaStatus::InProgress => "In Progress",
            MediaStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for MediaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaStatus {
    type Err = ShelfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Not Started" => Ok(MediaStatus::NotStarted),
            "In Progress" => Ok(MediaStatus::InProgress),
            "Completed" => Ok(MediaStatus::Completed),
            other => Err(ShelfError::Validation(format!(
                "Invalid status '{}': expected Not Started, In Progress or Completed",
                other
            ))),
        }
    }
}

/// Media record in the database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub creator: String,
    pub year: Option<i64>,
    #[serde(rename = "type")]
    pub media_type: String,
    pub publish_date: Option<String>,
    pub cover_url: Option<String>,
    pub status: MediaStatus,
    pub date_added: DateTime<Utc>,
}

impl MediaItem {
    pub fn from_row(row: &SqliteRow) -> ShelfResult<Self> {
        let status: String = row.try_get("status")?;

        Ok(MediaItem {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            title: row.try_get("title")?,
            creator: row.try_get("creator")?,
            year: row.try_get("year")?,
            media_type: row.try_get("type")?,
            publish_date: row.try_get("publish_date")?,
            cover_url: row.try_get("cover_url")?,
            status: status
                .parse()
                .map_err(|_| ShelfError::Internal(format!("Stored status is invalid: {}", status)))?,
            date_added: row.try_get("date_added")?,
        })
    }
}

/// Row shape of the catalog listing
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct MediaSummary {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub creator: String,
    pub year: Option<i64>,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub media_type: String,
    pub publish_date: Option<String>,
    pub status: String,
}

/// One name/value pair attached to a media item
#[derive(Debug, Clone, PartialEq, Eq, Hash, FromRow, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub name: String,
    pub value: String,
}

impl MetadataEntry {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}
