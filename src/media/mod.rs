/// Media catalog
///
/// Media items plus an open-ended name/value metadata bag per item.

mod catalog;

pub use catalog::MediaCatalog;

use crate::{
    db::media::{MediaItem, MediaStatus, MediaSummary, MetadataEntry},
    error::{ShelfError, ShelfResult},
    validation::{self, double_option},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata as the frontend sends it: either `{"isbn": "X"}` or
/// `[{"name": "isbn", "value": "X"}]`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MetadataInput {
    Map(Map<String, Value>),
    List(Vec<Value>),
}

impl MetadataInput {
    /// Parse a raw `metadata` value; `null` means "not given"
    pub fn from_value(value: Value) -> ShelfResult<Option<Self>> {
        if value.is_null() {
            return Ok(None);
        }
        serde_json::from_value(value).map(Some).map_err(|_| {
            ShelfError::Validation(
                "metadata must be an object or a list of {name, value} entries".to_string(),
            )
        })
    }

    /// Normalize both shapes into stored rows.
    ///
    /// Map entries with a null value are skipped; list entries missing
    /// either `name` or `value` are skipped.
    pub fn into_entries(self) -> Vec<MetadataEntry> {
        match self {
            MetadataInput::Map(map) => map
                .into_iter()
                .filter_map(|(name, value)| scalar_text(&value).map(|v| MetadataEntry::new(name, v)))
                .collect(),
            MetadataInput::List(items) => items
                .iter()
                .filter_map(|item| {
                    let name = scalar_text(item.get("name")?)?;
                    let value = scalar_text(item.get("value")?)?;
                    Some(MetadataEntry::new(name, value))
                })
                .collect(),
        }
    }
}

/// Text stored for a metadata value; strings verbatim, other JSON as JSON text
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Normalize an optional raw `metadata` field
pub fn parse_metadata(value: Option<Value>) -> ShelfResult<Option<Vec<MetadataEntry>>> {
    match value {
        None => Ok(None),
        Some(raw) => Ok(MetadataInput::from_value(raw)?.map(MetadataInput::into_entries)),
    }
}

/// Validated fields for a new media item
#[derive(Debug, Clone, PartialEq)]
pub struct NewMedia {
    pub user_id: i64,
    pub title: String,
    pub creator: String,
    pub year: Option<i64>,
    pub media_type: String,
    pub publish_date: Option<String>,
    pub cover_url: Option<String>,
    pub status: MediaStatus,
}

/// Partial update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaPatch {
    pub title: Option<String>,
    pub creator: Option<String>,
    pub year: Option<Option<i64>>,
    pub media_type: Option<String>,
    pub status: Option<MediaStatus>,
    pub publish_date: Option<Option<String>>,
    pub cover_url: Option<Option<String>>,
}

impl MediaPatch {
    pub fn apply(self, item: &mut MediaItem) {
        if let Some(title) = self.title {
            item.title = title;
        }
        if let Some(creator) = self.creator {
            item.creator = creator;
        }
        if let Some(year) = self.year {
            item.year = year;
        }
        if let Some(media_type) = self.media_type {
            item.media_type = media_type;
        }
        if let Some(status) = self.status {
            item.status = status;
        }
        if let Some(publish_date) = self.publish_date {
            item.publish_date = publish_date;
        }
        if let Some(cover_url) = self.cover_url {
            item.cover_url = cover_url;
        }
    }
}

/// POST /api/media body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateMediaRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(default)]
    pub year: Option<Value>,
    #[serde(default, rename = "type")]
    pub media_type: Option<String>,
    #[serde(default)]
    pub user_id: Option<Value>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub publish_date: Option<String>,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

impl CreateMediaRequest {
    /// Validate, reporting every missing required field at once
    pub fn into_parts(self) -> ShelfResult<(NewMedia, Vec<MetadataEntry>)> {
        let mut missing = Vec::new();
        if validation::non_empty(&self.title).is_none() {
            missing.push("title");
        }
        if validation::non_empty(&self.creator).is_none() {
            missing.push("creator");
        }
        if validation::non_empty(&self.media_type).is_none() {
            missing.push("type");
        }
        if !validation::is_supplied(self.user_id.as_ref()) {
            missing.push("user_id");
        }
        validation::missing_fields(&missing)?;

        let user_id = validation::require_i64(self.user_id.as_ref(), "user_id")?;
        let year = validation::optional_i64(self.year.as_ref(), "year")?;
        let status = match validation::non_empty(&self.status) {
            Some(s) => s.parse()?,
            None => MediaStatus::default(),
        };
        let metadata = parse_metadata(self.metadata)?.unwrap_or_default();

        Ok((
            NewMedia {
                user_id,
                title: self.title.unwrap_or_default(),
                creator: self.creator.unwrap_or_default(),
                year,
                media_type: self.media_type.unwrap_or_default(),
                publish_date: self.publish_date,
                cover_url: self.cover_url,
                status,
            },
            metadata,
        ))
    }
}

/// PATCH /api/media/:id body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMediaRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub year: Option<Option<Value>>,
    #[serde(default, rename = "type")]
    pub media_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub publish_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub cover_url: Option<Option<String>>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

impl UpdateMediaRequest {
    pub fn into_parts(self) -> ShelfResult<(MediaPatch, Option<Vec<MetadataEntry>>)> {
        let year = match self.year {
            None => None,
            Some(None) => Some(None),
            Some(Some(raw)) => Some(validation::optional_i64(Some(&raw), "year")?),
        };
        let status = self
            .status
            .as_deref()
            .map(str::parse::<MediaStatus>)
            .transpose()?;
        let metadata = parse_metadata(self.metadata)?;

        Ok((
            MediaPatch {
                title: self.title,
                creator: self.creator,
                year,
                media_type: self.media_type,
                status,
                publish_date: self.publish_date,
                cover_url: self.cover_url,
            },
            metadata,
        ))
    }
}

/// GET /api/media query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListMediaQuery {
    pub user_id: Option<i64>,
}

/// Creation response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaCreatedResponse {
    pub success: bool,
    pub id: i64,
    pub date_added: DateTime<Utc>,
}

/// Single item response, also what the collection service reads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub media: Option<MediaItem>,
}

/// Listing response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListMediaResponse {
    pub media: Vec<MediaSummary>,
}

/// Metadata response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataResponse {
    pub success: bool,
    pub metadata: Vec<MetadataEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dict_and_list_metadata_normalize_identically() {
        let dict = MetadataInput::from_value(json!({"isbn": "X"})).unwrap().unwrap();
        let list = MetadataInput::from_value(json!([{"name": "isbn", "value": "X"}]))
            .unwrap()
            .unwrap();

        assert_eq!(dict.into_entries(), list.into_entries());
    }

    #[test]
    fn test_dict_metadata_keeps_request_order() {
        let dict = MetadataInput::from_value(json!({"zeta": "1", "alpha": "2", "mid": "3"}))
            .unwrap()
            .unwrap();
        let names: Vec<String> = dict.into_entries().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_metadata_skips_incomplete_entries() {
        let dict = MetadataInput::from_value(json!({"isbn": "X", "pages": null, "rating": 4}))
            .unwrap()
            .unwrap();
        let mut entries = dict.into_entries();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(
            entries,
            vec![MetadataEntry::new("isbn", "X"), MetadataEntry::new("rating", "4")]
        );

        let list = MetadataInput::from_value(json!([
            {"name": "isbn", "value": "X"},
            {"name": "no-value"},
            {"value": "no-name"},
            {"name": "nulled", "value": null}
        ]))
        .unwrap()
        .unwrap();
        assert_eq!(list.into_entries(), vec![MetadataEntry::new("isbn", "X")]);
    }

    #[test]
    fn test_metadata_rejects_scalars() {
        assert!(MetadataInput::from_value(json!("isbn=X")).is_err());
        assert!(MetadataInput::from_value(json!(null)).unwrap().is_none());
    }

    #[test]
    fn test_create_request_lists_every_missing_field() {
        let req: CreateMediaRequest = serde_json::from_value(json!({"creator": "Le Guin"})).unwrap();
        let err = req.into_parts().unwrap_err();
        assert_eq!(err.to_string(), "Missing required fields: title, type, user_id");
    }

    #[test]
    fn test_create_request_defaults() {
        let req: CreateMediaRequest = serde_json::from_value(json!({
            "title": "The Dispossessed",
            "creator": "Ursula K. Le Guin",
            "type": "book",
            "user_id": "3",
            "year": "1974"
        }))
        .unwrap();

        let (media, metadata) = req.into_parts().unwrap();
        assert_eq!(media.user_id, 3);
        assert_eq!(media.year, Some(1974));
        assert_eq!(media.status, MediaStatus::NotStarted);
        assert!(metadata.is_empty());
    }

    #[test]
    fn test_create_request_rejects_unknown_status() {
        let req: CreateMediaRequest = serde_json::from_value(json!({
            "title": "t", "creator": "c", "type": "book", "user_id": 1, "status": "Shelved"
        }))
        .unwrap();
        assert!(matches!(req.into_parts(), Err(ShelfError::Validation(_))));
    }

    #[test]
    fn test_update_request_distinguishes_null_from_absent() {
        let req: UpdateMediaRequest =
            serde_json::from_value(json!({"year": null, "title": "New"})).unwrap();
        let (patch, metadata) = req.into_parts().unwrap();

        assert_eq!(patch.year, Some(None));
        assert_eq!(patch.title.as_deref(), Some("New"));
        assert_eq!(patch.cover_url, None);
        assert!(metadata.is_none());
    }

    #[test]
    fn test_update_request_empty_metadata_list_clears() {
        let req: UpdateMediaRequest = serde_json::from_value(json!({"metadata": []})).unwrap();
        let (_, metadata) = req.into_parts().unwrap();
        assert_eq!(metadata, Some(vec![]));
    }
}
