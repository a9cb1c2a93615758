/// Media lookups against the media service
use crate::{
    config::MediaClientConfig,
    db::media::MediaItem,
    error::{ShelfError, ShelfResult},
    media::MediaResponse,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Result of looking up one media id
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// 200 with a media payload
    Found(MediaItem),
    /// 200 without a payload
    Missing,
    /// Any other status code
    Status(u16),
    /// Connection, timeout or decode failure
    Failed(String),
}

impl FetchOutcome {
    /// Metric label
    pub fn label(&self) -> &'static str {
        match self {
            FetchOutcome::Found(_) => "found",
            FetchOutcome::Missing => "missing",
            FetchOutcome::Status(_) => "status",
            FetchOutcome::Failed(_) => "transport",
        }
    }
}

/// Where the aggregation gateway resolves media ids
///
/// Implementations never fail: every problem is described by the outcome.
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Look up one media item
    async fn fetch_media(&self, media_id: i64) -> FetchOutcome;
}

/// HTTP client for `GET {base_url}/api/media/:id`
#[derive(Clone)]
pub struct HttpMediaSource {
    http_client: Client,
    base_url: String,
}

impl HttpMediaSource {
    /// Create a client; the timeout applies to each lookup
    pub fn new(config: &MediaClientConfig) -> ShelfResult<Self> {
        let http_client = Client::builder()
            .user_agent(concat!("sorted-shelf/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ShelfError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn media_url(&self, media_id: i64) -> String {
        format!("{}/api/media/{}", self.base_url, media_id)
    }
}

#[async_trait]
impl MediaSource for HttpMediaSource {
    async fn fetch_media(&self, media_id: i64) -> FetchOutcome {
        let response = match self.http_client.get(self.media_url(media_id)).send().await {
            Ok(response) => response,
            Err(e) => return FetchOutcome::Failed(e.to_string()),
        };

        if response.status() != StatusCode::OK {
            return FetchOutcome::Status(response.status().as_u16());
        }

        match response.json::<MediaResponse>().await {
            Ok(body) => body.media.map_or(FetchOutcome::Missing, FetchOutcome::Found),
            Err(e) => FetchOutcome::Failed(e.to_string()),
        }
    }
}
