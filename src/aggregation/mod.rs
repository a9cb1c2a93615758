/// Collection aggregation
///
/// Hydrates the media ids linked to a collection by asking the media
/// service for each one. Lookups are independent: a failed lookup turns
/// into a warning and never affects the others. A collection without links
/// makes no remote calls at all.

mod client;

pub use client::{FetchOutcome, HttpMediaSource, MediaSource};

use crate::{
    collection::CollectionStore, db::media::MediaItem, error::ShelfResult, metrics,
};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Media of one collection plus per-link warnings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionMedia {
    pub media: Vec<MediaItem>,
    pub warnings: Vec<String>,
}

/// GET /api/collection/:id/media body; `warnings` only when non-empty
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionMediaResponse {
    pub success: bool,
    pub media: Vec<MediaItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl From<CollectionMedia> for CollectionMediaResponse {
    fn from(result: CollectionMedia) -> Self {
        Self {
            success: true,
            media: result.media,
            warnings: result.warnings,
        }
    }
}

/// Joins collection links with media service records
pub struct AggregationGateway {
    store: Arc<CollectionStore>,
    source: Arc<dyn MediaSource>,
    max_concurrent: usize,
}

impl AggregationGateway {
    pub fn new(
        store: Arc<CollectionStore>,
        source: Arc<dyn MediaSource>,
        max_concurrent: usize,
    ) -> Self {
        Self {
            store,
            source,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Resolve every link of a collection, in link order
    pub async fn collection_media(&self, collection_id: i64) -> ShelfResult<CollectionMedia> {
        let links = self.store.links(collection_id).await?;

        if links.is_empty() {
            return Ok(CollectionMedia::default());
        }

        // Owned ids keep the handler future Send
        let media_ids: Vec<i64> = links.iter().map(|link| link.media_id).collect();
        let source = self.source.as_ref();
        let outcomes: Vec<(i64, FetchOutcome)> = stream::iter(media_ids)
            .map(|media_id| async move { (media_id, source.fetch_media(media_id).await) })
            .buffered(self.max_concurrent)
            .collect()
            .await;

        let mut result = CollectionMedia::default();
        for (media_id, outcome) in outcomes {
            metrics::record_media_fetch(outcome.label());

            let warning = match outcome {
                FetchOutcome::Found(media) => {
                    result.media.push(media);
                    continue;
                }
                FetchOutcome::Missing => format!("No media found for media_id {}", media_id),
                FetchOutcome::Status(code) => format!(
                    "Media-service returned status {} for media_id {}",
                    code, media_id
                ),
                FetchOutcome::Failed(error) => {
                    format!("Exception for media_id {}: {}", media_id, error)
                }
            };

            tracing::warn!(collection_id, media_id, warning = %warning, "Media lookup failed");
            result.warnings.push(warning);
        }

        tracing::debug!(
            collection_id,
            links = links.len(),
            found = result.media.len(),
            warnings = result.warnings.len(),
            "Aggregated collection media"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        collection::NewLink,
        config::ServiceKind,
        db::{self, media::MediaStatus},
    };
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn item(id: i64) -> MediaItem {
        MediaItem {
            id,
            user_id: 1,
            title: format!("Item {}", id),
            creator: "Someone".to_string(),
            year: None,
            media_type: "book".to_string(),
            publish_date: None,
            cover_url: None,
            status: MediaStatus::NotStarted,
            date_added: Utc::now(),
        }
    }

    /// Canned outcomes per id; unknown ids answer 404. Higher ids answer
    /// faster so completion order differs from link order.
    struct StubSource {
        outcomes: HashMap<i64, FetchOutcome>,
        calls: AtomicUsize,
    }

    impl StubSource {
        fn new(outcomes: Vec<(i64, FetchOutcome)>) -> Arc<Self> {
            Arc::new(Self {
                outcomes: outcomes.into_iter().collect(),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MediaSource for StubSource {
        async fn fetch_media(&self, media_id: i64) -> FetchOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let delay = 50u64.saturating_sub(media_id.clamp(0, 50) as u64);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            self.outcomes
                .get(&media_id)
                .cloned()
                .unwrap_or(FetchOutcome::Status(404))
        }
    }

    async fn store_with_links(media_ids: &[i64]) -> (Arc<CollectionStore>, i64) {
        let store = Arc::new(CollectionStore::new(
            db::memory_pool(ServiceKind::Collection).await,
        ));
        let collection_id = store.create_collection(1, "Shelf", None).await.unwrap();
        for media_id in media_ids {
            store
                .link_media(NewLink {
                    collection_id,
                    media_id: *media_id,
                    user_id: 1,
                    rating: None,
                    date_added: None,
                })
                .await
                .unwrap();
        }
        (store, collection_id)
    }

    #[tokio::test]
    async fn test_empty_collection_makes_no_calls() {
        let (store, collection_id) = store_with_links(&[]).await;
        let source = StubSource::new(vec![(10, FetchOutcome::Found(item(10)))]);
        let gateway = AggregationGateway::new(store, source.clone(), 4);

        let result = gateway.collection_media(collection_id).await.unwrap();

        assert!(result.media.is_empty());
        assert!(result.warnings.is_empty());
        assert_eq!(source.calls(), 0);

        let body = serde_json::to_value(CollectionMediaResponse::from(result)).unwrap();
        assert_eq!(body, serde_json::json!({"success": true, "media": []}));
    }

    #[tokio::test]
    async fn test_aggregation_runs_on_spawned_task() {
        let (store, collection_id) = store_with_links(&[10, 11]).await;
        let source = StubSource::new(vec![
            (10, FetchOutcome::Found(item(10))),
            (11, FetchOutcome::Missing),
        ]);
        let gateway = Arc::new(AggregationGateway::new(store, source, 2));

        // Handlers run on spawned tasks, so the future must be Send + 'static
        let task = tokio::spawn({
            let gateway = Arc::clone(&gateway);
            async move { gateway.collection_media(collection_id).await }
        });
        let result = task.await.unwrap().unwrap();

        assert_eq!(result.media.len(), 1);
        assert_eq!(result.warnings.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_media_becomes_warning() {
        let (store, collection_id) = store_with_links(&[10, 11, 12]).await;
        let source = StubSource::new(vec![
            (10, FetchOutcome::Found(item(10))),
            (11, FetchOutcome::Found(item(11))),
            (12, FetchOutcome::Missing),
        ]);
        let gateway = AggregationGateway::new(store, source.clone(), 4);

        let result = gateway.collection_media(collection_id).await.unwrap();

        let ids: Vec<i64> = result.media.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![10, 11]);
        assert_eq!(result.warnings, vec!["No media found for media_id 12"]);
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test]
    async fn test_every_failure_kind_is_isolated() {
        let (store, collection_id) = store_with_links(&[1, 2, 3, 4, 5]).await;
        let source = StubSource::new(vec![
            (1, FetchOutcome::Found(item(1))),
            (2, FetchOutcome::Status(500)),
            (3, FetchOutcome::Failed("operation timed out".to_string())),
            (4, FetchOutcome::Missing),
            (5, FetchOutcome::Found(item(5))),
        ]);
        let gateway = AggregationGateway::new(store, source, 2);

        let result = gateway.collection_media(collection_id).await.unwrap();

        assert_eq!(result.media.len(), 2);
        assert_eq!(
            result.warnings,
            vec![
                "Media-service returned status 500 for media_id 2".to_string(),
                "Exception for media_id 3: operation timed out".to_string(),
                "No media found for media_id 4".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_all_lookups_failing_still_reports_warnings() {
        let (store, collection_id) = store_with_links(&[20, 21]).await;
        let source = StubSource::new(vec![]);
        let gateway = AggregationGateway::new(store, source.clone(), 4);

        let result = gateway.collection_media(collection_id).await.unwrap();

        assert!(result.media.is_empty());
        assert_eq!(result.warnings.len(), 2);
        assert_eq!(source.calls(), 2);

        let body = serde_json::to_value(CollectionMediaResponse::from(result)).unwrap();
        assert!(body.get("warnings").is_some());
    }

    #[tokio::test]
    async fn test_results_keep_link_order() {
        // Later links resolve first in the stub
        let ids = [3, 9, 27, 45, 1];
        let (store, collection_id) = store_with_links(&ids).await;
        let source = StubSource::new(
            ids.iter()
                .map(|id| (*id, FetchOutcome::Found(item(*id))))
                .collect(),
        );
        let gateway = AggregationGateway::new(store, source, 5);

        let result = gateway.collection_media(collection_id).await.unwrap();

        let got: Vec<i64> = result.media.iter().map(|m| m.id).collect();
        assert_eq!(got, ids.to_vec());
    }

    #[tokio::test]
    async fn test_counts_match_outcomes() {
        let ids: Vec<i64> = (1..=12).collect();
        let (store, collection_id) = store_with_links(&ids).await;
        let source = StubSource::new(
            ids.iter()
                .filter(|id| *id % 3 != 0)
                .map(|id| (*id, FetchOutcome::Found(item(*id))))
                .collect(),
        );
        let gateway = AggregationGateway::new(store, source, 3);

        let result = gateway.collection_media(collection_id).await.unwrap();

        assert_eq!(result.media.len(), 8);
        assert_eq!(result.warnings.len(), 4);
    }
}
