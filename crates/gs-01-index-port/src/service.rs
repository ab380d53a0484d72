//! # Index Port Service
//!
//! Implements [`QueryPort`] over any [`IndexBackend`], sharing one upstream
//! subscription between all consumers of an identical query.
//!
//! ```text
//! Entity A ──┐
//! Entity B ──┼── key "proposals(where: {dao: ..})" ──→ SharedFeed ──→ backend.subscribe
//! Entity C ──┘
//! ```

use crate::domain::{IndexQuery, RecordQuery};
use crate::metrics;
use crate::ports::inbound::QueryPort;
use crate::ports::outbound::IndexBackend;
use async_trait::async_trait;
use futures::StreamExt;
use parking_lot::Mutex;
use serde_json::Value;
use shared_bus::{LiveStream, SharedFeed, UpstreamFactory, DEFAULT_CHANNEL_CAPACITY};
use shared_types::{FetchPolicy, SyncResult};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

type ListFeed = SharedFeed<Arc<Vec<Value>>>;
type RecordFeed = SharedFeed<Option<Arc<Value>>>;

/// Query port with per-query feed sharing.
pub struct IndexPort<B: IndexBackend> {
    backend: Arc<B>,
    capacity: usize,
    lists: Mutex<HashMap<String, Arc<ListFeed>>>,
    records: Mutex<HashMap<String, Arc<RecordFeed>>>,
}

impl<B: IndexBackend> IndexPort<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self::with_capacity(backend, DEFAULT_CHANNEL_CAPACITY)
    }

    /// `capacity` bounds the snapshots buffered per subscriber before it lags.
    pub fn with_capacity(backend: Arc<B>, capacity: usize) -> Self {
        Self {
            backend,
            capacity,
            lists: Mutex::new(HashMap::new()),
            records: Mutex::new(HashMap::new()),
        }
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Number of shared feeds currently registered (lists and records).
    pub fn shared_feed_count(&self) -> usize {
        self.lists.lock().len() + self.records.lock().len()
    }

    fn list_feed(&self, query: &IndexQuery) -> Arc<ListFeed> {
        let backend = Arc::clone(&self.backend);
        let upstream_query = query.clone();
        let factory: UpstreamFactory<Arc<Vec<Value>>> = Arc::new(move || {
            let opened = OpenFeed::new();
            backend
                .subscribe(&upstream_query)
                .map(move |batch| {
                    let _ = &opened;
                    batch.map(Arc::new)
                })
                .boxed()
        });
        Arc::new(SharedFeed::with_capacity(query.key(), factory, self.capacity))
    }

    fn record_feed(&self, query: &RecordQuery) -> Arc<RecordFeed> {
        let backend = Arc::clone(&self.backend);
        let upstream_query = query.clone();
        let factory: UpstreamFactory<Option<Arc<Value>>> = Arc::new(move || {
            let opened = OpenFeed::new();
            backend
                .subscribe_one(&upstream_query)
                .map(move |record| {
                    let _ = &opened;
                    record.map(|found| found.map(Arc::new))
                })
                .boxed()
        });
        Arc::new(SharedFeed::with_capacity(query.key(), factory, self.capacity))
    }
}

/// Look up a live feed for `key`, registering a new one if none is usable.
///
/// Terminated feeds are evicted so the next consumer re-issues the query;
/// idle feeds nobody holds are dropped.
fn shared<T>(
    registry: &Mutex<HashMap<String, Arc<SharedFeed<T>>>>,
    key: String,
    create: impl FnOnce() -> Arc<SharedFeed<T>>,
) -> Arc<SharedFeed<T>>
where
    T: Clone + Send + Sync + 'static,
{
    let mut feeds = registry.lock();
    feeds.retain(|_, feed| {
        !feed.is_terminated() && (feed.is_active() || Arc::strong_count(feed) > 1)
    });
    if let Some(feed) = feeds.get(&key) {
        debug!(key = %key, subscribers = feed.subscriber_count(), "Joining shared feed");
        return Arc::clone(feed);
    }
    let feed = create();
    feeds.insert(key, Arc::clone(&feed));
    feed
}

#[async_trait]
impl<B: IndexBackend> QueryPort for IndexPort<B> {
    fn watch_list(&self, query: &IndexQuery) -> LiveStream<Arc<Vec<Value>>> {
        let feed = match query.policy {
            FetchPolicy::Shared => shared(&self.lists, query.key(), || self.list_feed(query)),
            FetchPolicy::Fresh => self.list_feed(query),
        };
        feed.stream()
    }

    fn watch_one(&self, query: &RecordQuery) -> LiveStream<Option<Arc<Value>>> {
        let feed = match query.policy {
            FetchPolicy::Shared => shared(&self.records, query.key(), || self.record_feed(query)),
            FetchPolicy::Fresh => self.record_feed(query),
        };
        feed.stream()
    }

    async fn fetch_list(&self, query: &IndexQuery) -> SyncResult<Arc<Vec<Value>>> {
        metrics::record_query(&query.collection);
        debug!(query = %query.key(), "Index query");
        self.backend.query(query).await.map(Arc::new)
    }

    async fn fetch_one(&self, query: &RecordQuery) -> SyncResult<Option<Arc<Value>>> {
        metrics::record_query(&query.collection);
        debug!(query = %query.key(), "Index record query");
        Ok(self.backend.query_one(query).await?.map(Arc::new))
    }
}

/// Tracks one open upstream subscription for the active-feeds gauge.
struct OpenFeed;

impl OpenFeed {
    fn new() -> Self {
        metrics::record_feed_opened();
        Self
    }
}

impl Drop for OpenFeed {
    fn drop(&mut self) {
        metrics::record_feed_closed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryIndex;
    use crate::domain::QueryBuilder;
    use serde_json::json;
    use shared_bus::first_value;
    use shared_types::{EntityId, QueryOptions};
    use std::time::Duration;
    use tokio::time::timeout;

    const PROPOSALS: QueryBuilder = QueryBuilder::new("proposals", &["dao", "stage"]);

    fn setup() -> (InMemoryIndex, IndexPort<InMemoryIndex>) {
        let index = InMemoryIndex::new();
        index.upsert("proposals", json!({"id": "0x1", "dao": {"id": "0xdao"}, "stage": "Queued"}));
        let port = IndexPort::new(Arc::new(index.clone()));
        (index, port)
    }

    #[tokio::test]
    async fn test_identical_queries_share_one_upstream() {
        let (index, port) = setup();
        let query = PROPOSALS.build(&QueryOptions::new().where_eq("dao", "0xdao")).unwrap();

        let mut a = port.watch_list(&query);
        let mut b = port.watch_list(&query);
        let first_a = a.next().await.unwrap().unwrap();
        let first_b = b.next().await.unwrap().unwrap();

        assert_eq!(first_a.len(), 1);
        assert!(Arc::ptr_eq(&first_a, &first_b));
        assert_eq!(index.subscriptions_opened(), 1);
        assert_eq!(port.shared_feed_count(), 1);
    }

    #[tokio::test]
    async fn test_fresh_policy_opens_dedicated_upstream() {
        let (index, port) = setup();
        let query = PROPOSALS.build(&QueryOptions::new()).unwrap();

        let mut shared_stream = port.watch_list(&query);
        let mut fresh = port.watch_list(&query.clone().with_policy(FetchPolicy::Fresh));
        shared_stream.next().await.unwrap().unwrap();
        fresh.next().await.unwrap().unwrap();

        assert_eq!(index.subscriptions_opened(), 2);
    }

    #[tokio::test]
    async fn test_watch_one_reports_absent_then_found() {
        let (index, port) = setup();
        let record = PROPOSALS.record(&EntityId::new("0x2"));
        let mut stream = port.watch_one(&record);

        assert_eq!(stream.next().await.unwrap().unwrap(), None);

        index.upsert("proposals", json!({"id": "0x2", "dao": {"id": "0xdao"}, "stage": "Queued"}));
        let found = timeout(Duration::from_millis(500), stream.next())
            .await
            .expect("timeout")
            .unwrap()
            .unwrap();
        assert_eq!(found.unwrap()["id"], "0x2");
    }

    #[tokio::test]
    async fn test_upstream_released_when_last_consumer_detaches() {
        let (index, port) = setup();
        let query = PROPOSALS.build(&QueryOptions::new()).unwrap();

        let value = first_value(port.watch_list(&query)).await.unwrap();
        assert_eq!(value.len(), 1);

        timeout(Duration::from_millis(500), async {
            while index.active_subscriptions() > 0 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("subscription not released");
    }

    #[tokio::test]
    async fn test_fetch_list_is_point_in_time() {
        let (index, port) = setup();
        let query = PROPOSALS.build(&QueryOptions::new()).unwrap();
        let list = port.fetch_list(&query).await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(index.queries_issued(), 1);
        assert_eq!(index.subscriptions_opened(), 0);
    }
}
