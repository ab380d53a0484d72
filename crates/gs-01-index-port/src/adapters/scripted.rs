//! # Scripted Index
//!
//! An [`IndexBackend`] that replays fixed emission scripts, for exercising
//! indexation lag (`absent, absent, found`) and transport failures
//! deterministically. After a script runs out the subscription stays open
//! without emitting, like an idle live subscription.

use crate::domain::{IndexQuery, RecordQuery};
use crate::ports::outbound::IndexBackend;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use serde_json::Value;
use shared_bus::{lazy, LiveStream};
use shared_types::{SyncError, SyncResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

type ListScript = Vec<SyncResult<Vec<Value>>>;
type RecordScript = Vec<SyncResult<Option<Value>>>;

#[derive(Default)]
struct Scripts {
    lists: HashMap<String, ListScript>,
    records: HashMap<(String, String), RecordScript>,
}

/// Replays scripted emissions per collection (lists) or per record id.
#[derive(Clone, Default)]
pub struct ScriptedIndex {
    scripts: Arc<Mutex<Scripts>>,
    /// Delay between scripted emissions.
    pacing: Option<Duration>,
    subscriptions_opened: Arc<AtomicU64>,
}

impl ScriptedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Space emissions out by `pacing`, so consumers can attach mid-script.
    #[must_use]
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = Some(pacing);
        self
    }

    /// Script every list subscription on `collection`.
    pub fn script_list(&self, collection: &str, script: ListScript) {
        self.scripts
            .lock()
            .lists
            .insert(collection.to_string(), script);
    }

    /// Script the record subscription for `id` in `collection`.
    pub fn script_record(&self, collection: &str, id: &str, script: RecordScript) {
        self.scripts
            .lock()
            .records
            .insert((collection.to_string(), id.to_lowercase()), script);
    }

    pub fn subscriptions_opened(&self) -> u64 {
        self.subscriptions_opened.load(Ordering::SeqCst)
    }

    fn replay<T>(&self, script: Vec<SyncResult<T>>) -> LiveStream<T>
    where
        T: Send + 'static,
    {
        let opened = Arc::clone(&self.subscriptions_opened);
        let pacing = self.pacing;
        lazy(move || {
            opened.fetch_add(1, Ordering::SeqCst);
            let items = stream::iter(script);
            let paced = match pacing {
                Some(delay) => items
                    .then(move |item| async move {
                        tokio::time::sleep(delay).await;
                        item
                    })
                    .boxed(),
                None => items.boxed(),
            };
            paced.chain(stream::pending()).boxed()
        })
    }

    fn list_script(&self, collection: &str) -> ListScript {
        self.scripts
            .lock()
            .lists
            .get(collection)
            .cloned()
            .unwrap_or_else(|| vec![Ok(Vec::new())])
    }

    fn record_script(&self, query: &RecordQuery) -> RecordScript {
        self.scripts
            .lock()
            .records
            .get(&(query.collection.clone(), query.id.as_str().to_string()))
            .cloned()
            .unwrap_or_else(|| vec![Ok(None)])
    }
}

#[async_trait]
impl IndexBackend for ScriptedIndex {
    /// The last successful list in the script.
    async fn query(&self, query: &IndexQuery) -> SyncResult<Vec<Value>> {
        let script = self.list_script(&query.collection);
        match script.into_iter().last() {
            Some(item) => item,
            None => Err(SyncError::Transport {
                reason: format!("no script for {}", query.collection),
            }),
        }
    }

    fn subscribe(&self, query: &IndexQuery) -> LiveStream<Vec<Value>> {
        self.replay(self.list_script(&query.collection))
    }

    async fn query_one(&self, query: &RecordQuery) -> SyncResult<Option<Value>> {
        match self.record_script(query).into_iter().last() {
            Some(item) => item,
            None => Ok(None),
        }
    }

    fn subscribe_one(&self, query: &RecordQuery) -> LiveStream<Option<Value>> {
        self.replay(self.record_script(query))
    }
}
