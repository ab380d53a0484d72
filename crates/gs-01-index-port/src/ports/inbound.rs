//! Driving Ports (API - Inbound)
//!
//! [`QueryPort`] is what the entity layer depends on. It is object safe so a
//! context can hold an `Arc<dyn QueryPort>`; the typed helpers below add the
//! decoder on top.

use crate::domain::{IndexQuery, RecordQuery};
use crate::metrics;
use async_trait::async_trait;
use futures::StreamExt;
use serde_json::Value;
use shared_bus::{end_after_error, LiveStream};
use shared_types::SyncResult;
use std::sync::Arc;
use tracing::error;

/// Raw query/subscription capability over index records.
#[async_trait]
pub trait QueryPort: Send + Sync {
    /// Live replacement lists for `query`. Cold; released on drop.
    fn watch_list(&self, query: &IndexQuery) -> LiveStream<Arc<Vec<Value>>>;

    /// Live view of one record; `None` while the id is not indexed.
    fn watch_one(&self, query: &RecordQuery) -> LiveStream<Option<Arc<Value>>>;

    /// Point-in-time list query.
    async fn fetch_list(&self, query: &IndexQuery) -> SyncResult<Arc<Vec<Value>>>;

    /// Point-in-time record lookup.
    async fn fetch_one(&self, query: &RecordQuery) -> SyncResult<Option<Arc<Value>>>;
}

/// Decode every item of every emitted list.
///
/// A single malformed item fails the whole batch and ends this stream; the
/// underlying feed keeps serving its other subscribers.
pub fn subscribe_list<P, T, F>(port: &P, query: &IndexQuery, decode: F) -> LiveStream<Vec<T>>
where
    P: QueryPort + ?Sized,
    T: Send + 'static,
    F: Fn(&Value) -> SyncResult<T> + Send + Sync + 'static,
{
    let collection = query.collection.clone();
    let decoded = port
        .watch_list(query)
        .map(move |batch| {
            let batch = batch?;
            decode_batch(&collection, &batch, &decode)
        })
        .boxed();
    end_after_error(decoded)
}

/// Decode each revision of one record, passing `None` through.
pub fn subscribe_one<P, T, F>(port: &P, query: &RecordQuery, decode: F) -> LiveStream<Option<T>>
where
    P: QueryPort + ?Sized,
    T: Send + 'static,
    F: Fn(&Value) -> SyncResult<T> + Send + Sync + 'static,
{
    let collection = query.collection.clone();
    let decoded = port
        .watch_one(query)
        .map(move |record| match record? {
            Some(raw) => decode_record(&collection, &raw, &decode).map(Some),
            None => Ok(None),
        })
        .boxed();
    end_after_error(decoded)
}

/// Typed point-in-time list query.
pub async fn fetch_list<P, T, F>(port: &P, query: &IndexQuery, decode: F) -> SyncResult<Vec<T>>
where
    P: QueryPort + ?Sized,
    F: Fn(&Value) -> SyncResult<T>,
{
    let batch = port.fetch_list(query).await?;
    decode_batch(&query.collection, &batch, &decode)
}

/// Typed point-in-time record lookup.
pub async fn fetch_one<P, T, F>(port: &P, query: &RecordQuery, decode: F) -> SyncResult<Option<T>>
where
    P: QueryPort + ?Sized,
    F: Fn(&Value) -> SyncResult<T>,
{
    match port.fetch_one(query).await? {
        Some(raw) => decode_record(&query.collection, &raw, &decode).map(Some),
        None => Ok(None),
    }
}

fn decode_batch<T, F>(collection: &str, batch: &[Value], decode: &F) -> SyncResult<Vec<T>>
where
    F: Fn(&Value) -> SyncResult<T>,
{
    batch
        .iter()
        .map(|raw| decode_record(collection, raw, decode))
        .collect()
}

fn decode_record<T, F>(collection: &str, raw: &Value, decode: &F) -> SyncResult<T>
where
    F: Fn(&Value) -> SyncResult<T>,
{
    decode(raw).map_err(|e| {
        error!(collection, id = ?raw.get("id"), error = %e, "Failed to decode index record");
        metrics::record_decode_failure(collection);
        e
    })
}
