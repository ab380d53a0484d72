//! Driven Ports (SPI - Outbound Dependencies)
//!
//! The indexed-query capability supplied by a collaborator. Records are raw
//! JSON objects as the index serves them; decoding happens above the port.

use crate::domain::{IndexQuery, RecordQuery};
use async_trait::async_trait;
use serde_json::Value;
use shared_bus::LiveStream;
use shared_types::SyncResult;

/// Index backend: point-in-time queries and continuous subscriptions.
///
/// Subscription streams must be cold (no resource acquired before the first
/// poll) and must release their resource when dropped. A list subscription
/// emits the full matching set every time it changes, never a diff.
#[async_trait]
pub trait IndexBackend: Send + Sync + 'static {
    /// Current records matching `query`, in the query's order.
    async fn query(&self, query: &IndexQuery) -> SyncResult<Vec<Value>>;

    /// Live replacement lists for `query`.
    fn subscribe(&self, query: &IndexQuery) -> LiveStream<Vec<Value>>;

    /// The record with this id, or `None` if it is not indexed.
    async fn query_one(&self, query: &RecordQuery) -> SyncResult<Option<Value>>;

    /// Live view of one record: `None` while absent, then every revision.
    fn subscribe_one(&self, query: &RecordQuery) -> LiveStream<Option<Value>>;
}
