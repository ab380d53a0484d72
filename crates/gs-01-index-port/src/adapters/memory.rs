//! # In-Memory Index
//!
//! An [`IndexBackend`] holding raw records per collection, for tests and
//! local tooling. Evaluates equality/range filters (relation fields match on
//! their nested `id`), ordering and pagination the way the hosted index does,
//! and pushes a fresh list to every subscription whose result changed.

use crate::domain::{IndexQuery, RecordQuery};
use crate::ports::outbound::IndexBackend;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use parking_lot::RwLock;
use serde_json::Value;
use shared_bus::{lazy, LiveStream};
use shared_types::{
    parse_amount, Amount, Filter, FilterOp, FilterValue, OrderDirection, SyncResult,
};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

struct Inner {
    collections: RwLock<HashMap<String, Vec<Value>>>,
    /// Bumped on every write; subscriptions re-evaluate on change.
    revision: watch::Sender<u64>,
    queries_issued: AtomicU64,
    subscriptions_opened: AtomicU64,
    active_subscriptions: Arc<AtomicUsize>,
}

/// Shared handle to an in-memory index. Clones see the same records.
#[derive(Clone)]
pub struct InMemoryIndex {
    inner: Arc<Inner>,
}

impl Default for InMemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryIndex {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                collections: RwLock::new(HashMap::new()),
                revision,
                queries_issued: AtomicU64::new(0),
                subscriptions_opened: AtomicU64::new(0),
                active_subscriptions: Arc::new(AtomicUsize::new(0)),
            }),
        }
    }

    /// Insert or replace a record, matched by its `id` field.
    ///
    /// Ids are stored lower-cased. A record without a string `id` is ignored.
    pub fn upsert(&self, collection: &str, mut record: Value) {
        let Some(id) = record.get("id").and_then(Value::as_str).map(str::to_lowercase) else {
            debug!(collection, "Ignoring record without id");
            return;
        };
        if let Some(obj) = record.as_object_mut() {
            obj.insert("id".to_string(), Value::String(id.clone()));
        }
        {
            let mut collections = self.inner.collections.write();
            let records = collections.entry(collection.to_string()).or_default();
            match records.iter_mut().find(|r| record_id(r) == Some(id.as_str())) {
                Some(existing) => *existing = record,
                None => records.push(record),
            }
        }
        self.bump();
    }

    /// Merge `patch` into an existing record. Returns false if it is absent.
    pub fn update(&self, collection: &str, id: &str, patch: Value) -> bool {
        let id = id.to_lowercase();
        let updated = {
            let mut collections = self.inner.collections.write();
            let target = collections
                .get_mut(collection)
                .and_then(|records| records.iter_mut().find(|r| record_id(r) == Some(id.as_str())));
            match (target.and_then(Value::as_object_mut), patch.as_object()) {
                (Some(existing), Some(fields)) => {
                    for (key, value) in fields {
                        existing.insert(key.clone(), value.clone());
                    }
                    true
                }
                _ => false,
            }
        };
        if updated {
            self.bump();
        }
        updated
    }

    pub fn remove(&self, collection: &str, id: &str) -> bool {
        let id = id.to_lowercase();
        let removed = {
            let mut collections = self.inner.collections.write();
            match collections.get_mut(collection) {
                Some(records) => {
                    let before = records.len();
                    records.retain(|r| record_id(r) != Some(id.as_str()));
                    records.len() != before
                }
                None => false,
            }
        };
        if removed {
            self.bump();
        }
        removed
    }

    /// Snapshot of one record.
    pub fn get(&self, collection: &str, id: &str) -> Option<Value> {
        self.inner.find(collection, &id.to_lowercase())
    }

    /// Point queries and subscription activations served so far.
    pub fn queries_issued(&self) -> u64 {
        self.inner.queries_issued.load(AtomicOrdering::SeqCst)
    }

    pub fn subscriptions_opened(&self) -> u64 {
        self.inner.subscriptions_opened.load(AtomicOrdering::SeqCst)
    }

    pub fn active_subscriptions(&self) -> usize {
        self.inner.active_subscriptions.load(AtomicOrdering::SeqCst)
    }

    fn bump(&self) {
        self.inner.revision.send_modify(|rev| *rev += 1);
    }

    /// Open a subscription that re-evaluates `evaluate` on every write and
    /// emits only when the result differs from the previous emission.
    fn watch<T, F>(&self, evaluate: F) -> LiveStream<T>
    where
        T: Clone + PartialEq + Send + Sync + 'static,
        F: Fn(&Inner) -> T + Send + Sync + 'static,
    {
        let inner = Arc::clone(&self.inner);
        let evaluate = Arc::new(evaluate);
        lazy(move || {
            inner.queries_issued.fetch_add(1, AtomicOrdering::SeqCst);
            inner.subscriptions_opened.fetch_add(1, AtomicOrdering::SeqCst);
            let state = WatchState {
                changes: inner.revision.subscribe(),
                _guard: ActiveGuard::new(Arc::clone(&inner.active_subscriptions)),
                inner,
                last: None,
            };
            stream::unfold(state, move |mut state| {
                let evaluate = Arc::clone(&evaluate);
                async move {
                    loop {
                        let current = evaluate(&state.inner);
                        if state.last.as_ref() != Some(&current) {
                            state.last = Some(current.clone());
                            return Some((Ok(current), state));
                        }
                        if state.changes.changed().await.is_err() {
                            return None;
                        }
                    }
                }
            })
            .boxed()
        })
    }
}

struct WatchState<T> {
    inner: Arc<Inner>,
    changes: watch::Receiver<u64>,
    last: Option<T>,
    _guard: ActiveGuard,
}

struct ActiveGuard(Arc<AtomicUsize>);

impl ActiveGuard {
    fn new(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, AtomicOrdering::SeqCst);
        Self(counter)
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, AtomicOrdering::SeqCst);
    }
}

impl Inner {
    fn find(&self, collection: &str, id: &str) -> Option<Value> {
        self.collections
            .read()
            .get(collection)?
            .iter()
            .find(|r| record_id(r) == Some(id))
            .cloned()
    }

    fn evaluate(&self, query: &IndexQuery) -> Vec<Value> {
        let mut matched: Vec<Value> = {
            let collections = self.collections.read();
            match collections.get(&query.collection) {
                Some(records) => records
                    .iter()
                    .filter(|record| query.filters.iter().all(|f| matches_filter(record, f)))
                    .cloned()
                    .collect(),
                None => Vec::new(),
            }
        };

        if let Some(field) = &query.order_by {
            matched.sort_by(|a, b| {
                let ord = compare_values(scalar(a.get(field)), scalar(b.get(field)));
                match query.order_direction {
                    OrderDirection::Asc => ord,
                    OrderDirection::Desc => ord.reverse(),
                }
            });
        }

        let page = matched.into_iter().skip(query.skip.unwrap_or(0) as usize);
        match query.first {
            Some(first) => page.take(first as usize).collect(),
            None => page.collect(),
        }
    }
}

#[async_trait]
impl IndexBackend for InMemoryIndex {
    async fn query(&self, query: &IndexQuery) -> SyncResult<Vec<Value>> {
        self.inner.queries_issued.fetch_add(1, AtomicOrdering::SeqCst);
        Ok(self.inner.evaluate(query))
    }

    fn subscribe(&self, query: &IndexQuery) -> LiveStream<Vec<Value>> {
        let query = query.clone();
        self.watch(move |inner| inner.evaluate(&query))
    }

    async fn query_one(&self, query: &RecordQuery) -> SyncResult<Option<Value>> {
        self.inner.queries_issued.fetch_add(1, AtomicOrdering::SeqCst);
        Ok(self.inner.find(&query.collection, query.id.as_str()))
    }

    fn subscribe_one(&self, query: &RecordQuery) -> LiveStream<Option<Value>> {
        let query = query.clone();
        self.watch(move |inner| inner.find(&query.collection, query.id.as_str()))
    }
}

fn record_id(record: &Value) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}

/// Relation fields are stored as `{ "id": ... }`; compare on the id.
fn scalar(value: Option<&Value>) -> Option<&Value> {
    match value {
        Some(Value::Object(map)) => map.get("id"),
        Some(Value::Null) | None => None,
        Some(other) => Some(other),
    }
}

fn as_amount(value: &Value) -> Option<Amount> {
    match value {
        Value::Number(n) => n.as_u64().map(Amount::from),
        Value::String(s) => parse_amount(s),
        _ => None,
    }
}

fn text_eq(left: &str, right: &str) -> bool {
    if left.starts_with("0x") || right.starts_with("0x") {
        left.eq_ignore_ascii_case(right)
    } else {
        left == right
    }
}

fn equals(value: &Value, target: &FilterValue) -> bool {
    match target {
        FilterValue::Text(text) => match value {
            Value::String(s) => text_eq(s, text),
            Value::Number(n) => n.to_string() == *text,
            Value::Bool(b) => b.to_string() == *text,
            _ => false,
        },
        FilterValue::Number(n) => as_amount(value) == Some(Amount::from(*n)),
        FilterValue::Amount(amount) => as_amount(value) == Some(*amount),
        FilterValue::Bool(b) => value.as_bool() == Some(*b),
        FilterValue::List(_) => false,
    }
}

fn compare_to(value: &Value, target: &FilterValue) -> Option<Ordering> {
    match target {
        FilterValue::Number(n) => Some(as_amount(value)?.cmp(&Amount::from(*n))),
        FilterValue::Amount(amount) => Some(as_amount(value)?.cmp(amount)),
        FilterValue::Text(text) => match (as_amount(value), parse_amount(text)) {
            (Some(left), Some(right)) => Some(left.cmp(&right)),
            _ => Some(value.as_str()?.cmp(text.as_str())),
        },
        FilterValue::Bool(_) | FilterValue::List(_) => None,
    }
}

fn matches_filter(record: &Value, filter: &Filter) -> bool {
    let field = scalar(record.get(&filter.field));
    match filter.op {
        FilterOp::Eq => field.is_some_and(|v| equals(v, &filter.value)),
        FilterOp::Not => !field.is_some_and(|v| equals(v, &filter.value)),
        FilterOp::In => match &filter.value {
            FilterValue::List(items) => {
                field.is_some_and(|v| items.iter().any(|item| equals(v, item)))
            }
            _ => false,
        },
        op => field
            .and_then(|v| compare_to(v, &filter.value))
            .is_some_and(|ord| match op {
                FilterOp::Gt => ord == Ordering::Greater,
                FilterOp::Gte => ord != Ordering::Less,
                FilterOp::Lt => ord == Ordering::Less,
                FilterOp::Lte => ord != Ordering::Greater,
                _ => false,
            }),
    }
}

/// Numeric when both sides are integers, lexicographic otherwise. Unset sorts first.
fn compare_values(left: Option<&Value>, right: Option<&Value>) -> Ordering {
    match (left, right) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (as_amount(a), as_amount(b)) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => a.to_string().cmp(&b.to_string()),
        },
    }
}
