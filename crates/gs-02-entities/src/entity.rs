//! # Entity
//!
//! Uniform identity, cached state and fetch/subscribe contract for every
//! domain object.
//!
//! ## Fetch Semantics
//!
//! | Cache | `wait_for_indexation` | `force_refetch` | Result |
//! |-------|----------------------|-----------------|--------|
//! | set   | no                   | no              | cached `Arc`, no query |
//! | any   | yes                  | any             | first non-absent value from the live view |
//! | any   | no                   | yes             | first value from a fresh upstream subscription |
//! | unset | no                   | no              | first value; absent fails with `NotIndexedYet` |
//!
//! The cache only ever holds whole snapshots behind an `Arc`. A returned
//! state is never mutated afterwards; a newer snapshot is a new object.

use crate::context::Context;
use futures::StreamExt;
use gs_01_index_port::{subscribe_list, subscribe_one, QueryBuilder};
use gs_telemetry::entity_span;
use parking_lot::Mutex;
use serde_json::Value;
use shared_bus::{end_after_error, first_value, once, until_cancelled, wait_until, CancelSignal, LiveStream};
use shared_types::{EntityId, FetchPolicy, Filter, FilterValue, QueryOptions, SyncError, SyncResult};
use std::fmt;
use std::sync::Arc;
use tracing::{info, Instrument};

/// A concrete entity type: its collection, allow-list and decoder.
pub trait EntityKind: Send + Sync + Sized + 'static {
    type State: fmt::Debug + Send + Sync + 'static;

    /// Singular name used in errors and logs.
    const NAME: &'static str;

    /// Collection name, filter allow-list and address-like fields.
    const QUERY: QueryBuilder;

    /// Decode one raw record, rejecting missing required relations.
    fn decode(ctx: &Context, raw: &Value) -> SyncResult<Self::State>;

    fn id_of(state: &Self::State) -> &EntityId;

    /// Remove filters the index cannot evaluate for this kind.
    fn client_filters(_options: &mut QueryOptions) -> Vec<Filter> {
        Vec::new()
    }

    /// Evaluate filters returned by [`EntityKind::client_filters`].
    fn accepts(_state: &Self::State, _filters: &[Filter]) -> bool {
        true
    }

    /// Live view of one entity: `None` while it is not indexed.
    ///
    /// Defaults to a record lookup by id.
    fn watch(ctx: &Context, id: &EntityId, policy: FetchPolicy) -> LiveStream<Option<Self::State>> {
        let query = Self::QUERY.record(id).with_policy(policy);
        let decode_ctx = ctx.clone();
        subscribe_one(ctx.port().as_ref(), &query, move |raw| {
            Self::decode(&decode_ctx, raw)
        })
    }
}

/// How [`Entity::fetch_state`] may be satisfied.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Keep waiting through absent emissions instead of failing.
    pub wait_for_indexation: bool,
    /// Bypass the cache and any shared feed.
    pub force_refetch: bool,
    /// Feed policy when not forced; the context default otherwise.
    pub policy: Option<FetchPolicy>,
    /// Completes a pending fetch with `Canceled`.
    pub cancel: Option<CancelSignal>,
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn wait_for_indexation(mut self) -> Self {
        self.wait_for_indexation = true;
        self
    }

    #[must_use]
    pub fn refetch(mut self) -> Self {
        self.force_refetch = true;
        self
    }

    #[must_use]
    pub fn policy(mut self, policy: FetchPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    #[must_use]
    pub fn cancel_on(mut self, signal: CancelSignal) -> Self {
        self.cancel = Some(signal);
        self
    }
}

type Cache<S> = Arc<Mutex<Option<Arc<S>>>>;

/// An identity plus an optional cached snapshot.
///
/// Two instances for the same id keep independent caches; compare entities
/// by [`Entity::id`].
pub struct Entity<K: EntityKind> {
    id: EntityId,
    context: Context,
    cache: Cache<K::State>,
}

/// Clones are the same handle and share its cache.
impl<K: EntityKind> Clone for Entity<K> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            context: self.context.clone(),
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<K: EntityKind> fmt::Debug for Entity<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(K::NAME)
            .field("id", &self.id)
            .field("cached", &self.cache.lock().is_some())
            .finish()
    }
}

impl<K: EntityKind> PartialEq for Entity<K> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<K: EntityKind> Entity<K> {
    /// An entity whose state is fetched lazily.
    pub fn from_id(ctx: &Context, id: impl Into<EntityId>) -> Self {
        Self {
            id: id.into(),
            context: ctx.clone(),
            cache: Arc::new(Mutex::new(None)),
        }
    }

    /// An entity with its state already decoded.
    pub fn from_state(ctx: &Context, state: K::State) -> Self {
        Self {
            id: K::id_of(&state).clone(),
            context: ctx.clone(),
            cache: Arc::new(Mutex::new(Some(Arc::new(state)))),
        }
    }

    pub fn id(&self) -> &EntityId {
        &self.id
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn cached_state(&self) -> Option<Arc<K::State>> {
        self.cache.lock().clone()
    }

    /// Live snapshots of this entity. Cold; every found snapshot replaces the cache.
    pub fn live_state(&self, policy: FetchPolicy) -> LiveStream<Option<Arc<K::State>>> {
        self.live_state_checked(policy, |_| Ok(()))
    }

    /// Live snapshots that must pass `check` before they reach the cache.
    ///
    /// A rejected snapshot is never cached; its error ends the stream.
    pub fn live_state_checked<F>(
        &self,
        policy: FetchPolicy,
        mut check: F,
    ) -> LiveStream<Option<Arc<K::State>>>
    where
        F: FnMut(&Arc<K::State>) -> SyncResult<()> + Send + 'static,
    {
        let cache = Arc::clone(&self.cache);
        let checked = K::watch(&self.context, &self.id, policy)
            .map(move |item| {
                let state = item?.map(Arc::new);
                if let Some(found) = &state {
                    check(found)?;
                    *cache.lock() = Some(Arc::clone(found));
                }
                Ok(state)
            })
            .boxed();
        end_after_error(checked)
    }

    /// Live snapshots with the context's default policy.
    pub fn state(&self) -> LiveStream<Option<Arc<K::State>>> {
        self.live_state(self.context.config().default_fetch_policy)
    }

    /// Resolve to one state snapshot, per the table in the module docs.
    pub async fn fetch_state(&self, options: FetchOptions) -> SyncResult<Arc<K::State>> {
        if !options.wait_for_indexation && !options.force_refetch {
            if let Some(cached) = self.cached_state() {
                return Ok(cached);
            }
        }

        let policy = if options.force_refetch {
            FetchPolicy::Fresh
        } else {
            options
                .policy
                .unwrap_or(self.context.config().default_fetch_policy)
        };
        let stream = self.live_state(policy);
        let span = entity_span!("fetch_state", K::NAME, self.id);

        async move {
            if options.wait_for_indexation {
                info!("Waiting for indexation");
                let found = wait_until(stream, Option::is_some, options.cancel).await?;
                found.ok_or_else(|| SyncError::not_indexed(K::NAME, &self.id))
            } else {
                let stream = match options.cancel {
                    Some(signal) => until_cancelled(stream, signal),
                    None => stream,
                };
                first_value(stream)
                    .await?
                    .ok_or_else(|| SyncError::not_indexed(K::NAME, &self.id))
            }
        }
        .instrument(span)
        .await
    }

    /// Live list of entities matching `options`, each carrying its decoded state.
    ///
    /// Ordered as requested; a malformed record ends the stream with its error.
    pub fn search(ctx: &Context, options: &QueryOptions) -> LiveStream<Vec<Self>> {
        let mut options = options.clone();
        let client = K::client_filters(&mut options);
        let query = match K::QUERY.build(&options) {
            Ok(query) => query,
            Err(e) => return once(Err(e)),
        };
        let decode_ctx = ctx.clone();
        let states = subscribe_list(ctx.port().as_ref(), &query, move |raw| {
            K::decode(&decode_ctx, raw)
        });

        let ctx = ctx.clone();
        states
            .map(move |batch| {
                Ok(batch?
                    .into_iter()
                    .filter(|state| client.is_empty() || K::accepts(state, &client))
                    .map(|state| Self::from_state(&ctx, state))
                    .collect())
            })
            .boxed()
    }
}

/// Add `field = value` to `options` unless the caller already filtered on it.
pub(crate) fn scoped(
    mut options: QueryOptions,
    field: &str,
    value: impl Into<FilterValue>,
) -> QueryOptions {
    options.take_filters(field);
    options.where_eq(field, value)
}
