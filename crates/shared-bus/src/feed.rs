//! # Shared Feed
//!
//! Broadcast join over a single upstream subscription.
//!
//! The upstream is opened when the first subscriber attaches and released
//! when the last one detaches. Every subscriber sees the same values in
//! upstream order; a subscriber attaching mid-flight first receives the
//! latest value.

use crate::live::LiveStream;
use crate::DEFAULT_CHANNEL_CAPACITY;
use futures::{Stream, StreamExt};
use parking_lot::Mutex;
use shared_types::{SyncError, SyncResult};
use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tracing::debug;

/// Opens a fresh upstream stream. Called once per feed activation.
pub type UpstreamFactory<T> = Arc<dyn Fn() -> LiveStream<T> + Send + Sync>;

#[derive(Debug, Clone)]
enum FeedEvent<T> {
    Item(T),
    Failed(SyncError),
    Completed,
}

struct FeedState<T> {
    sender: Option<broadcast::Sender<FeedEvent<T>>>,
    pump: Option<JoinHandle<()>>,
    latest: Option<T>,
    terminal: Option<FeedEvent<T>>,
    subscribers: usize,
    /// Bumped on every activation so a stale pump cannot publish.
    generation: u64,
}

impl<T> FeedState<T> {
    fn release(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
        self.sender = None;
        self.latest = None;
        self.terminal = None;
    }
}

/// A single upstream subscription shared by many consumers.
pub struct SharedFeed<T> {
    key: String,
    factory: UpstreamFactory<T>,
    capacity: usize,
    state: Arc<Mutex<FeedState<T>>>,
    upstreams_opened: AtomicU64,
}

impl<T> SharedFeed<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create an inactive feed. Nothing is opened until [`SharedFeed::subscribe`].
    pub fn new(key: impl Into<String>, factory: UpstreamFactory<T>) -> Self {
        Self::with_capacity(key, factory, DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(key: impl Into<String>, factory: UpstreamFactory<T>, capacity: usize) -> Self {
        Self {
            key: key.into(),
            factory,
            capacity: capacity.max(1),
            state: Arc::new(Mutex::new(FeedState {
                sender: None,
                pump: None,
                latest: None,
                terminal: None,
                subscribers: 0,
                generation: 0,
            })),
            upstreams_opened: AtomicU64::new(0),
        }
    }

    /// Attach a consumer, opening the upstream if this is the first one.
    ///
    /// Must be called within a Tokio runtime.
    pub fn subscribe(&self) -> FeedSubscription<T> {
        let mut state = self.state.lock();

        let existing = state.sender.as_ref().map(broadcast::Sender::subscribe);
        let receiver = match existing {
            Some(receiver) => receiver,
            None => {
                let (sender, receiver) = broadcast::channel(self.capacity);
                state.generation += 1;
                state.sender = Some(sender.clone());

                let upstream = (self.factory)();
                self.upstreams_opened.fetch_add(1, Ordering::Relaxed);
                let pump = pump(
                    upstream,
                    sender,
                    Arc::clone(&self.state),
                    state.generation,
                    self.key.clone(),
                );
                state.pump = Some(tokio::spawn(pump));
                debug!(key = %self.key, generation = state.generation, "Feed activated");
                receiver
            }
        };

        let mut replay = VecDeque::with_capacity(2);
        if let Some(latest) = state.latest.clone() {
            replay.push_back(FeedEvent::Item(latest));
        }
        if let Some(terminal) = state.terminal.clone() {
            replay.push_back(terminal);
        }
        state.subscribers += 1;

        FeedSubscription {
            replay,
            inner: BroadcastStream::new(receiver),
            state: Arc::clone(&self.state),
            generation: state.generation,
            key: self.key.clone(),
            finished: false,
        }
    }

    /// A cold [`LiveStream`] that subscribes on first poll.
    pub fn stream(self: &Arc<Self>) -> LiveStream<T> {
        let feed = Arc::clone(self);
        crate::live::lazy(move || feed.subscribe().boxed())
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn subscriber_count(&self) -> usize {
        self.state.lock().subscribers
    }

    pub fn is_active(&self) -> bool {
        self.state.lock().sender.is_some()
    }

    /// Whether the upstream has ended (completed or failed).
    pub fn is_terminated(&self) -> bool {
        self.state.lock().terminal.is_some()
    }

    /// Number of times the upstream has been opened.
    pub fn upstreams_opened(&self) -> u64 {
        self.upstreams_opened.load(Ordering::Relaxed)
    }
}

async fn pump<T>(
    mut upstream: LiveStream<T>,
    sender: broadcast::Sender<FeedEvent<T>>,
    state: Arc<Mutex<FeedState<T>>>,
    generation: u64,
    key: String,
) where
    T: Clone + Send + Sync + 'static,
{
    while let Some(next) = upstream.next().await {
        let failed = next.is_err();
        let event = match next {
            Ok(value) => FeedEvent::Item(value),
            Err(e) => FeedEvent::Failed(e),
        };
        if !publish(&state, &sender, generation, event) || failed {
            debug!(key = %key, failed, "Feed pump stopped");
            return;
        }
    }
    publish(&state, &sender, generation, FeedEvent::Completed);
    debug!(key = %key, "Feed upstream completed");
}

/// Record and fan out one event. Returns false if the feed was released.
fn publish<T: Clone>(
    state: &Mutex<FeedState<T>>,
    sender: &broadcast::Sender<FeedEvent<T>>,
    generation: u64,
    event: FeedEvent<T>,
) -> bool {
    let mut guard = state.lock();
    if guard.generation != generation || guard.sender.is_none() {
        return false;
    }
    match &event {
        FeedEvent::Item(value) => guard.latest = Some(value.clone()),
        FeedEvent::Failed(_) | FeedEvent::Completed => guard.terminal = Some(event.clone()),
    }
    // No receivers is fine: the value is kept as `latest` for the next joiner.
    let _ = sender.send(event);
    true
}

/// One consumer's view of a [`SharedFeed`]. Detaches on drop.
pub struct FeedSubscription<T> {
    replay: VecDeque<FeedEvent<T>>,
    inner: BroadcastStream<FeedEvent<T>>,
    state: Arc<Mutex<FeedState<T>>>,
    generation: u64,
    key: String,
    finished: bool,
}

impl<T> FeedSubscription<T> {
    fn deliver(&mut self, event: FeedEvent<T>) -> Poll<Option<SyncResult<T>>> {
        match event {
            FeedEvent::Item(value) => Poll::Ready(Some(Ok(value))),
            FeedEvent::Failed(e) => {
                self.finished = true;
                Poll::Ready(Some(Err(e)))
            }
            FeedEvent::Completed => {
                self.finished = true;
                Poll::Ready(None)
            }
        }
    }
}

// No field is structurally pinned.
impl<T> Unpin for FeedSubscription<T> {}

impl<T> Stream for FeedSubscription<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Item = SyncResult<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }
        if let Some(event) = self.replay.pop_front() {
            return self.deliver(event);
        }
        loop {
            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(event))) => return self.deliver(event),
                Poll::Ready(Some(Err(BroadcastStreamRecvError::Lagged(count)))) => {
                    debug!(key = %self.key, lagged = count, "Subscriber lagged, skipping to newer snapshots");
                    continue;
                }
                Poll::Ready(None) => {
                    self.finished = true;
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

impl<T> Drop for FeedSubscription<T> {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        if state.generation != self.generation {
            return;
        }
        state.subscribers = state.subscribers.saturating_sub(1);
        if state.subscribers == 0 {
            state.release();
            debug!(key = %self.key, "Feed released");
        }
    }
}
