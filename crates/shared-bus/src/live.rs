//! # Live Streams
//!
//! A live sequence is a boxed `Stream` of `SyncResult<T>`. An `Err` item is
//! terminal: producers end the stream after yielding it.

use crate::cancel::CancelSignal;
use futures::stream::{self, Stream, StreamExt};
use shared_types::{SyncError, SyncResult};
use std::pin::Pin;

/// A cold, cancelable sequence of values.
pub type LiveStream<T> = Pin<Box<dyn Stream<Item = SyncResult<T>> + Send + 'static>>;

/// Defer building a stream until the consumer first polls it.
pub fn lazy<T, F>(build: F) -> LiveStream<T>
where
    T: Send + 'static,
    F: FnOnce() -> LiveStream<T> + Send + 'static,
{
    stream::once(async move { build() }).flatten().boxed()
}

/// A finite stream of successful values.
pub fn values<T>(items: Vec<T>) -> LiveStream<T>
where
    T: Send + 'static,
{
    stream::iter(items.into_iter().map(Ok)).boxed()
}

/// A stream that yields a single result and ends.
pub fn once<T>(item: SyncResult<T>) -> LiveStream<T>
where
    T: Send + 'static,
{
    stream::iter(std::iter::once(item)).boxed()
}

/// End the stream as soon as `signal` fires. Dropping the inner stream
/// releases its upstream.
pub fn until_cancelled<T>(stream: LiveStream<T>, signal: CancelSignal) -> LiveStream<T>
where
    T: Send + 'static,
{
    stream
        .take_until(async move { signal.cancelled().await })
        .boxed()
}

/// Yield items until the first error, then end without polling `stream`
/// again. The upstream is dropped together with that error.
pub fn end_after_error<T>(stream: LiveStream<T>) -> LiveStream<T>
where
    T: Send + 'static,
{
    stream::unfold(Some(stream), |state| async move {
        let mut stream = state?;
        match stream.next().await? {
            Ok(value) => Some((Ok(value), Some(stream))),
            Err(e) => Some((Err(e), None)),
        }
    })
    .boxed()
}

/// Take the first emitted value.
///
/// A stream that ends before emitting resolves to `SyncError::Canceled`.
pub async fn first_value<T>(mut stream: LiveStream<T>) -> SyncResult<T> {
    match stream.next().await {
        Some(item) => item,
        None => Err(SyncError::Canceled),
    }
}

/// Wait for the first value satisfying `predicate`.
///
/// Resolves to `SyncError::Canceled` when `cancel` fires or the stream ends,
/// and to the stream's error if it fails first. No timeout is applied.
pub async fn wait_until<T, P>(
    mut stream: LiveStream<T>,
    mut predicate: P,
    cancel: Option<CancelSignal>,
) -> SyncResult<T>
where
    P: FnMut(&T) -> bool,
{
    let cancel = cancel.unwrap_or_else(CancelSignal::never);
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SyncError::Canceled),
            next = stream.next() => match next {
                Some(Ok(value)) if predicate(&value) => return Ok(value),
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(e),
                None => return Err(SyncError::Canceled),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancelSource;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_lazy_is_cold() {
        let built = Arc::new(AtomicBool::new(false));
        let flag = built.clone();
        let stream = lazy(move || {
            flag.store(true, Ordering::SeqCst);
            values(vec![1u32])
        });

        assert!(!built.load(Ordering::SeqCst));
        assert_eq!(first_value(stream).await, Ok(1));
        assert!(built.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_first_value_of_empty_stream_is_canceled() {
        let result = first_value(values::<u32>(vec![])).await;
        assert_eq!(result, Err(SyncError::Canceled));
    }

    #[tokio::test]
    async fn test_wait_until_skips_until_predicate() {
        let stream = values(vec![None, None, Some(7u32)]);
        let got = wait_until(stream, |v| v.is_some(), None).await;
        assert_eq!(got, Ok(Some(7)));
    }

    #[tokio::test]
    async fn test_wait_until_propagates_error() {
        let stream: LiveStream<u32> = stream::iter(vec![
            Ok(1),
            Err(SyncError::invalid("vote", "missing proposal")),
        ])
        .boxed();
        let got = wait_until(stream, |v| *v > 5, None).await;
        assert!(matches!(got, Err(SyncError::Invalid { .. })));
    }

    #[tokio::test]
    async fn test_wait_until_cancel_completes_pending_wait() {
        let source = CancelSource::new();
        let pending: LiveStream<u32> = stream::pending().boxed();
        let waiter = tokio::spawn(wait_until(pending, |_| true, Some(source.signal())));

        source.cancel();
        let result = timeout(Duration::from_millis(100), waiter)
            .await
            .expect("timeout")
            .expect("join");
        assert_eq!(result, Err(SyncError::Canceled));
    }

    /// Flags its owner as dropped.
    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_end_after_error_ends_while_upstream_stays_open() {
        let released = Arc::new(AtomicBool::new(false));
        let guard = DropFlag(released.clone());
        let upstream: LiveStream<u32> = stream::iter(vec![
            Ok(1),
            Err(SyncError::invalid("vote", "missing proposal.id")),
        ])
        .chain(stream::pending())
        .map(move |item| {
            let _held = &guard;
            item
        })
        .boxed();
        let mut stream = end_after_error(upstream);

        assert_eq!(stream.next().await, Some(Ok(1)));
        assert!(matches!(stream.next().await, Some(Err(SyncError::Invalid { .. }))));
        assert!(released.load(Ordering::SeqCst));

        let end = timeout(Duration::from_millis(100), stream.next())
            .await
            .expect("timeout");
        assert!(end.is_none());
    }

    #[tokio::test]
    async fn test_until_cancelled_ends_stream() {
        let source = CancelSource::new();
        let pending: LiveStream<u32> = stream::pending().boxed();
        let mut stream = until_cancelled(pending, source.signal());
        source.cancel();
        let next = timeout(Duration::from_millis(100), stream.next())
            .await
            .expect("timeout");
        assert!(next.is_none());
    }
}
