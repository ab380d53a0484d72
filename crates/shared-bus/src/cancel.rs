//! # Cancellation
//!
//! A consumer-owned switch that completes pending waits with
//! [`SyncError::Canceled`](shared_types::SyncError::Canceled) instead of
//! leaving them suspended.

use tokio::sync::watch;

/// The owning side of a cancellation switch.
///
/// Dropping the source does not cancel; call [`CancelSource::cancel`].
#[derive(Debug)]
pub struct CancelSource {
    sender: watch::Sender<bool>,
}

/// A cloneable view of a [`CancelSource`].
#[derive(Debug, Clone)]
pub struct CancelSignal {
    receiver: watch::Receiver<bool>,
}

impl CancelSource {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self { sender }
    }

    #[must_use]
    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            receiver: self.sender.subscribe(),
        }
    }

    /// Cancel every signal derived from this source. Idempotent.
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }
}

impl Default for CancelSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelSignal {
    /// A signal that never fires.
    #[must_use]
    pub fn never() -> Self {
        let (_, receiver) = watch::channel(false);
        Self { receiver }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolve once the source is cancelled.
    ///
    /// Pends forever if the source is dropped without cancelling.
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        loop {
            if *receiver.borrow_and_update() {
                return;
            }
            if receiver.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}
