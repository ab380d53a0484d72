//! # Shared Bus - Live Sequences
//!
//! The push-based plumbing every entity subscription runs on.
//!
//! ## Contract
//!
//! - **Cold:** a [`LiveStream`] does no work and acquires no upstream
//!   resource until a consumer first polls it.
//! - **Scoped:** the upstream is released exactly once when the last
//!   consumer detaches, whether by completion, error or drop.
//! - **Ordered:** a single feed delivers values in upstream order; a lagging
//!   subscriber may skip intermediate snapshots but never reorders them.
//!
//! ## Broadcast Join
//!
//! ```text
//!                      ┌──────────────┐
//!  upstream ──pump──→  │  SharedFeed  │ ──→ FeedSubscription (consumer A)
//!  (one per feed)      │  latest + tx │ ──→ FeedSubscription (consumer B)
//!                      └──────────────┘ ──→ ...
//! ```
//!
//! Late joiners first receive the latest snapshot, then live updates.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod cancel;
pub mod feed;
pub mod live;

// Re-export main types
pub use cancel::{CancelSignal, CancelSource};
pub use feed::{FeedSubscription, SharedFeed, UpstreamFactory};
pub use live::{end_after_error, first_value, lazy, once, until_cancelled, values, wait_until, LiveStream};

/// Maximum snapshots buffered per subscriber before it starts lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;
