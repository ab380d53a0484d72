//! # Index Port Metrics
//!
//! Prometheus metrics for query volume and live feed health.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! gs-01-index-port = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `index_queries_total` - Counter of point-in-time queries (by collection)
//! - `index_feeds_opened_total` - Counter of upstream subscriptions opened
//! - `index_feeds_active` - Gauge of upstream subscriptions currently open
//! - `index_decode_failures_total` - Counter of records rejected by a decoder (by collection)

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_int_counter, register_int_counter_vec, register_int_gauge, IntCounter,
    IntCounterVec, IntGauge,
};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Point-in-time queries, labeled by collection
    pub static ref QUERIES: IntCounterVec = register_int_counter_vec!(
        "index_queries_total",
        "Total number of point-in-time index queries",
        &["collection"]
    )
    .expect("Failed to create QUERIES metric");

    /// Upstream subscriptions opened
    pub static ref FEEDS_OPENED: IntCounter = register_int_counter!(
        "index_feeds_opened_total",
        "Total number of upstream index subscriptions opened"
    )
    .expect("Failed to create FEEDS_OPENED metric");

    /// Upstream subscriptions currently open
    pub static ref FEEDS_ACTIVE: IntGauge = register_int_gauge!(
        "index_feeds_active",
        "Number of upstream index subscriptions currently open"
    )
    .expect("Failed to create FEEDS_ACTIVE metric");

    /// Records rejected by a decoder, labeled by collection
    pub static ref DECODE_FAILURES: IntCounterVec = register_int_counter_vec!(
        "index_decode_failures_total",
        "Total number of index records rejected by a decoder",
        &["collection"]
    )
    .expect("Failed to create DECODE_FAILURES metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

#[cfg(feature = "metrics")]
pub fn record_query(collection: &str) {
    QUERIES.with_label_values(&[collection]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_feed_opened() {
    FEEDS_OPENED.inc();
    FEEDS_ACTIVE.inc();
}

#[cfg(feature = "metrics")]
pub fn record_feed_closed() {
    FEEDS_ACTIVE.dec();
}

#[cfg(feature = "metrics")]
pub fn record_decode_failure(collection: &str) {
    DECODE_FAILURES.with_label_values(&[collection]).inc();
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_query(_collection: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_feed_opened() {}

#[cfg(not(feature = "metrics"))]
pub fn record_feed_closed() {}

#[cfg(not(feature = "metrics"))]
pub fn record_decode_failure(_collection: &str) {}
