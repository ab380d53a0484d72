//! # Governance Metrics
//!
//! Prometheus metrics for submitted actions and observed lifecycle
//! violations.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! gs-03-governance = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `governance_actions_submitted_total` - Counter of actions sent to the ledger (by kind)
//! - `governance_actions_rejected_total` - Counter of actions refused by a guard or the ledger (by kind)
//! - `governance_lifecycle_violations_total` - Counter of rejected snapshot sequences (by kind)

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter_vec, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Actions handed to the ledger gateway
    pub static ref ACTIONS_SUBMITTED: IntCounterVec = register_int_counter_vec!(
        "governance_actions_submitted_total",
        "Total number of governance actions submitted to the ledger",
        &["kind"]
    )
    .expect("Failed to create ACTIONS_SUBMITTED metric");

    /// Actions refused locally or by the ledger
    pub static ref ACTIONS_REJECTED: IntCounterVec = register_int_counter_vec!(
        "governance_actions_rejected_total",
        "Total number of governance actions rejected",
        &["kind"]
    )
    .expect("Failed to create ACTIONS_REJECTED metric");

    /// Snapshot sequences the lifecycle rules rejected
    pub static ref LIFECYCLE_VIOLATIONS: IntCounterVec = register_int_counter_vec!(
        "governance_lifecycle_violations_total",
        "Total number of proposal lifecycle violations observed",
        &["kind"]
    )
    .expect("Failed to create LIFECYCLE_VIOLATIONS metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

#[cfg(feature = "metrics")]
pub fn record_action_submitted(kind: &str) {
    ACTIONS_SUBMITTED.with_label_values(&[kind]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_action_rejected(kind: &str) {
    ACTIONS_REJECTED.with_label_values(&[kind]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_violation(kind: &str) {
    LIFECYCLE_VIOLATIONS.with_label_values(&[kind]).inc();
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_action_submitted(_kind: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_action_rejected(_kind: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_violation(_kind: &str) {}
