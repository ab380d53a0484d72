//! # Lifecycle Monitor
//!
//! Wraps a proposal's live snapshots and checks each one against the
//! lifecycle rules before passing it on.
//!
//! ```text
//! proposal.live_state_checked() ──→ [validate_snapshot / validate_transition] ──→ consumer
//!                                                │
//!                                                └── violation ──→ Err(Invalid), stream ends
//! ```
//!
//! Only the monitored subscription ends; other subscriptions on the same
//! index feed keep running.

use crate::domain::{validate_snapshot, validate_transition, ProtocolParams};
use crate::metrics;
use gs_02_entities::{FetchOptions, Proposal, ProposalState};
use shared_bus::LiveStream;
use shared_types::{SyncError, SyncResult};
use std::sync::Arc;
use tracing::warn;

/// Checks observed proposal snapshots against the lifecycle rules.
#[derive(Debug, Clone, Default)]
pub struct LifecycleMonitor {
    params: ProtocolParams,
}

impl LifecycleMonitor {
    pub fn new(params: ProtocolParams) -> Self {
        Self { params }
    }

    /// Build a monitor from the parameters of the proposal's own queue.
    pub async fn for_proposal(proposal: &Proposal) -> SyncResult<Self> {
        let queue = proposal.queue().await?;
        let state = queue.fetch_state(FetchOptions::new()).await?;
        let scale = proposal.context().config().confidence_scale;
        Ok(Self::new(ProtocolParams::from_queue(&state, scale)))
    }

    pub fn params(&self) -> &ProtocolParams {
        &self.params
    }

    /// Live snapshots of `proposal`, ended with `SyncError::Invalid` on the
    /// first snapshot that breaks the lifecycle rules. A rejected snapshot
    /// never reaches the proposal's cache.
    pub fn watch(&self, proposal: &Proposal) -> LiveStream<Option<Arc<ProposalState>>> {
        let params = self.params.clone();
        let id = proposal.id().clone();
        let policy = proposal.context().config().default_fetch_policy;
        let mut prev: Option<Arc<ProposalState>> = None;

        proposal.live_state_checked(policy, move |next| {
            let checked = match prev.as_deref() {
                Some(before) => validate_transition(before, next, &params),
                None => validate_snapshot(next),
            };
            match checked {
                Ok(()) => {
                    prev = Some(Arc::clone(next));
                    Ok(())
                }
                Err(violation) => {
                    warn!(proposal = %id, violation = %violation, "Lifecycle violation observed");
                    metrics::record_violation(violation.kind());
                    Err(SyncError::invalid("proposal", violation.to_string()))
                }
            }
        })
    }
}
