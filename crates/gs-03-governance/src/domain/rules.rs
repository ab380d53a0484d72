//! # Lifecycle Rules
//!
//! Pure functions over proposal snapshots. None of them predict a transition;
//! they interpret and check what the index reports.
//!
//! ```text
//!            confidence ≥ threshold               pre-boost delay
//! [Queued] ─────────────────────────→ [PreBoosted] ───────────────→ [Boosted]
//!    ↑  │         confidence < threshold  │  │ ↑                       │  │
//!    │  │ ←───────────────────────────────┘  │ └──── un-boost ─────────┘  │
//!    │  │                                    │                             │ flip in 2nd half
//!    │  └── expiry ──→ [ExpiredInQueue] ←────┘                             ↓
//!    │                                                         [QuietEndingPeriod] ⟲ flip restarts
//!    │                                                                     │
//!    └── (execution after the governing limit) ────────────────→ [Executed]
//! ```

use super::params::ProtocolParams;
use gs_02_entities::{confidence_at, ProposalStage, ProposalState};
use shared_types::{Amount, Timestamp};

/// `floor(stakes_for * scale / max(stakes_against, 1))`.
pub fn confidence(stakes_for: Amount, stakes_against: Amount, scale: Amount) -> Amount {
    confidence_at(stakes_for, stakes_against, scale)
}

/// The threshold that applies to `state`: its own when recorded, the queue's otherwise.
pub fn threshold_for(state: &ProposalState, params: &ProtocolParams) -> Amount {
    state.boosting_threshold.unwrap_or(params.threshold)
}

/// Whether the staked confidence is at or above the boosting threshold.
pub fn meets_boosting_threshold(state: &ProposalState, params: &ProtocolParams) -> bool {
    let confidence = confidence(
        state.stakes_for,
        state.stakes_against,
        params.confidence_scale,
    );
    confidence >= threshold_for(state, params)
}

/// Stage a confidence crossing leads to. Only the queued/pre-boosted pair reacts.
pub fn expected_stage_for_confidence(stage: ProposalStage, meets_threshold: bool) -> ProposalStage {
    match (stage, meets_threshold) {
        (ProposalStage::Queued, true) => ProposalStage::PreBoosted,
        (ProposalStage::PreBoosted, false) => ProposalStage::Queued,
        (other, _) => other,
    }
}

/// End of the window that governs `state`'s current stage.
///
/// - `Queued`: queue expiry, from creation
/// - `PreBoosted`: pre-boosted limit, from the confidence crossing
/// - `Boosted`: boosted limit, from `boosted_at`
/// - `QuietEndingPeriod`: quiet-ending period, from its latest restart
///
/// Limits recorded on the proposal win over the queue's. Terminal stages and
/// stages missing their start instant have no deadline.
pub fn voting_deadline(state: &ProposalState, params: &ProtocolParams) -> Option<Timestamp> {
    match state.stage {
        ProposalStage::Queued => state
            .expires_in_queue_at
            .or_else(|| state.created_at.checked_add(params.queued_vote_period_limit)),
        ProposalStage::PreBoosted => {
            let limit = state
                .pre_boosted_vote_period_limit
                .unwrap_or(params.pre_boosted_vote_period_limit);
            state.pre_boosted_at.or(state.boosted_at)?.checked_add(limit)
        }
        ProposalStage::Boosted => {
            let limit = boosted_limit(state, params);
            state.boosted_at?.checked_add(limit)
        }
        ProposalStage::QuietEndingPeriod => state
            .quiet_ending_period_began_at?
            .checked_add(params.quiet_ending_period),
        ProposalStage::Executed | ProposalStage::ExpiredInQueue => None,
    }
}

pub(crate) fn boosted_limit(state: &ProposalState, params: &ProtocolParams) -> u64 {
    state
        .boosted_vote_period_limit
        .unwrap_or(params.boosted_vote_period_limit)
}

/// Instant after which an outcome flip enters the quiet-ending period.
pub fn boosted_half_point(state: &ProposalState, params: &ProtocolParams) -> Option<Timestamp> {
    state
        .boosted_at?
        .checked_add(boosted_limit(state, params) / 2)
}

/// Whether an execute action can succeed at `now`.
///
/// A ledger may still revert; this only filters out calls that cannot work.
pub fn is_executable_at(state: &ProposalState, params: &ProtocolParams, now: Timestamp) -> bool {
    if state.stage.is_terminal() {
        return false;
    }
    voting_deadline(state, params).is_some_and(|deadline| now >= deadline)
}

/// Whether `next` had to restart the quiet-ending window relative to `prev`.
///
/// Only an outcome flip while already in the quiet-ending period restarts
/// it; the latest flip wins.
pub fn quiet_ending_restart(prev: &ProposalState, next: &ProposalState) -> bool {
    prev.stage == ProposalStage::QuietEndingPeriod
        && next.stage == ProposalStage::QuietEndingPeriod
        && prev.winning_outcome != next.winning_outcome
}

/// Rewards are claimable only once executed.
pub fn can_claim(state: &ProposalState) -> bool {
    state.stage == ProposalStage::Executed
}
