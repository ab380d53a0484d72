//! Protocol parameters a queue supplies to its proposals.

use gs_02_entities::{default_confidence_scale, QueueState};
use serde::{Deserialize, Serialize};
use shared_types::{Amount, Seconds};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolParams {
    /// Boosting threshold in confidence units.
    pub threshold: Amount,
    pub queued_vote_period_limit: Seconds,
    pub pre_boosted_vote_period_limit: Seconds,
    pub boosted_vote_period_limit: Seconds,
    pub quiet_ending_period: Seconds,
    /// Delay a pre-boosted proposal waits before it can be boosted.
    pub pre_boost_delay: Seconds,
    /// `SCALE` in `floor(stakesFor * SCALE / max(stakesAgainst, 1))`.
    pub confidence_scale: Amount,
}

impl ProtocolParams {
    pub fn from_queue(queue: &QueueState, confidence_scale: Amount) -> Self {
        Self {
            threshold: queue.threshold,
            queued_vote_period_limit: queue.queued_vote_period_limit,
            pre_boosted_vote_period_limit: queue.pre_boosted_vote_period_limit,
            boosted_vote_period_limit: queue.boosted_vote_period_limit,
            quiet_ending_period: queue.quiet_ending_period,
            pre_boost_delay: queue.activation_time,
            confidence_scale,
        }
    }
}

impl Default for ProtocolParams {
    /// Genesis protocol defaults: threshold 1.0 at the default scale.
    fn default() -> Self {
        Self {
            threshold: default_confidence_scale(),
            queued_vote_period_limit: 1_814_400,
            pre_boosted_vote_period_limit: 259_200,
            boosted_vote_period_limit: 345_600,
            quiet_ending_period: 172_800,
            pre_boost_delay: 86_400,
            confidence_scale: default_confidence_scale(),
        }
    }
}
