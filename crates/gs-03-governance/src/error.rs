//! Lifecycle violations found in observed proposal snapshots.

use gs_02_entities::{ProposalOutcome, ProposalStage};
use shared_types::{EntityId, Timestamp};
use thiserror::Error;

/// A snapshot, or a pair of consecutive snapshots, the lifecycle rules reject.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleViolation {
    /// `executedAt` must be set exactly when the stage is `Executed`
    #[error("executedAt {executed_at:?} does not match stage {stage}")]
    ExecutionMismatch {
        stage: ProposalStage,
        executed_at: Option<Timestamp>,
    },

    /// A stage-specific instant is unset
    #[error("stage {stage} requires {field}")]
    MissingField {
        stage: ProposalStage,
        field: &'static str,
    },

    /// Consecutive snapshots describe different proposals
    #[error("snapshot for {next} follows snapshot for {prev}")]
    IdentityChanged { prev: EntityId, next: EntityId },

    #[error("stage regressed from {from} to {to}")]
    StageRegressed {
        from: ProposalStage,
        to: ProposalStage,
    },

    #[error("terminal stage {from} left for {to}")]
    TerminalStageLeft {
        from: ProposalStage,
        to: ProposalStage,
    },

    #[error("invalid transition from {from} to {to}")]
    InvalidTransition {
        from: ProposalStage,
        to: ProposalStage,
    },

    #[error("rewards changed after creation")]
    RewardsChanged,

    #[error("{field} changed after execution")]
    TallyAfterExecution { field: &'static str },

    #[error("{field} decreased within stage {stage}")]
    TallyDecreased {
        field: &'static str,
        stage: ProposalStage,
    },

    /// An outcome flip during the quiet ending period must restart it
    #[error("outcome flipped to {outcome} without restarting the quiet ending period")]
    QuietEndingNotRestarted { outcome: ProposalOutcome },

    /// The quiet ending period only starts in the second half of the boosted period
    #[error("quiet ending period began at {began_at}, before {half_at}")]
    QuietEndingTooEarly {
        began_at: Timestamp,
        half_at: Timestamp,
    },

    /// A restart never moves the quiet ending period backwards
    #[error("quiet ending period moved back from {before} to {after}")]
    QuietEndingMoved { before: Timestamp, after: Timestamp },
}

impl LifecycleViolation {
    /// Metric label.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ExecutionMismatch { .. } => "execution_mismatch",
            Self::MissingField { .. } => "missing_field",
            Self::IdentityChanged { .. } => "identity_changed",
            Self::StageRegressed { .. } => "stage_regressed",
            Self::TerminalStageLeft { .. } => "terminal_stage_left",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::RewardsChanged => "rewards_changed",
            Self::TallyAfterExecution { .. } => "tally_after_execution",
            Self::TallyDecreased { .. } => "tally_decreased",
            Self::QuietEndingNotRestarted { .. } => "quiet_ending_not_restarted",
            Self::QuietEndingTooEarly { .. } => "quiet_ending_too_early",
            Self::QuietEndingMoved { .. } => "quiet_ending_moved",
        }
    }
}

pub type LifecycleResult<T> = Result<T, LifecycleViolation>;
