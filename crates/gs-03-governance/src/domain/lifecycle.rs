//! # Proposal Lifecycle Validation
//!
//! Checks single snapshots and consecutive pairs against the governance
//! state machine. The index is the source of truth for transitions; this
//! module only rejects sequences no honest index could produce.
//!
//! ## Stage Order
//!
//! ```text
//!   ordinal:   0          1             2           3                 4
//!          [Queued] → [PreBoosted] → [Boosted] → [QuietEnding] → [Executed]
//!              ↑           │  ↑          │                         [ExpiredInQueue]
//!              └───────────┘  └──────────┘
//!             confidence drop    un-boost
//! ```
//!
//! - Forward moves may skip stages (the index can coalesce updates).
//! - The only backward moves are the two drawn above.
//! - Both ordinal-4 stages are terminal.
//! - `ExpiredInQueue` is reachable only from `Queued` or `PreBoosted`.
//!
//! ## Quiet Ending
//!
//! A boosted proposal whose winning outcome flips in the second half of its
//! boosted period enters the quiet-ending period. Every further flip
//! restarts it, so the latest flip wins.
//!
//! Flips that land between two snapshots are merged: a later start with the
//! same outcome is a double flip and is accepted. A start never moves back.

use super::params::ProtocolParams;
use super::rules::{boosted_half_point, quiet_ending_restart};
use crate::error::{LifecycleResult, LifecycleViolation};
use gs_02_entities::{ProposalStage, ProposalState};
use shared_types::Amount;

/// Check the invariants a single snapshot must satisfy.
pub fn validate_snapshot(state: &ProposalState) -> LifecycleResult<()> {
    let executed = state.stage == ProposalStage::Executed;
    if executed != state.executed_at.is_some() {
        return Err(LifecycleViolation::ExecutionMismatch {
            stage: state.stage,
            executed_at: state.executed_at,
        });
    }
    if state.stage.is_boosted() && state.boosted_at.is_none() {
        return Err(LifecycleViolation::MissingField {
            stage: state.stage,
            field: "boostedAt",
        });
    }
    if state.stage == ProposalStage::QuietEndingPeriod
        && state.quiet_ending_period_began_at.is_none()
    {
        return Err(LifecycleViolation::MissingField {
            stage: state.stage,
            field: "quietEndingPeriodBeganAt",
        });
    }
    Ok(())
}

/// Check that `next` may follow `prev` for the same proposal.
pub fn validate_transition(
    prev: &ProposalState,
    next: &ProposalState,
    params: &ProtocolParams,
) -> LifecycleResult<()> {
    if prev.id != next.id {
        return Err(LifecycleViolation::IdentityChanged {
            prev: prev.id.clone(),
            next: next.id.clone(),
        });
    }
    validate_snapshot(next)?;
    check_stage_move(prev.stage, next.stage)?;

    if prev.rewards != next.rewards || prev.proposing_rep_reward != next.proposing_rep_reward {
        return Err(LifecycleViolation::RewardsChanged);
    }
    check_tallies(prev, next)?;
    check_quiet_ending(prev, next, params)
}

fn check_stage_move(from: ProposalStage, to: ProposalStage) -> LifecycleResult<()> {
    use ProposalStage::*;

    if from == to {
        return Ok(());
    }
    if from.is_terminal() {
        return Err(LifecycleViolation::TerminalStageLeft { from, to });
    }
    if to == ExpiredInQueue && !matches!(from, Queued | PreBoosted) {
        return Err(LifecycleViolation::InvalidTransition { from, to });
    }
    let allowed_backstep = matches!((from, to), (Boosted, PreBoosted) | (PreBoosted, Queued));
    if to.ordinal() < from.ordinal() && !allowed_backstep {
        return Err(LifecycleViolation::StageRegressed { from, to });
    }
    Ok(())
}

fn tallies(state: &ProposalState) -> [(&'static str, Amount); 4] {
    [
        ("votesFor", state.votes_for),
        ("votesAgainst", state.votes_against),
        ("stakesFor", state.stakes_for),
        ("stakesAgainst", state.stakes_against),
    ]
}

fn check_tallies(prev: &ProposalState, next: &ProposalState) -> LifecycleResult<()> {
    for ((field, before), (_, after)) in tallies(prev).into_iter().zip(tallies(next)) {
        if prev.stage == ProposalStage::Executed && before != after {
            return Err(LifecycleViolation::TallyAfterExecution { field });
        }
        if prev.stage == next.stage && after < before {
            return Err(LifecycleViolation::TallyDecreased {
                field,
                stage: next.stage,
            });
        }
    }
    Ok(())
}

fn check_quiet_ending(
    prev: &ProposalState,
    next: &ProposalState,
    params: &ProtocolParams,
) -> LifecycleResult<()> {
    if next.stage != ProposalStage::QuietEndingPeriod {
        return Ok(());
    }

    match (prev.stage, prev.quiet_ending_period_began_at, next.quiet_ending_period_began_at) {
        (ProposalStage::QuietEndingPeriod, Some(before), Some(after)) => {
            if quiet_ending_restart(prev, next) {
                if after <= before {
                    return Err(LifecycleViolation::QuietEndingNotRestarted {
                        outcome: next.winning_outcome,
                    });
                }
            } else if after < before {
                return Err(LifecycleViolation::QuietEndingMoved { before, after });
            }
            Ok(())
        }
        (ProposalStage::Boosted, _, Some(began_at)) => match boosted_half_point(next, params) {
            Some(half_at) if began_at <= half_at => {
                Err(LifecycleViolation::QuietEndingTooEarly { began_at, half_at })
            }
            _ => Ok(()),
        },
        _ => Ok(()),
    }
}
