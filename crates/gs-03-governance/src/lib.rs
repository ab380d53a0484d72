//! # gs-03-governance
//!
//! Proposal lifecycle rules, a lifecycle monitor over live snapshots and the
//! governance action surface.
//!
//! ## Overview
//!
//! The index decides every stage transition. This crate never predicts one;
//! it interprets and validates what the index reports:
//!
//! - **Rules** ([`domain::rules`]): confidence, boosting threshold, voting
//!   deadlines, execution and claim eligibility
//! - **Lifecycle** ([`domain::lifecycle`]): single-snapshot and pairwise
//!   invariants (stage order, un-boost, terminal stages, frozen rewards and
//!   tallies, quiet-ending restarts)
//! - **Monitor** ([`LifecycleMonitor`]): a proposal subscription that ends
//!   with `SyncError::Invalid` on the first violation
//! - **Service** ([`GovernanceService`]): create, vote, stake, approve,
//!   execute, claim and wait-for-stage
//!
//! ## Confidence
//!
//! ```text
//! confidence = floor(stakesFor * SCALE / max(stakesAgainst, 1))
//! boosting   ⇔ confidence ≥ threshold
//! ```
//!
//! `SCALE` comes from `ClientConfig::confidence_scale`.
//!
//! ## Example
//!
//! ```rust,ignore
//! let service = GovernanceService::new(ctx.clone());
//! service.stake(&proposal, ProposalOutcome::Pass, amount).await?;
//! let boosted = service
//!     .wait_for_stage(&proposal, ProposalStage::PreBoosted, None)
//!     .await?;
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod domain;
pub mod error;
pub mod metrics;
pub mod monitor;
pub mod service;

#[cfg(test)]
pub(crate) mod fixtures;

pub use domain::{validate_snapshot, validate_transition, ProtocolParams};
pub use error::{LifecycleResult, LifecycleViolation};
pub use monitor::LifecycleMonitor;
pub use service::{GovernanceService, ProposalDraft};
