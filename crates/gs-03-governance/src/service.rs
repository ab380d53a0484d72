//! # Governance Service
//!
//! The action surface over a [`Context`]: create, vote, stake, approve,
//! execute and claim.
//!
//! ## Guards vs. Ledger
//!
//! | Failure | Error | Reaches ledger |
//! |---------|-------|----------------|
//! | Guard on the latest snapshot fails | `ActionNotAllowed` | no |
//! | Capability not configured | `ConfigurationMissing` | no |
//! | Gateway error or reverted receipt | `ActionRejected` | yes |
//!
//! Guards read a freshly fetched snapshot, but the index may lag the ledger,
//! so a guard that passes can still end in `ActionRejected`. Nothing is
//! retried.
//!
//! A succeeded receipt does not mean the index reflects the action yet. Use
//! [`GovernanceService::wait_for_stage`] or a live subscription to observe
//! the effect.

use crate::domain::can_claim;
use crate::metrics;
use gs_02_entities::{
    ActionReceipt, Context, FetchOptions, LedgerAction, Proposal, ProposalOutcome,
    ProposalRewards, ProposalStage, ProposalState,
};
use serde_json::json;
use shared_bus::{wait_until, CancelSignal};
use shared_types::{Address, Amount, EntityId, SyncError, SyncResult};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Everything needed to submit a new proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalDraft {
    pub dao: EntityId,
    pub scheme: EntityId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub beneficiary: Option<Address>,
    pub rewards: ProposalRewards,
    pub external_token: Option<Address>,
    pub call_data: Option<String>,
    pub value: Amount,
}

impl ProposalDraft {
    pub fn new(dao: impl Into<EntityId>, scheme: impl Into<EntityId>) -> Self {
        Self {
            dao: dao.into(),
            scheme: scheme.into(),
            title: None,
            description: None,
            url: None,
            beneficiary: None,
            rewards: ProposalRewards::default(),
            external_token: None,
            call_data: None,
            value: Amount::zero(),
        }
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    #[must_use]
    pub fn beneficiary(mut self, beneficiary: Address) -> Self {
        self.beneficiary = Some(beneficiary);
        self
    }

    #[must_use]
    pub fn rewards(mut self, rewards: ProposalRewards) -> Self {
        self.rewards = rewards;
        self
    }

    #[must_use]
    pub fn external_token(mut self, token: Address) -> Self {
        self.external_token = Some(token);
        self
    }

    /// Call data for a generic-scheme proposal, sent with `value` wei.
    #[must_use]
    pub fn call(mut self, call_data: impl Into<String>, value: Amount) -> Self {
        self.call_data = Some(call_data.into());
        self.value = value;
        self
    }

    fn has_description(&self) -> bool {
        self.title.is_some() || self.description.is_some() || self.url.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct GovernanceService {
    ctx: Context,
}

impl GovernanceService {
    pub fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Submit a new proposal and return a handle to it.
    ///
    /// A title, description or url is uploaded to IPFS first and referenced
    /// by its hash. The proposal is usually not indexed yet when this
    /// returns; fetch it with `wait_for_indexation`.
    #[instrument(skip(self, draft), fields(dao = %draft.dao))]
    pub async fn create_proposal(&self, draft: ProposalDraft) -> SyncResult<Proposal> {
        let description_hash = if draft.has_description() {
            let ipfs = self.ctx.ipfs().inspect_err(|_| {
                metrics::record_action_rejected("create_proposal");
            })?;
            let document = json!({
                "title": draft.title,
                "description": draft.description,
                "url": draft.url,
            });
            Some(ipfs.add_json(&document).await?)
        } else {
            None
        };

        let receipt = self
            .submit(LedgerAction::CreateProposal {
                dao: draft.dao,
                scheme: draft.scheme,
                beneficiary: draft.beneficiary,
                description_hash,
                rewards: draft.rewards,
                external_token: draft.external_token,
                call_data: draft.call_data,
                value: draft.value,
            })
            .await?;

        let id = receipt.created_id.ok_or_else(|| SyncError::ActionRejected {
            action: "create_proposal".to_string(),
            reason: "receipt carries no proposal id".to_string(),
        })?;
        info!(proposal = %id, "Proposal created");
        Ok(Proposal::from_id(&self.ctx, id))
    }

    /// Vote on an open proposal. A zero `amount` votes with full reputation.
    #[instrument(skip(self, proposal), fields(proposal = %proposal.id()))]
    pub async fn vote(
        &self,
        proposal: &Proposal,
        outcome: ProposalOutcome,
        amount: Amount,
    ) -> SyncResult<ActionReceipt> {
        let state = self.latest(proposal).await?;
        if state.stage.is_terminal() {
            return Err(refuse("vote", format!("proposal is {}", state.stage)));
        }
        self.submit(LedgerAction::Vote {
            proposal: state.id.clone(),
            voting_machine: state.voting_machine.clone(),
            outcome,
            amount,
        })
        .await
    }

    /// Stake on a proposal that is still queued or pre-boosted.
    #[instrument(skip(self, proposal), fields(proposal = %proposal.id()))]
    pub async fn stake(
        &self,
        proposal: &Proposal,
        outcome: ProposalOutcome,
        amount: Amount,
    ) -> SyncResult<ActionReceipt> {
        if amount.is_zero() {
            return Err(refuse("stake", "amount must be positive"));
        }
        let state = self.latest(proposal).await?;
        if !matches!(state.stage, ProposalStage::Queued | ProposalStage::PreBoosted) {
            return Err(refuse("stake", format!("proposal is {}", state.stage)));
        }
        self.submit(LedgerAction::Stake {
            proposal: state.id.clone(),
            voting_machine: state.voting_machine.clone(),
            outcome,
            amount,
        })
        .await
    }

    /// Let the proposal's voting machine spend `amount` staking tokens.
    #[instrument(skip(self, proposal), fields(proposal = %proposal.id()))]
    pub async fn approve_for_staking(
        &self,
        proposal: &Proposal,
        amount: Amount,
    ) -> SyncResult<ActionReceipt> {
        let state = self.latest(proposal).await?;
        let spender = state
            .voting_machine
            .clone()
            .ok_or_else(|| SyncError::invalid("proposal", "missing votingMachine"))?;
        let token = self
            .ctx
            .contracts()
            .and_then(|contracts| contracts.contract_address("GEN", None))
            .ok_or_else(|| SyncError::missing("stakingToken"))?;

        self.submit(LedgerAction::ApproveStaking {
            token,
            spender,
            amount,
        })
        .await
    }

    /// Ask the ledger to execute. The ledger decides whether the governing
    /// period has elapsed; a premature call reverts.
    #[instrument(skip(self, proposal), fields(proposal = %proposal.id()))]
    pub async fn execute(&self, proposal: &Proposal) -> SyncResult<ActionReceipt> {
        let state = self.latest(proposal).await?;
        if state.stage.is_terminal() {
            return Err(refuse("execute", format!("proposal is {}", state.stage)));
        }
        self.submit(LedgerAction::Execute {
            proposal: state.id.clone(),
        })
        .await
    }

    /// Redeem the rewards of an executed proposal for `beneficiary`, or for
    /// the configured default account.
    ///
    /// Only external balances change; the proposal itself is untouched.
    #[instrument(skip(self, proposal, beneficiary), fields(proposal = %proposal.id()))]
    pub async fn claim_rewards(
        &self,
        proposal: &Proposal,
        beneficiary: Option<&Address>,
    ) -> SyncResult<ActionReceipt> {
        let beneficiary = beneficiary
            .or(self.ctx.config().default_account.as_ref())
            .cloned()
            .ok_or_else(|| SyncError::missing("defaultAccount"))?;
        let state = self.latest(proposal).await?;
        if !can_claim(&state) {
            return Err(refuse("redeem", format!("proposal is {}", state.stage)));
        }
        self.submit(LedgerAction::Redeem {
            proposal: state.id.clone(),
            beneficiary,
        })
        .await
    }

    /// Wait until the index reports `stage` for `proposal`.
    ///
    /// Fails with `Invalid` when the proposal closes in another terminal
    /// stage, and with `Canceled` when `cancel` fires. No timeout.
    pub async fn wait_for_stage(
        &self,
        proposal: &Proposal,
        stage: ProposalStage,
        cancel: Option<CancelSignal>,
    ) -> SyncResult<Arc<ProposalState>> {
        info!(proposal = %proposal.id(), stage = %stage, "Waiting for stage");
        let reached = wait_until(
            proposal.state(),
            |item| {
                item.as_ref()
                    .is_some_and(|state| state.stage == stage || state.stage.is_terminal())
            },
            cancel,
        )
        .await?
        .ok_or_else(|| SyncError::not_indexed("proposal", proposal.id()))?;

        if reached.stage != stage {
            return Err(SyncError::invalid(
                "proposal",
                format!("reached {} while waiting for {stage}", reached.stage),
            ));
        }
        Ok(reached)
    }

    async fn latest(&self, proposal: &Proposal) -> SyncResult<Arc<ProposalState>> {
        proposal.fetch_state(FetchOptions::new().refetch()).await
    }

    async fn submit(&self, action: LedgerAction) -> SyncResult<ActionReceipt> {
        let kind = action.kind();
        metrics::record_action_submitted(kind);
        self.ctx
            .submit(action)
            .await
            .inspect_err(|_| metrics::record_action_rejected(kind))
    }
}

fn refuse(action: &str, reason: impl Into<String>) -> SyncError {
    let reason = reason.into();
    warn!(action, reason = %reason, "Action refused before submission");
    metrics::record_action_rejected(action);
    SyncError::ActionNotAllowed {
        action: action.to_string(),
        reason,
    }
}
