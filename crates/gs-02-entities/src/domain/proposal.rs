//! # Proposal
//!
//! A governance proposal as the index reports it. Stages are observed, never
//! predicted; tallies only ever come from the index.
//!
//! ## Temporal fields
//!
//! Every instant except `created_at` may be unset. Unset (`None`) is distinct
//! from the epoch (`Some(0)`).

use crate::codec;
use crate::context::Context;
use crate::domain::{Dao, Event, Queue, Scheme, Stake, Vote};
use crate::entity::{scoped, Entity, EntityKind, FetchOptions};
use gs_01_index_port::QueryBuilder;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_bus::LiveStream;
use shared_types::{
    Address, Amount, EntityId, QueryOptions, Seconds, SyncError, SyncResult, Timestamp, U256,
    U512,
};
use std::fmt;

/// Lifecycle stage of a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalStage {
    Queued,
    PreBoosted,
    Boosted,
    QuietEndingPeriod,
    Executed,
    ExpiredInQueue,
}

impl ProposalStage {
    /// Position along the forward path. Both terminal stages share the last slot.
    pub fn ordinal(&self) -> u8 {
        match self {
            Self::Queued => 0,
            Self::PreBoosted => 1,
            Self::Boosted => 2,
            Self::QuietEndingPeriod => 3,
            Self::Executed | Self::ExpiredInQueue => 4,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Executed | Self::ExpiredInQueue)
    }

    /// Boosted or in its quiet-ending extension.
    pub fn is_boosted(&self) -> bool {
        matches!(self, Self::Boosted | Self::QuietEndingPeriod)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "Queued",
            Self::PreBoosted => "PreBoosted",
            Self::Boosted => "Boosted",
            Self::QuietEndingPeriod => "QuietEndingPeriod",
            Self::Executed => "Executed",
            Self::ExpiredInQueue => "ExpiredInQueue",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        [
            Self::Queued,
            Self::PreBoosted,
            Self::Boosted,
            Self::QuietEndingPeriod,
            Self::Executed,
            Self::ExpiredInQueue,
        ]
        .into_iter()
        .find(|stage| stage.as_str().eq_ignore_ascii_case(text.trim()))
    }
}

impl fmt::Display for ProposalStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalOutcome {
    Pass,
    Fail,
}

impl ProposalOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "Pass",
            Self::Fail => "Fail",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            t if t.eq_ignore_ascii_case("pass") => Some(Self::Pass),
            t if t.eq_ignore_ascii_case("fail") => Some(Self::Fail),
            _ => None,
        }
    }

    /// `Pass` iff strictly more votes for than against; ties fail.
    pub fn from_tally(votes_for: Amount, votes_against: Amount) -> Self {
        if votes_for > votes_against {
            Self::Pass
        } else {
            Self::Fail
        }
    }
}

impl fmt::Display for ProposalOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rewards fixed at creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalRewards {
    pub eth: Amount,
    pub native_token: Amount,
    pub external_token: Amount,
    pub reputation: Amount,
}

/// Arbitrary contract call carried by generic-scheme proposals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericCall {
    pub call_data: Option<String>,
    pub executed: bool,
    pub return_value: Option<String>,
}

/// `floor(stakes_for * scale / max(stakes_against, 1))`.
///
/// The product is taken at full width; only a quotient past `U256::MAX`
/// saturates.
pub fn confidence_at(stakes_for: Amount, stakes_against: Amount, scale: Amount) -> Amount {
    let against = U512::from(stakes_against.max(U256::one()));
    U256::try_from(stakes_for.full_mul(scale) / against).unwrap_or(U256::MAX)
}

/// One decoded proposal snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalState {
    pub id: EntityId,
    pub dao: EntityId,
    pub scheme: EntityId,
    pub queue: EntityId,
    pub proposer: Address,
    pub stage: ProposalStage,

    pub created_at: Timestamp,
    pub boosted_at: Option<Timestamp>,
    pub pre_boosted_at: Option<Timestamp>,
    pub pre_boosted_vote_period_limit: Option<Seconds>,
    pub boosted_vote_period_limit: Option<Seconds>,
    pub quiet_ending_period_began_at: Option<Timestamp>,
    pub executed_at: Option<Timestamp>,
    pub resolved_at: Option<Timestamp>,
    pub expires_in_queue_at: Option<Timestamp>,

    pub votes_for: Amount,
    pub votes_against: Amount,
    pub stakes_for: Amount,
    pub stakes_against: Amount,
    pub winning_outcome: ProposalOutcome,
    pub confidence: Amount,
    pub boosting_threshold: Option<Amount>,

    pub rewards: ProposalRewards,
    pub proposing_rep_reward: Amount,

    pub beneficiary: Option<Address>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub description_hash: Option<String>,
    pub voting_machine: Option<Address>,
    pub external_token: Option<Address>,
    pub generic_call: Option<GenericCall>,
}

impl ProposalState {
    /// Total votes cast on either side.
    pub fn total_votes(&self) -> Amount {
        self.votes_for.saturating_add(self.votes_against)
    }
}

pub struct ProposalKind;

pub type Proposal = Entity<ProposalKind>;

impl EntityKind for ProposalKind {
    type State = ProposalState;

    const NAME: &'static str = "proposal";

    const QUERY: QueryBuilder = QueryBuilder::new(
        "proposals",
        &[
            "id",
            "dao",
            "scheme",
            "queue",
            "proposer",
            "beneficiary",
            "stage",
            "title",
            "votingMachine",
            "createdAt",
            "boostedAt",
            "preBoostedAt",
            "executedAt",
            "resolvedAt",
            "expiresInQueueAt",
            "quietEndingPeriodBeganAt",
            "votesFor",
            "votesAgainst",
            "stakesFor",
            "stakesAgainst",
        ],
    )
    .with_address_fields(&[
        "id",
        "dao",
        "scheme",
        "queue",
        "proposer",
        "beneficiary",
        "votingMachine",
    ]);

    fn decode(ctx: &Context, raw: &Value) -> SyncResult<ProposalState> {
        const E: &str = ProposalKind::NAME;

        let stage_text = codec::string(raw, "stage", E)?;
        let stage = ProposalStage::parse(&stage_text)
            .ok_or_else(|| SyncError::invalid(E, format!("unknown stage {stage_text}")))?;

        let votes_for = codec::amount(raw, "votesFor", E)?;
        let votes_against = codec::amount(raw, "votesAgainst", E)?;
        let stakes_for = codec::amount(raw, "stakesFor", E)?;
        let stakes_against = codec::amount(raw, "stakesAgainst", E)?;

        // An explicit outcome only settles a closed proposal.
        let recorded = match codec::optional_string(raw, "winningOutcome", E)? {
            Some(text) if stage.is_terminal() => Some(
                ProposalOutcome::parse(&text)
                    .ok_or_else(|| SyncError::invalid(E, format!("unknown outcome {text}")))?,
            ),
            _ => None,
        };
        let winning_outcome =
            recorded.unwrap_or_else(|| ProposalOutcome::from_tally(votes_for, votes_against));

        let generic_call = match raw.get("genericScheme") {
            Some(call @ Value::Object(_)) => Some(GenericCall {
                call_data: codec::optional_string(call, "callData", E)?,
                executed: codec::flag(call, "executed", E)?,
                return_value: codec::optional_string(call, "returnValue", E)?,
            }),
            _ => None,
        };

        Ok(ProposalState {
            id: codec::id(raw, E)?,
            dao: codec::relation(raw, "dao", E)?,
            scheme: codec::relation(raw, "scheme", E)?,
            queue: codec::relation(raw, "queue", E)?,
            proposer: codec::address(raw, "proposer", E)?,
            stage,

            created_at: codec::timestamp(raw, "createdAt", E)?,
            boosted_at: codec::optional_u64(raw, "boostedAt", E)?,
            pre_boosted_at: codec::optional_u64(raw, "preBoostedAt", E)?,
            pre_boosted_vote_period_limit: codec::optional_u64(
                raw,
                "preBoostedVotePeriodLimit",
                E,
            )?,
            boosted_vote_period_limit: codec::optional_u64(raw, "boostedVotePeriodLimit", E)?,
            quiet_ending_period_began_at: codec::optional_u64(
                raw,
                "quietEndingPeriodBeganAt",
                E,
            )?,
            executed_at: codec::optional_u64(raw, "executedAt", E)?,
            resolved_at: codec::optional_u64(raw, "resolvedAt", E)?,
            expires_in_queue_at: codec::optional_u64(raw, "expiresInQueueAt", E)?,

            votes_for,
            votes_against,
            stakes_for,
            stakes_against,
            winning_outcome,
            confidence: confidence_at(stakes_for, stakes_against, ctx.config().confidence_scale),
            boosting_threshold: codec::optional_amount(raw, "boostingThreshold", E)?,

            rewards: ProposalRewards {
                eth: codec::amount(raw, "ethReward", E)?,
                native_token: codec::amount(raw, "nativeTokenReward", E)?,
                external_token: codec::amount(raw, "externalTokenReward", E)?,
                reputation: codec::amount(raw, "reputationReward", E)?,
            },
            proposing_rep_reward: codec::amount(raw, "proposingRepReward", E)?,

            beneficiary: codec::optional_address(raw, "beneficiary", E)?,
            title: codec::optional_string(raw, "title", E)?,
            description: codec::optional_string(raw, "description", E)?,
            url: codec::optional_string(raw, "url", E)?,
            description_hash: codec::optional_string(raw, "descriptionHash", E)?,
            voting_machine: codec::optional_address(raw, "votingMachine", E)?,
            external_token: codec::optional_address(raw, "externalToken", E)?,
            generic_call,
        })
    }

    fn id_of(state: &ProposalState) -> &EntityId {
        &state.id
    }
}

impl Entity<ProposalKind> {
    /// Votes cast on this proposal.
    pub fn votes(&self, options: QueryOptions) -> LiveStream<Vec<Vote>> {
        Vote::search(self.context(), &scoped(options, "proposal", self.id()))
    }

    pub fn stakes(&self, options: QueryOptions) -> LiveStream<Vec<Stake>> {
        Stake::search(self.context(), &scoped(options, "proposal", self.id()))
    }

    pub fn events(&self, options: QueryOptions) -> LiveStream<Vec<Event>> {
        Event::search(self.context(), &scoped(options, "proposal", self.id()))
    }

    pub async fn dao(&self) -> SyncResult<Dao> {
        let state = self.fetch_state(FetchOptions::new()).await?;
        Ok(Dao::from_id(self.context(), state.dao.clone()))
    }

    pub async fn scheme(&self) -> SyncResult<Scheme> {
        let state = self.fetch_state(FetchOptions::new()).await?;
        Ok(Scheme::from_id(self.context(), state.scheme.clone()))
    }

    pub async fn queue(&self) -> SyncResult<Queue> {
        let state = self.fetch_state(FetchOptions::new()).await?;
        Ok(Queue::from_id(self.context(), state.queue.clone()))
    }
}
