//! Votes cast on proposals. Immutable once indexed.

use crate::codec;
use crate::context::Context;
use crate::domain::{Dao, Proposal, ProposalOutcome};
use crate::entity::{Entity, EntityKind};
use gs_01_index_port::QueryBuilder;
use serde_json::Value;
use shared_types::{Address, Amount, EntityId, SyncError, SyncResult, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteState {
    pub id: EntityId,
    pub voter: Address,
    pub proposal: EntityId,
    pub dao: EntityId,
    pub outcome: ProposalOutcome,
    pub amount: Amount,
    pub created_at: Timestamp,
}

pub struct VoteKind;

pub type Vote = Entity<VoteKind>;

/// Outcome field shared by votes and stakes.
pub(crate) fn outcome(raw: &Value, entity: &str) -> SyncResult<ProposalOutcome> {
    let text = codec::string(raw, "outcome", entity)?;
    ProposalOutcome::parse(&text)
        .ok_or_else(|| SyncError::invalid(entity, format!("unknown outcome {text}")))
}

impl EntityKind for VoteKind {
    type State = VoteState;

    const NAME: &'static str = "vote";

    const QUERY: QueryBuilder = QueryBuilder::new(
        "votes",
        &["id", "voter", "proposal", "dao", "outcome", "amount", "createdAt"],
    )
    .with_address_fields(&["id", "voter", "proposal", "dao"]);

    fn decode(_ctx: &Context, raw: &Value) -> SyncResult<VoteState> {
        const E: &str = VoteKind::NAME;
        Ok(VoteState {
            id: codec::id(raw, E)?,
            voter: codec::address(raw, "voter", E)?,
            proposal: codec::relation(raw, "proposal", E)?,
            dao: codec::relation(raw, "dao", E)?,
            outcome: outcome(raw, E)?,
            amount: codec::amount(raw, "amount", E)?,
            created_at: codec::timestamp(raw, "createdAt", E)?,
        })
    }

    fn id_of(state: &VoteState) -> &EntityId {
        &state.id
    }
}

impl VoteState {
    pub fn proposal(&self, ctx: &Context) -> Proposal {
        Proposal::from_id(ctx, self.proposal.clone())
    }

    pub fn dao(&self, ctx: &Context) -> Dao {
        Dao::from_id(ctx, self.dao.clone())
    }
}
