//! Stakes placed on proposal outcomes.

use crate::codec;
use crate::context::Context;
use crate::domain::vote::outcome;
use crate::domain::{Proposal, ProposalOutcome};
use crate::entity::{Entity, EntityKind};
use gs_01_index_port::QueryBuilder;
use serde_json::Value;
use shared_types::{Address, Amount, EntityId, SyncResult, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakeState {
    pub id: EntityId,
    pub staker: Address,
    pub proposal: EntityId,
    pub dao: EntityId,
    pub outcome: ProposalOutcome,
    pub amount: Amount,
    pub created_at: Timestamp,
}

impl StakeState {
    pub fn proposal(&self, ctx: &Context) -> Proposal {
        Proposal::from_id(ctx, self.proposal.clone())
    }
}

pub struct StakeKind;

pub type Stake = Entity<StakeKind>;

impl EntityKind for StakeKind {
    type State = StakeState;

    const NAME: &'static str = "stake";

    const QUERY: QueryBuilder = QueryBuilder::new(
        "stakes",
        &["id", "staker", "proposal", "dao", "outcome", "amount", "createdAt"],
    )
    .with_address_fields(&["id", "staker", "proposal", "dao"]);

    fn decode(_ctx: &Context, raw: &Value) -> SyncResult<StakeState> {
        const E: &str = StakeKind::NAME;
        Ok(StakeState {
            id: codec::id(raw, E)?,
            staker: codec::address(raw, "staker", E)?,
            proposal: codec::relation(raw, "proposal", E)?,
            dao: codec::relation(raw, "dao", E)?,
            outcome: outcome(raw, E)?,
            amount: codec::amount(raw, "amount", E)?,
            created_at: codec::timestamp(raw, "createdAt", E)?,
        })
    }

    fn id_of(state: &StakeState) -> &EntityId {
        &state.id
    }
}
