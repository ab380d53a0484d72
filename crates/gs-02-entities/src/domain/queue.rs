//! # Queue
//!
//! A per-scheme governance-parameter instance. Proposals are queued against
//! exactly one queue, which supplies the boosting threshold and the
//! vote-period limits but never drives their lifecycle.

use crate::codec;
use crate::context::Context;
use crate::domain::{Dao, Proposal};
use crate::entity::{scoped, Entity, EntityKind};
use gs_01_index_port::QueryBuilder;
use serde_json::Value;
use shared_bus::LiveStream;
use shared_types::{Address, Amount, EntityId, QueryOptions, Seconds, SyncResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueState {
    pub id: EntityId,
    pub dao: EntityId,
    /// Scheme name; resolved from the contract address when the index omits it.
    pub name: String,
    pub address: Address,
    /// Boosting threshold in confidence units.
    pub threshold: Amount,
    pub queued_vote_period_limit: Seconds,
    pub pre_boosted_vote_period_limit: Seconds,
    pub boosted_vote_period_limit: Seconds,
    pub quiet_ending_period: Seconds,
    /// Pre-boost delay before a pre-boosted proposal may become boosted.
    pub activation_time: Seconds,
}

pub struct QueueKind;

pub type Queue = Entity<QueueKind>;

impl EntityKind for QueueKind {
    type State = QueueState;

    const NAME: &'static str = "queue";

    const QUERY: QueryBuilder =
        QueryBuilder::new("queues", &["id", "dao", "name", "address", "threshold"])
            .with_address_fields(&["id", "dao", "address"]);

    fn decode(ctx: &Context, raw: &Value) -> SyncResult<QueueState> {
        const E: &str = QueueKind::NAME;
        let address = codec::address(raw, "address", E)?;
        let name = codec::optional_string(raw, "name", E)?
            .filter(|n| !n.is_empty())
            .or_else(|| ctx.contracts()?.contract_name(&address))
            .unwrap_or_default();

        Ok(QueueState {
            id: codec::id(raw, E)?,
            dao: codec::relation(raw, "dao", E)?,
            name,
            address,
            threshold: codec::amount(raw, "threshold", E)?,
            queued_vote_period_limit: codec::timestamp(raw, "queuedVotePeriodLimit", E)?,
            pre_boosted_vote_period_limit: codec::timestamp(raw, "preBoostedVotePeriodLimit", E)?,
            boosted_vote_period_limit: codec::timestamp(raw, "boostedVotePeriodLimit", E)?,
            quiet_ending_period: codec::timestamp(raw, "quietEndingPeriod", E)?,
            activation_time: codec::optional_u64(raw, "activationTime", E)?.unwrap_or(0),
        })
    }

    fn id_of(state: &QueueState) -> &EntityId {
        &state.id
    }
}

impl Entity<QueueKind> {
    pub fn proposals(&self, options: QueryOptions) -> LiveStream<Vec<Proposal>> {
        Proposal::search(self.context(), &scoped(options, "queue", self.id()))
    }
}

impl QueueState {
    pub fn dao(&self, ctx: &Context) -> Dao {
        Dao::from_id(ctx, self.dao.clone())
    }
}
