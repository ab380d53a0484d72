//! # DAO
//!
//! An organization (its avatar) with a native token and reputation. Most
//! helpers scope a search of another collection to this DAO.

use crate::codec;
use crate::context::Context;
use crate::domain::{
    member_id, Event, Member, Proposal, Queue, Scheme, Stake, Token, Vote,
};
use crate::entity::{scoped, Entity, EntityKind, FetchOptions};
use gs_01_index_port::QueryBuilder;
use serde_json::Value;
use shared_bus::LiveStream;
use shared_types::{Address, Amount, EntityId, QueryOptions, SyncResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaoState {
    pub id: EntityId,
    pub name: String,
    /// Registration status with the controller (`registered`, `proposed`, ...).
    pub register: Option<String>,
    pub native_token: Address,
    pub native_reputation: Option<Address>,
    pub reputation_total_supply: Amount,
    pub members_count: u64,
}

pub struct DaoKind;

pub type Dao = Entity<DaoKind>;

impl EntityKind for DaoKind {
    type State = DaoState;

    const NAME: &'static str = "dao";

    const QUERY: QueryBuilder = QueryBuilder::new(
        "daos",
        &[
            "id",
            "name",
            "register",
            "nativeToken",
            "nativeReputation",
            "membersCount",
        ],
    )
    .with_address_fields(&["id", "nativeToken", "nativeReputation"]);

    fn decode(_ctx: &Context, raw: &Value) -> SyncResult<DaoState> {
        const E: &str = DaoKind::NAME;
        Ok(DaoState {
            id: codec::id(raw, E)?,
            name: codec::optional_string(raw, "name", E)?.unwrap_or_default(),
            register: codec::optional_string(raw, "register", E)?,
            native_token: codec::address(raw, "nativeToken", E)?,
            native_reputation: codec::optional_address(raw, "nativeReputation", E)?,
            reputation_total_supply: codec::amount(raw, "reputationTotalSupply", E)?,
            members_count: codec::optional_u64(raw, "membersCount", E)?.unwrap_or(0),
        })
    }

    fn id_of(state: &DaoState) -> &EntityId {
        &state.id
    }
}

impl Entity<DaoKind> {
    pub fn proposals(&self, options: QueryOptions) -> LiveStream<Vec<Proposal>> {
        Proposal::search(self.context(), &scoped(options, "dao", self.id()))
    }

    pub fn schemes(&self, options: QueryOptions) -> LiveStream<Vec<Scheme>> {
        Scheme::search(self.context(), &scoped(options, "dao", self.id()))
    }

    pub fn queues(&self, options: QueryOptions) -> LiveStream<Vec<Queue>> {
        Queue::search(self.context(), &scoped(options, "dao", self.id()))
    }

    pub fn members(&self, options: QueryOptions) -> LiveStream<Vec<Member>> {
        Member::search(self.context(), &scoped(options, "dao", self.id()))
    }

    /// Handle for one member of this DAO. Nothing is fetched yet.
    pub fn member(&self, address: &Address) -> Member {
        Member::from_id(self.context(), member_id(self.id(), address))
    }

    pub fn votes(&self, options: QueryOptions) -> LiveStream<Vec<Vote>> {
        Vote::search(self.context(), &scoped(options, "dao", self.id()))
    }

    pub fn stakes(&self, options: QueryOptions) -> LiveStream<Vec<Stake>> {
        Stake::search(self.context(), &scoped(options, "dao", self.id()))
    }

    pub fn events(&self, options: QueryOptions) -> LiveStream<Vec<Event>> {
        Event::search(self.context(), &scoped(options, "dao", self.id()))
    }

    /// The DAO's native token, resolved from its state.
    pub async fn token(&self) -> SyncResult<Token> {
        let state = self.fetch_state(FetchOptions::new()).await?;
        Ok(Token::from_id(
            self.context(),
            state.native_token.to_entity_id(),
        ))
    }
}
