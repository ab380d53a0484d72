//! # Member
//!
//! A (DAO, address) pair. The index keys members by its own ids, so the
//! handle uses `"{dao}:{address}"` and looks the record up by both fields.
//! A member that is not indexed yet is absent, never a zero-reputation
//! default.

use crate::codec;
use crate::context::Context;
use crate::domain::{Dao, Proposal, Stake, Vote};
use crate::entity::{scoped, Entity, EntityKind, FetchOptions};
use futures::{stream, StreamExt};
use gs_01_index_port::{subscribe_list, QueryBuilder};
use serde_json::Value;
use shared_bus::{once, LiveStream};
use shared_types::{Address, Amount, EntityId, FetchPolicy, QueryOptions, SyncError, SyncResult};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberState {
    pub id: EntityId,
    pub address: Address,
    pub dao: EntityId,
    pub reputation: Amount,
    /// Native token balance as indexed.
    pub tokens: Amount,
}

/// Handle id for the member `address` of `dao`.
pub fn member_id(dao: &EntityId, address: &Address) -> EntityId {
    EntityId::new(format!("{dao}:{address}"))
}

fn split_id(id: &EntityId) -> SyncResult<(EntityId, Address)> {
    let (dao, address) = id
        .as_str()
        .split_once(':')
        .ok_or_else(|| SyncError::invalid(MemberKind::NAME, format!("malformed member id {id}")))?;
    Ok((EntityId::new(dao), Address::parse(address)?))
}

pub struct MemberKind;

pub type Member = Entity<MemberKind>;

impl EntityKind for MemberKind {
    type State = MemberState;

    const NAME: &'static str = "member";

    const QUERY: QueryBuilder =
        QueryBuilder::new("members", &["id", "address", "dao", "reputation", "tokens"])
            .with_address_fields(&["id", "address", "dao"]);

    fn decode(_ctx: &Context, raw: &Value) -> SyncResult<MemberState> {
        const E: &str = MemberKind::NAME;
        let address = codec::address(raw, "address", E)?;
        let dao = codec::relation(raw, "dao", E)?;
        Ok(MemberState {
            id: member_id(&dao, &address),
            address,
            dao,
            reputation: codec::amount(raw, "reputation", E)?,
            tokens: codec::amount(raw, "tokens", E)?,
        })
    }

    fn id_of(state: &MemberState) -> &EntityId {
        &state.id
    }

    /// Looks the member up by `(address, dao)` rather than by record id.
    fn watch(ctx: &Context, id: &EntityId, policy: FetchPolicy) -> LiveStream<Option<MemberState>> {
        let query = split_id(id).and_then(|(dao, address)| {
            let options = QueryOptions::new()
                .where_eq("address", &address)
                .where_eq("dao", &dao)
                .first(1)
                .policy(policy);
            Self::QUERY.build(&options)
        });
        let query = match query {
            Ok(query) => query,
            Err(e) => return once(Err(e)),
        };

        let decode_ctx = ctx.clone();
        subscribe_list(ctx.port().as_ref(), &query, move |raw| {
            Self::decode(&decode_ctx, raw)
        })
        .map(|batch| batch.map(|members| members.into_iter().next()))
        .boxed()
    }
}

impl Entity<MemberKind> {
    /// Handle for `address` in `dao`. Nothing is fetched yet.
    pub fn of(ctx: &Context, dao: &EntityId, address: &Address) -> Self {
        Self::from_id(ctx, member_id(dao, address))
    }

    pub fn address(&self) -> SyncResult<Address> {
        split_id(self.id()).map(|(_, address)| address)
    }

    pub fn dao(&self) -> SyncResult<Dao> {
        split_id(self.id()).map(|(dao, _)| Dao::from_id(self.context(), dao))
    }

    /// Proposals this member submitted to the DAO.
    pub fn proposals(&self, options: QueryOptions) -> LiveStream<Vec<Proposal>> {
        match split_id(self.id()) {
            Ok((dao, address)) => Proposal::search(
                self.context(),
                &scoped(scoped(options, "dao", &dao), "proposer", &address),
            ),
            Err(e) => once(Err(e)),
        }
    }

    pub fn stakes(&self, options: QueryOptions) -> LiveStream<Vec<Stake>> {
        match split_id(self.id()) {
            Ok((dao, address)) => Stake::search(
                self.context(),
                &scoped(scoped(options, "dao", &dao), "staker", &address),
            ),
            Err(e) => once(Err(e)),
        }
    }

    pub fn votes(&self, options: QueryOptions) -> LiveStream<Vec<Vote>> {
        match split_id(self.id()) {
            Ok((dao, address)) => Vote::search(
                self.context(),
                &scoped(scoped(options, "dao", &dao), "voter", &address),
            ),
            Err(e) => once(Err(e)),
        }
    }

    /// Live balance of the DAO's native token held by this member.
    pub fn native_token_balance(&self) -> LiveStream<Option<Amount>> {
        let resolved = split_id(self.id())
            .map(|(dao, address)| (Dao::from_id(self.context(), dao), address));
        let (dao, address) = match resolved {
            Ok(parts) => parts,
            Err(e) => return once(Err(e)),
        };

        stream::once(async move {
            let token = dao.token().await?;
            Ok::<_, SyncError>(token.balance_of(&address))
        })
        .flat_map(|resolved| match resolved {
            Ok(balance) => balance,
            Err(e) => once(Err(e)),
        })
        .boxed()
    }
}

/// Fetch a member, waiting until indexed when asked to.
pub async fn fetch_member(
    ctx: &Context,
    dao: &EntityId,
    address: &Address,
    options: FetchOptions,
) -> SyncResult<Arc<MemberState>> {
    Member::of(ctx, dao, address).fetch_state(options).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::StaticBalances;
    use crate::config::ClientConfig;
    use crate::domain::fixtures;
    use gs_01_index_port::{IndexPort, InMemoryIndex};
    use serde_json::json;
    use shared_bus::first_value;
    use std::time::Duration;
    use tokio::time::timeout;

    fn context(index: &InMemoryIndex) -> Context {
        let port = Arc::new(IndexPort::new(Arc::new(index.clone())));
        Context::builder(ClientConfig::default(), port).build()
    }

    fn proposer() -> Address {
        Address::parse(fixtures::PROPOSER).unwrap()
    }

    #[tokio::test]
    async fn test_member_is_absent_until_indexed() {
        let index = InMemoryIndex::new();
        let ctx = context(&index);
        let dao = EntityId::new("0xdao");

        let err = fetch_member(&ctx, &dao, &proposer(), FetchOptions::new())
            .await
            .unwrap_err();
        assert!(err.is_not_indexed());

        index.upsert(
            "members",
            json!({"id": "m1", "address": fixtures::PROPOSER, "dao": {"id": "0xdao"},
                   "reputation": "1000", "tokens": "5"}),
        );
        let state = fetch_member(&ctx, &dao, &proposer(), FetchOptions::new())
            .await
            .unwrap();
        assert_eq!(state.reputation, Amount::from(1000u64));
        assert_eq!(state.id, member_id(&dao, &proposer()));
    }

    #[tokio::test]
    async fn test_member_lookup_ignores_other_daos() {
        let index = InMemoryIndex::new();
        index.upsert(
            "members",
            json!({"id": "m1", "address": fixtures::PROPOSER, "dao": {"id": "0xother"},
                   "reputation": "1"}),
        );
        let ctx = context(&index);
        let member = Member::of(&ctx, &EntityId::new("0xdao"), &proposer());
        assert_eq!(first_value(member.state()).await, Ok(None));
    }

    #[tokio::test]
    async fn test_malformed_member_id() {
        let ctx = context(&InMemoryIndex::new());
        let member = Member::from_id(&ctx, "0xdao");
        assert!(member.address().is_err());
        assert!(matches!(
            first_value(member.state()).await,
            Err(SyncError::Invalid { .. })
        ));
    }

    #[tokio::test]
    async fn test_votes_scoped_to_member() {
        let index = InMemoryIndex::new();
        index.upsert("votes", fixtures::vote("0xv1", "0xp1", "Pass"));
        let mut other = fixtures::vote("0xv2", "0xp1", "Fail");
        other["voter"] = json!(fixtures::BENEFICIARY);
        index.upsert("votes", other);

        let ctx = context(&index);
        let member = Member::of(&ctx, &EntityId::new("0xdao"), &proposer());
        let votes = first_value(member.votes(QueryOptions::new())).await.unwrap();
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].id().as_str(), "0xv1");
    }

    #[tokio::test]
    async fn test_native_token_balance() {
        let index = InMemoryIndex::new();
        index.upsert("daos", fixtures::dao("0xdao"));
        let balances = Arc::new(StaticBalances::new());
        let token = Address::parse(fixtures::TOKEN).unwrap();
        balances.set_balance(&token, &proposer(), Amount::from(9u64));

        let port = Arc::new(IndexPort::new(Arc::new(index.clone())));
        let ctx = Context::builder(ClientConfig::default(), port)
            .balances(balances)
            .build();
        let member = Member::of(&ctx, &EntityId::new("0xdao"), &proposer());
        let balance = timeout(Duration::from_millis(500), first_value(member.native_token_balance()))
            .await
            .unwrap();
        assert_eq!(balance, Ok(Some(Amount::from(9u64))));
    }
}
