//! # Scheme
//!
//! A controller scheme registered with a DAO. The index does not always
//! carry a human-readable name, so names come from contract resolution as a
//! fallback and name filters are evaluated after decoding.

use crate::codec;
use crate::context::Context;
use crate::domain::{Dao, Proposal};
use crate::entity::{scoped, Entity, EntityKind};
use gs_01_index_port::QueryBuilder;
use serde_json::Value;
use shared_bus::LiveStream;
use shared_types::{Address, EntityId, Filter, FilterOp, FilterValue, QueryOptions, SyncResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemeState {
    pub id: EntityId,
    pub dao: EntityId,
    pub address: Address,
    pub name: Option<String>,
    pub version: Option<String>,
    pub can_delegate_call: bool,
    pub can_register_schemes: bool,
    pub can_upgrade_controller: bool,
    pub can_manage_global_constraints: bool,
    pub params_hash: Option<String>,
}

pub struct SchemeKind;

pub type Scheme = Entity<SchemeKind>;

impl EntityKind for SchemeKind {
    type State = SchemeState;

    const NAME: &'static str = "scheme";

    const QUERY: QueryBuilder = QueryBuilder::new(
        "controllerSchemes",
        &["id", "dao", "address", "name", "version", "paramsHash"],
    )
    .with_address_fields(&["id", "dao", "address"]);

    fn decode(ctx: &Context, raw: &Value) -> SyncResult<SchemeState> {
        const E: &str = SchemeKind::NAME;
        let address = codec::address(raw, "address", E)?;
        let name = codec::optional_string(raw, "name", E)?
            .filter(|n| !n.is_empty())
            .or_else(|| ctx.contracts()?.contract_name(&address));

        Ok(SchemeState {
            id: codec::id(raw, E)?,
            dao: codec::relation(raw, "dao", E)?,
            address,
            name,
            version: codec::optional_string(raw, "version", E)?,
            can_delegate_call: codec::flag(raw, "canDelegateCall", E)?,
            can_register_schemes: codec::flag(raw, "canRegisterSchemes", E)?,
            can_upgrade_controller: codec::flag(raw, "canUpgradeController", E)?,
            can_manage_global_constraints: codec::flag(raw, "canManageGlobalConstraints", E)?,
            params_hash: codec::optional_string(raw, "paramsHash", E)?,
        })
    }

    fn id_of(state: &SchemeState) -> &EntityId {
        &state.id
    }

    fn client_filters(options: &mut QueryOptions) -> Vec<Filter> {
        options.take_filters("name")
    }

    fn accepts(state: &SchemeState, filters: &[Filter]) -> bool {
        filters.iter().all(|filter| {
            let matches = match &filter.value {
                FilterValue::Text(name) => state.name.as_deref() == Some(name.as_str()),
                FilterValue::List(names) => names.iter().any(|candidate| {
                    matches!(candidate, FilterValue::Text(name) if state.name.as_deref() == Some(name.as_str()))
                }),
                _ => false,
            };
            match filter.op {
                FilterOp::Eq | FilterOp::In => matches,
                FilterOp::Not => !matches,
                _ => false,
            }
        })
    }
}

impl Entity<SchemeKind> {
    pub fn proposals(&self, options: QueryOptions) -> LiveStream<Vec<Proposal>> {
        Proposal::search(self.context(), &scoped(options, "scheme", self.id()))
    }
}

impl SchemeState {
    pub fn dao(&self, ctx: &Context) -> Dao {
        Dao::from_id(ctx, self.dao.clone())
    }
}
