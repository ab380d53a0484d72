//! DAO activity feed entries. The index stores `data` as a JSON string.

use crate::codec;
use crate::context::Context;
use crate::entity::{Entity, EntityKind};
use gs_01_index_port::QueryBuilder;
use serde_json::Value;
use shared_types::{Address, EntityId, SyncError, SyncResult, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventState {
    pub id: EntityId,
    pub dao: EntityId,
    pub proposal: Option<EntityId>,
    pub user: Option<Address>,
    /// Event type as indexed (`NewProposal`, `Vote`, `Stake`, ...).
    pub kind: String,
    pub data: Value,
    pub timestamp: Timestamp,
}

pub struct EventKind;

pub type Event = Entity<EventKind>;

impl EntityKind for EventKind {
    type State = EventState;

    const NAME: &'static str = "event";

    const QUERY: QueryBuilder =
        QueryBuilder::new("events", &["id", "dao", "proposal", "user", "type", "timestamp"])
            .with_address_fields(&["id", "dao", "proposal", "user"]);

    fn decode(_ctx: &Context, raw: &Value) -> SyncResult<EventState> {
        const E: &str = EventKind::NAME;
        let data = match raw.get("data") {
            None | Some(Value::Null) => Value::Null,
            Some(Value::String(text)) => serde_json::from_str(text)
                .map_err(|e| SyncError::invalid(E, format!("data is not JSON: {e}")))?,
            Some(other) => other.clone(),
        };
        Ok(EventState {
            id: codec::id(raw, E)?,
            dao: codec::relation(raw, "dao", E)?,
            proposal: codec::optional_relation(raw, "proposal", E)?,
            user: codec::optional_address(raw, "user", E)?,
            kind: codec::string(raw, "type", E)?,
            data,
            timestamp: codec::timestamp(raw, "timestamp", E)?,
        })
    }

    fn id_of(state: &EventState) -> &EntityId {
        &state.id
    }
}
