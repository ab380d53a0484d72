//! # gs-02-entities
//!
//! Entity cache/fetch abstraction and the governance domain entities built
//! on it.
//!
//! ## Overview
//!
//! Every domain object is an [`Entity<K>`]: an id plus an optional cached
//! snapshot. `K` is an [`EntityKind`] that names the collection, the filter
//! allow-list and the decoder. Entities never share caches; two handles for
//! the same id are equal but cache independently.
//!
//! | Entity | Collection | Looked up by |
//! |--------|------------|--------------|
//! | [`Dao`] | `daos` | id |
//! | [`Proposal`] | `proposals` | id |
//! | [`Vote`] / [`Stake`] | `votes` / `stakes` | id |
//! | [`Queue`] | `queues` | id |
//! | [`Scheme`] | `controllerSchemes` | id |
//! | [`Token`] | `tokens` | contract address |
//! | [`Member`] | `members` | (dao, address) |
//! | [`Event`] | `events` | id |
//!
//! ## Context
//!
//! A [`Context`] carries the [`ClientConfig`] and the collaborator
//! capabilities. Only the query port is required:
//!
//! ```text
//! Context
//!   ├── QueryPort        (required)  index queries and subscriptions
//!   ├── LedgerGateway    (optional)  vote / stake / execute / redeem / create
//!   ├── BalanceProvider  (optional)  token balances and allowances
//!   ├── ContractResolver (optional)  scheme and queue names
//!   └── IpfsGateway      (optional)  proposal descriptions
//! ```
//!
//! A missing capability fails the call that needs it with
//! `SyncError::ConfigurationMissing`.
//!
//! ## Example
//!
//! ```rust,ignore
//! let ctx = Context::builder(ClientConfig::from_env(), port).build();
//! let proposal = Proposal::from_id(&ctx, proposal_id);
//! let state = proposal
//!     .fetch_state(FetchOptions::new().wait_for_indexation())
//!     .await?;
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod codec;
pub mod config;
pub mod context;
pub mod domain;
pub mod entity;
pub mod ports;

pub use config::{default_confidence_scale, ClientConfig};
pub use context::{Context, ContextBuilder};
pub use domain::*;
pub use entity::{Entity, EntityKind, FetchOptions};
pub use ports::outbound::{
    ActionReceipt, BalanceProvider, ContractResolver, IpfsGateway, LedgerAction, LedgerGateway,
    ReceiptStatus,
};
