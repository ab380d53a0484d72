//! # gs-01-index-port
//!
//! Query/Subscription Port: the leaf capability every entity fetch and
//! subscription runs on.
//!
//! ## Overview
//!
//! This subsystem provides:
//! - **Query translation**: per-collection field allow-lists, value
//!   escaping, pagination and ordering ([`QueryBuilder`])
//! - **Live lists**: full replacement lists on every change, never diffs
//! - **Live records**: `None` while an id is not indexed, then every revision
//! - **Feed sharing**: identical queries join one upstream subscription
//!   ([`FetchPolicy::Shared`](shared_types::FetchPolicy)); `Fresh` opts out
//!
//! ## Architecture
//!
//! ```text
//! gs-02-entities ──QueryPort──→ IndexPort ──SharedFeed──→ IndexBackend
//!                                                          ├── InMemoryIndex
//!                                                          ├── ScriptedIndex
//!                                                          └── (hosted index transport)
//! ```
//!
//! ## Decoding
//!
//! [`subscribe_list`] and [`subscribe_one`] apply an entity decoder to every
//! emission. A decode failure ends that subscription with the error; other
//! subscriptions on the same feed are unaffected.
//!
//! ## Example
//!
//! ```rust,ignore
//! use gs_01_index_port::{IndexPort, InMemoryIndex, QueryBuilder, subscribe_list};
//!
//! let port = IndexPort::new(Arc::new(InMemoryIndex::new()));
//! let query = QueryBuilder::new("votes", &["dao"]).build(&options)?;
//! let votes = subscribe_list(&port, &query, decode_vote);
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;

pub use adapters::{InMemoryIndex, ScriptedIndex};
pub use domain::{escape, IndexQuery, QueryBuilder, RecordQuery};
pub use ports::inbound::{fetch_list, fetch_one, subscribe_list, subscribe_one, QueryPort};
pub use ports::outbound::IndexBackend;
pub use service::IndexPort;
