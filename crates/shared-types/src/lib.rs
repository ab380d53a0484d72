//! # Shared Types Crate
//!
//! Cross-crate types for the governance state-synchronisation client.
//!
//! ## Design Principles
//!
//! - **Normalised Identity**: every entity id is lower-cased on construction,
//!   so two handles for the same record compare equal by id.
//! - **Exact Arithmetic**: token and reputation amounts are `U256` base units;
//!   no floating point crosses a crate boundary.
//! - **Unset Is Not Zero**: optional instants are `Option<Timestamp>`.
//! - **One Error Taxonomy**: [`SyncError`] is the only error that crosses a
//!   crate boundary.

pub mod entities;
pub mod errors;
pub mod query;

pub use entities::*;
pub use errors::*;
pub use query::*;
