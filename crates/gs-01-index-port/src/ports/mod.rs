//! Ports for the index port subsystem.

pub mod inbound;
pub mod outbound;

pub use inbound::{fetch_list, fetch_one, subscribe_list, subscribe_one, QueryPort};
pub use outbound::IndexBackend;
