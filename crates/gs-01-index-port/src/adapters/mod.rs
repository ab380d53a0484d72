//! # Adapters Layer (Hexagonal Architecture)
//!
//! [`IndexBackend`](crate::ports::outbound::IndexBackend) implementations.
//! A hosted-index transport lives outside this workspace; these two serve
//! tests and local tooling.

mod memory;
mod scripted;

pub use memory::InMemoryIndex;
pub use scripted::ScriptedIndex;
