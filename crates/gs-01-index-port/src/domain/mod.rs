//! Domain layer for the index port: query translation.

pub mod query;

pub use query::{escape, IndexQuery, QueryBuilder, RecordQuery};
