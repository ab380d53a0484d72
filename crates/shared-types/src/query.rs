//! # Query Options
//!
//! The filter shape every search accepts: field filters,
//! pagination (`skip`, `first`) and ordering (`orderBy`, `orderDirection`).
//! Rendering and allow-list validation live in the index port.

use crate::entities::{Address, Amount, EntityId};
use serde::{Deserialize, Serialize};

/// Sort direction for `order_by`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl OrderDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Whether a subscription may join an existing upstream feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FetchPolicy {
    /// Join the shared feed for an identical query, if one is live.
    #[default]
    Shared,
    /// Always open a dedicated upstream subscription.
    Fresh,
}

/// Comparison applied by a [`Filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOp {
    Eq,
    Not,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

impl FilterOp {
    /// Argument suffix in the index's filter grammar (`stage_not`, `createdAt_gte`, ...).
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Eq => "",
            Self::Not => "_not",
            Self::Gt => "_gt",
            Self::Gte => "_gte",
            Self::Lt => "_lt",
            Self::Lte => "_lte",
            Self::In => "_in",
        }
    }
}

/// A literal on the right-hand side of a filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterValue {
    Text(String),
    Number(u64),
    Amount(Amount),
    Bool(bool),
    List(Vec<FilterValue>),
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&EntityId> for FilterValue {
    fn from(value: &EntityId) -> Self {
        Self::Text(value.as_str().to_string())
    }
}

impl From<EntityId> for FilterValue {
    fn from(value: EntityId) -> Self {
        Self::Text(value.into())
    }
}

impl From<&Address> for FilterValue {
    fn from(value: &Address) -> Self {
        Self::Text(value.as_str().to_string())
    }
}

impl From<u64> for FilterValue {
    fn from(value: u64) -> Self {
        Self::Number(value)
    }
}

impl From<Amount> for FilterValue {
    fn from(value: Amount) -> Self {
        Self::Amount(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// A single field filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: FilterValue,
}

/// Search options accepted by every entity search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    pub filters: Vec<Filter>,
    pub skip: Option<u32>,
    pub first: Option<u32>,
    pub order_by: Option<String>,
    pub order_direction: Option<OrderDirection>,
    pub policy: FetchPolicy,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality filter.
    #[must_use]
    pub fn where_eq(self, field: &str, value: impl Into<FilterValue>) -> Self {
        self.filter(field, FilterOp::Eq, value)
    }

    #[must_use]
    pub fn filter(mut self, field: &str, op: FilterOp, value: impl Into<FilterValue>) -> Self {
        self.filters.push(Filter {
            field: field.to_string(),
            op,
            value: value.into(),
        });
        self
    }

    #[must_use]
    pub fn skip(mut self, skip: u32) -> Self {
        self.skip = Some(skip);
        self
    }

    #[must_use]
    pub fn first(mut self, first: u32) -> Self {
        self.first = Some(first);
        self
    }

    #[must_use]
    pub fn order_by(mut self, field: &str, direction: OrderDirection) -> Self {
        self.order_by = Some(field.to_string());
        self.order_direction = Some(direction);
        self
    }

    #[must_use]
    pub fn policy(mut self, policy: FetchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Value of the first equality filter on `field`, if any.
    pub fn eq_value(&self, field: &str) -> Option<&FilterValue> {
        self.filters
            .iter()
            .find(|f| f.field == field && f.op == FilterOp::Eq)
            .map(|f| &f.value)
    }

    /// Remove every filter on `field`, returning the removed filters.
    pub fn take_filters(&mut self, field: &str) -> Vec<Filter> {
        let (taken, kept): (Vec<_>, Vec<_>) =
            self.filters.drain(..).partition(|f| f.field == field);
        self.filters = kept;
        taken
    }
}
