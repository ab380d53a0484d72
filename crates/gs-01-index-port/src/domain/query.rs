//! # Query Rendering
//!
//! Translates [`QueryOptions`] into a validated [`IndexQuery`].
//!
//! Every entity kind owns one [`QueryBuilder`] holding its collection name
//! and field allow-list. Building a query:
//!
//! 1. rejects filter and `orderBy` fields outside the allow-list
//! 2. lower-cases values of address-like fields
//! 3. escapes `"` and `\` in string literals
//! 4. renders a GraphQL-style argument block, which doubles as the key
//!    for sharing one upstream feed between identical queries
//!
//! ```text
//! proposals(where: {dao: "0xabc", stage_in: ["Queued", "PreBoosted"]}, first: 10, orderBy: createdAt, orderDirection: desc)
//! ```

use serde::{Deserialize, Serialize};
use shared_types::{
    EntityId, FetchPolicy, Filter, FilterOp, FilterValue, OrderDirection, QueryOptions, SyncError,
    SyncResult,
};
use std::fmt::Write as _;

/// A validated list query against one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexQuery {
    pub collection: String,
    pub filters: Vec<Filter>,
    pub skip: Option<u32>,
    pub first: Option<u32>,
    pub order_by: Option<String>,
    pub order_direction: OrderDirection,
    pub policy: FetchPolicy,
    arguments: String,
}

impl IndexQuery {
    /// The rendered argument block, empty when the query has no arguments.
    pub fn arguments(&self) -> &str {
        &self.arguments
    }

    /// Feed-sharing key: collection plus rendered arguments.
    pub fn key(&self) -> String {
        format!("{}{}", self.collection, self.arguments)
    }

    #[must_use]
    pub fn with_policy(mut self, policy: FetchPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// A single-record lookup by id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordQuery {
    pub collection: String,
    pub id: EntityId,
    pub policy: FetchPolicy,
}

impl RecordQuery {
    pub fn new(collection: impl Into<String>, id: EntityId) -> Self {
        Self {
            collection: collection.into(),
            id,
            policy: FetchPolicy::Shared,
        }
    }

    pub fn key(&self) -> String {
        format!("{}(id: \"{}\")", self.collection, escape(self.id.as_str()))
    }

    #[must_use]
    pub fn with_policy(mut self, policy: FetchPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Per-collection query translation with a field allow-list.
#[derive(Debug, Clone, Copy)]
pub struct QueryBuilder {
    collection: &'static str,
    allowed_fields: &'static [&'static str],
    address_fields: &'static [&'static str],
}

impl QueryBuilder {
    pub const fn new(collection: &'static str, allowed_fields: &'static [&'static str]) -> Self {
        Self {
            collection,
            allowed_fields,
            address_fields: &[],
        }
    }

    /// Fields whose text values are addresses or ids and get lower-cased.
    pub const fn with_address_fields(self, fields: &'static [&'static str]) -> Self {
        Self {
            address_fields: fields,
            ..self
        }
    }

    pub fn collection(&self) -> &'static str {
        self.collection
    }

    pub fn allows(&self, field: &str) -> bool {
        self.allowed_fields.contains(&field)
    }

    pub fn record(&self, id: &EntityId) -> RecordQuery {
        RecordQuery::new(self.collection, id.clone())
    }

    /// Validate and render `options`.
    pub fn build(&self, options: &QueryOptions) -> SyncResult<IndexQuery> {
        let mut filters = Vec::with_capacity(options.filters.len());
        for filter in &options.filters {
            if !self.allows(&filter.field) {
                return Err(SyncError::InvalidQuery {
                    reason: format!(
                        "unknown filter field '{}' for {}",
                        filter.field, self.collection
                    ),
                });
            }
            check_shape(filter)?;
            let value = if self.address_fields.contains(&filter.field.as_str()) {
                lowercase_text(&filter.value)
            } else {
                filter.value.clone()
            };
            filters.push(Filter {
                field: filter.field.clone(),
                op: filter.op,
                value,
            });
        }

        if let Some(order_by) = &options.order_by {
            if !self.allows(order_by) {
                return Err(SyncError::InvalidQuery {
                    reason: format!("unknown orderBy field '{}' for {}", order_by, self.collection),
                });
            }
        }

        let order_direction = options.order_direction.unwrap_or(OrderDirection::Asc);
        let arguments = render_arguments(
            &filters,
            options.first,
            options.skip,
            options.order_by.as_deref(),
            options.order_direction,
        );

        Ok(IndexQuery {
            collection: self.collection.to_string(),
            filters,
            skip: options.skip,
            first: options.first,
            order_by: options.order_by.clone(),
            order_direction,
            policy: options.policy,
            arguments,
        })
    }
}

fn check_shape(filter: &Filter) -> SyncResult<()> {
    let is_list = matches!(filter.value, FilterValue::List(_));
    match (filter.op, is_list) {
        (FilterOp::In, false) => Err(SyncError::InvalidQuery {
            reason: format!("'{}_in' expects a list", filter.field),
        }),
        (op, true) if op != FilterOp::In => Err(SyncError::InvalidQuery {
            reason: format!("'{}{}' does not accept a list", filter.field, op.suffix()),
        }),
        _ => Ok(()),
    }
}

fn lowercase_text(value: &FilterValue) -> FilterValue {
    match value {
        FilterValue::Text(text) => FilterValue::Text(text.trim().to_lowercase()),
        FilterValue::List(items) => FilterValue::List(items.iter().map(lowercase_text).collect()),
        other => other.clone(),
    }
}

/// Escape a string literal for the index's query grammar.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", u32::from(c));
            }
            other => out.push(other),
        }
    }
    out
}

fn render_value(value: &FilterValue, out: &mut String) {
    match value {
        FilterValue::Text(text) => {
            out.push('"');
            out.push_str(&escape(text));
            out.push('"');
        }
        FilterValue::Number(n) => {
            let _ = write!(out, "{n}");
        }
        // Big integers travel as decimal strings.
        FilterValue::Amount(amount) => {
            let _ = write!(out, "\"{amount}\"");
        }
        FilterValue::Bool(b) => {
            let _ = write!(out, "{b}");
        }
        FilterValue::List(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                render_value(item, out);
            }
            out.push(']');
        }
    }
}

fn render_arguments(
    filters: &[Filter],
    first: Option<u32>,
    skip: Option<u32>,
    order_by: Option<&str>,
    order_direction: Option<OrderDirection>,
) -> String {
    let mut parts = Vec::new();

    if !filters.is_empty() {
        let mut clause = String::from("where: {");
        for (i, filter) in filters.iter().enumerate() {
            if i > 0 {
                clause.push_str(", ");
            }
            clause.push_str(&filter.field);
            clause.push_str(filter.op.suffix());
            clause.push_str(": ");
            render_value(&filter.value, &mut clause);
        }
        clause.push('}');
        parts.push(clause);
    }
    if let Some(first) = first {
        parts.push(format!("first: {first}"));
    }
    if let Some(skip) = skip {
        parts.push(format!("skip: {skip}"));
    }
    if let Some(order_by) = order_by {
        parts.push(format!("orderBy: {order_by}"));
    }
    if let Some(direction) = order_direction {
        parts.push(format!("orderDirection: {}", direction.as_str()));
    }

    if parts.is_empty() {
        String::new()
    } else {
        format!("({})", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{Amount, FilterOp};

    const VOTES: QueryBuilder = QueryBuilder::new(
        "votes",
        &["id", "dao", "proposal", "voter", "outcome", "createdAt"],
    )
    .with_address_fields(&["id", "dao", "proposal", "voter"]);

    #[test]
    fn test_renders_full_argument_block() {
        let options = QueryOptions::new()
            .where_eq("dao", "0xABC")
            .filter("createdAt", FilterOp::Gte, 100u64)
            .first(10)
            .skip(5)
            .order_by("createdAt", OrderDirection::Desc);

        let query = VOTES.build(&options).unwrap();
        assert_eq!(
            query.key(),
            "votes(where: {dao: \"0xabc\", createdAt_gte: 100}, first: 10, skip: 5, orderBy: createdAt, orderDirection: desc)"
        );
    }

    #[test]
    fn test_control_characters_escaped() {
        assert_eq!(escape("a\"b\\c"), "a\\\"b\\\\c");
        assert_eq!(escape("line\nnext\r\tend"), "line\\nnext\\r\\tend");
        assert_eq!(escape("bell\u{7}"), "bell\\u0007");

        let options = QueryOptions::new().where_eq("outcome", "Pass\nFail");
        let query = VOTES.build(&options).unwrap();
        assert_eq!(query.key(), "votes(where: {outcome: \"Pass\\nFail\"})");
    }

    #[test]
    fn test_record_queries_hash_by_policy() {
        use std::collections::HashSet;

        let shared = RecordQuery::new("votes", EntityId::new("0x1"));
        let fresh = shared.clone().with_policy(FetchPolicy::Fresh);
        let keys: HashSet<_> = [shared.clone(), fresh, shared].into_iter().collect();
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn test_empty_options_render_bare_collection() {
        let query = VOTES.build(&QueryOptions::new()).unwrap();
        assert_eq!(query.key(), "votes");
        assert_eq!(query.arguments(), "");
        assert_eq!(query.order_direction, OrderDirection::Asc);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let options = QueryOptions::new().where_eq("stage", "Queued");
        let err = VOTES.build(&options).unwrap_err();
        assert!(matches!(err, SyncError::InvalidQuery { .. }));
    }

    #[test]
    fn test_unknown_order_by_rejected() {
        let options = QueryOptions::new().order_by("amount", OrderDirection::Asc);
        assert!(VOTES.build(&options).is_err());
    }

    #[test]
    fn test_string_values_are_escaped() {
        let builder = QueryBuilder::new("queues", &["name"]);
        let options = QueryOptions::new().where_eq("name", "a\"b\\c");
        let query = builder.build(&options).unwrap();
        assert_eq!(query.key(), "queues(where: {name: \"a\\\"b\\\\c\"})");
    }

    #[test]
    fn test_non_address_text_keeps_case() {
        let builder = QueryBuilder::new("queues", &["name"]);
        let query = builder
            .build(&QueryOptions::new().where_eq("name", "ContributionReward"))
            .unwrap();
        assert_eq!(
            query.filters[0].value,
            FilterValue::Text("ContributionReward".into())
        );
    }

    #[test]
    fn test_in_filter_requires_list() {
        let bad = QueryOptions::new().filter("outcome", FilterOp::In, "Pass");
        assert!(VOTES.build(&bad).is_err());

        let list = FilterValue::List(vec!["0xA".into(), "0xB".into()]);
        let good = QueryOptions::new().filter("voter", FilterOp::In, list);
        let query = VOTES.build(&good).unwrap();
        assert_eq!(query.key(), "votes(where: {voter_in: [\"0xa\", \"0xb\"]})");
    }

    #[test]
    fn test_amounts_render_as_decimal_strings() {
        let builder = QueryBuilder::new("stakes", &["amount"]);
        let options = QueryOptions::new().filter("amount", FilterOp::Gt, Amount::from(42u64));
        let query = builder.build(&options).unwrap();
        assert_eq!(query.key(), "stakes(where: {amount_gt: \"42\"})");
    }

    #[test]
    fn test_record_key() {
        let query = VOTES.record(&EntityId::new("0xABC"));
        assert_eq!(query.key(), "votes(id: \"0xabc\")");
        assert_eq!(query.policy, FetchPolicy::Shared);
    }
}
