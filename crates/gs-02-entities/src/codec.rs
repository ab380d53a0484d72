//! Raw record field readers shared by the entity decoders.
//!
//! The index renders big integers as decimal strings, relations as
//! `{ "id": ... }` objects and unset instants as `null`. Required relations
//! are strict; scalar amounts default to zero when the index omits them.

use serde_json::Value;
use shared_types::{parse_amount, Address, Amount, EntityId, SyncError, SyncResult, Timestamp};

/// Id of a required relation (`{ "id": ... }` or a bare id string).
pub fn relation(raw: &Value, field: &str, entity: &str) -> SyncResult<EntityId> {
    optional_relation(raw, field, entity)?
        .ok_or_else(|| SyncError::invalid(entity, format!("missing {field}.id")))
}

pub fn optional_relation(raw: &Value, field: &str, entity: &str) -> SyncResult<Option<EntityId>> {
    match raw.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(id)) if !id.trim().is_empty() => Ok(Some(EntityId::new(id))),
        Some(Value::Object(obj)) => match obj.get("id") {
            Some(Value::String(id)) if !id.trim().is_empty() => Ok(Some(EntityId::new(id))),
            None | Some(Value::Null) => Ok(None),
            Some(other) => Err(SyncError::invalid(
                entity,
                format!("{field}.id is not a string: {other}"),
            )),
        },
        Some(other) => Err(SyncError::invalid(
            entity,
            format!("{field} is not a relation: {other}"),
        )),
    }
}

pub fn id(raw: &Value, entity: &str) -> SyncResult<EntityId> {
    match raw.get("id").and_then(Value::as_str) {
        Some(id) if !id.trim().is_empty() => Ok(EntityId::new(id)),
        _ => Err(SyncError::invalid(entity, "missing id")),
    }
}

pub fn string(raw: &Value, field: &str, entity: &str) -> SyncResult<String> {
    optional_string(raw, field, entity)?
        .ok_or_else(|| SyncError::invalid(entity, format!("missing {field}")))
}

pub fn optional_string(raw: &Value, field: &str, entity: &str) -> SyncResult<Option<String>> {
    match raw.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(SyncError::invalid(
            entity,
            format!("{field} is not a string: {other}"),
        )),
    }
}

pub fn address(raw: &Value, field: &str, entity: &str) -> SyncResult<Address> {
    optional_address(raw, field, entity)?
        .ok_or_else(|| SyncError::invalid(entity, format!("missing {field}")))
}

/// Address fields may also arrive as relations (`owner { id }`).
pub fn optional_address(raw: &Value, field: &str, entity: &str) -> SyncResult<Option<Address>> {
    let text = match raw.get(field) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) => s.as_str(),
        Some(Value::Object(obj)) => match obj.get("id").and_then(Value::as_str) {
            Some(s) => s,
            None => return Ok(None),
        },
        Some(other) => {
            return Err(SyncError::invalid(
                entity,
                format!("{field} is not an address: {other}"),
            ))
        }
    };
    Address::parse(text)
        .map(Some)
        .map_err(|e| SyncError::invalid(entity, format!("{field}: {e}")))
}

/// Non-negative integer in base units. Missing or null reads as zero.
pub fn amount(raw: &Value, field: &str, entity: &str) -> SyncResult<Amount> {
    match raw.get(field) {
        None | Some(Value::Null) => Ok(Amount::zero()),
        Some(Value::String(s)) => parse_amount(s)
            .ok_or_else(|| SyncError::invalid(entity, format!("{field} is not an amount: {s}"))),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(Amount::from)
            .ok_or_else(|| SyncError::invalid(entity, format!("{field} is not an amount: {n}"))),
        Some(other) => Err(SyncError::invalid(
            entity,
            format!("{field} is not an amount: {other}"),
        )),
    }
}

/// Amount that is meaningful only when present.
pub fn optional_amount(raw: &Value, field: &str, entity: &str) -> SyncResult<Option<Amount>> {
    match raw.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(_) => amount(raw, field, entity).map(Some),
    }
}

/// Optional instant or duration. `null` and missing are unset; `0` is `Some(0)`.
pub fn optional_u64(raw: &Value, field: &str, entity: &str) -> SyncResult<Option<u64>> {
    match raw.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| SyncError::invalid(entity, format!("{field} is not an integer: {n}"))),
        Some(Value::String(s)) => s
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| SyncError::invalid(entity, format!("{field} is not an integer: {s}"))),
        Some(other) => Err(SyncError::invalid(
            entity,
            format!("{field} is not an integer: {other}"),
        )),
    }
}

pub fn timestamp(raw: &Value, field: &str, entity: &str) -> SyncResult<Timestamp> {
    optional_u64(raw, field, entity)?
        .ok_or_else(|| SyncError::invalid(entity, format!("missing {field}")))
}

/// Boolean flag; missing or null reads as false.
pub fn flag(raw: &Value, field: &str, entity: &str) -> SyncResult<bool> {
    match raw.get(field) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(SyncError::invalid(
            entity,
            format!("{field} is not a boolean: {other}"),
        )),
    }
}
