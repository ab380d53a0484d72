//! # Core Identity and Value Types
//!
//! Identifiers and value objects used by every entity kind.
//!
//! ## Clusters
//!
//! - **Identity**: `EntityId`, `Address`
//! - **Values**: `Amount` (U256 base units), `Timestamp`, `Seconds`

use crate::errors::SyncError;
use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export U256 from primitive-types for use across all crates
pub use primitive_types::{U256, U512};

/// Token, ether or reputation quantity in base units.
pub type Amount = U256;

/// Unix timestamp in seconds, as reported by the index.
pub type Timestamp = u64;

/// A duration in seconds (vote-period limits, quiet-ending windows).
pub type Seconds = u64;

/// Opaque, case-normalised identifier of an indexed record.
///
/// Construction trims and lower-cases the input, so `EntityId::new("0xAB")`
/// and `EntityId::new("0xab")` refer to the same record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(id.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<EntityId> for String {
    fn from(value: EntityId) -> Self {
        value.0
    }
}

impl From<Address> for EntityId {
    fn from(value: Address) -> Self {
        Self(value.0)
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A 20-byte account or contract address in `0x`-prefixed lower-case hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Length of an address in bytes.
    pub const LEN: usize = 20;

    /// Parse and normalise an address.
    ///
    /// Accepts mixed case; rejects anything that is not `0x` followed by
    /// exactly 40 hex digits.
    pub fn parse(text: &str) -> Result<Self, SyncError> {
        let trimmed = text.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| SyncError::Invalid {
                entity: "address".to_string(),
                reason: format!("missing 0x prefix: {trimmed}"),
            })?;

        let bytes = hex::decode(digits).map_err(|e| SyncError::Invalid {
            entity: "address".to_string(),
            reason: format!("{trimmed}: {e}"),
        })?;
        if bytes.len() != Self::LEN {
            return Err(SyncError::Invalid {
                entity: "address".to_string(),
                reason: format!("{trimmed}: expected {} bytes, got {}", Self::LEN, bytes.len()),
            });
        }

        Ok(Self(format!("0x{}", digits.to_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_entity_id(&self) -> EntityId {
        EntityId(self.0.clone())
    }
}

impl TryFrom<String> for Address {
    type Error = SyncError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse a base-10 amount as the index renders big integers.
pub fn parse_amount(text: &str) -> Option<Amount> {
    let trimmed = text.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    U256::from_dec_str(trimmed).ok()
}

/// `value * 10^18`, the usual fixed-point unit for ERC-20 and reputation.
pub fn to_wei(value: u64) -> Amount {
    U256::from(value) * U256::exp10(18)
}
