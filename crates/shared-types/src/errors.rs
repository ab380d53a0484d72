//! # Error Types
//!
//! The error taxonomy shared by the index port, the entity layer and the
//! governance action surface.

use thiserror::Error;

/// Errors that can occur while fetching, decoding or acting on entities.
///
/// `Clone` so that a terminal feed error can be delivered to every
/// subscriber attached to the same upstream subscription.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    /// The id is not (yet) present in the index.
    #[error("{entity} {id} not indexed yet or does not exist with this id")]
    NotIndexedYet { entity: String, id: String },

    /// A record is missing a required relation or has the wrong shape.
    #[error("Invalid {entity} record: {reason}")]
    Invalid { entity: String, reason: String },

    /// The ledger rejected, reverted or failed to accept an action.
    #[error("Action {action} rejected: {reason}")]
    ActionRejected { action: String, reason: String },

    /// The action was refused before submission because the observed
    /// state does not allow it.
    #[error("Action {action} not allowed: {reason}")]
    ActionNotAllowed { action: String, reason: String },

    /// A required external capability was not configured.
    #[error("Configuration missing: no {capability} configured")]
    ConfigurationMissing { capability: String },

    /// The consumer cancelled, or the live sequence ended before a value arrived.
    #[error("Canceled")]
    Canceled,

    /// The index or another collaborator failed at the transport level.
    #[error("Transport error: {reason}")]
    Transport { reason: String },

    /// The query filters were rejected before being sent.
    #[error("Invalid query: {reason}")]
    InvalidQuery { reason: String },
}

impl SyncError {
    pub fn invalid(entity: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            entity: entity.to_string(),
            reason: reason.into(),
        }
    }

    pub fn not_indexed(entity: &str, id: impl std::fmt::Display) -> Self {
        Self::NotIndexedYet {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    pub fn missing(capability: &str) -> Self {
        Self::ConfigurationMissing {
            capability: capability.to_string(),
        }
    }

    pub fn is_not_indexed(&self) -> bool {
        matches!(self, Self::NotIndexedYet { .. })
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled)
    }

    /// Short label for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotIndexedYet { .. } => "not_indexed_yet",
            Self::Invalid { .. } => "invalid",
            Self::ActionRejected { .. } => "action_rejected",
            Self::ActionNotAllowed { .. } => "action_not_allowed",
            Self::ConfigurationMissing { .. } => "configuration_missing",
            Self::Canceled => "canceled",
            Self::Transport { .. } => "transport",
            Self::InvalidQuery { .. } => "invalid_query",
        }
    }
}

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;
