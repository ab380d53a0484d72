//! # Governance-Sync Telemetry
//!
//! Structured logging for every governance-sync crate.
//!
//! Library crates only emit through the `tracing` facade; binaries and test
//! harnesses call [`init_logging`] once to install a subscriber.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gs_telemetry::{init_logging, LoggingConfig};
//!
//! let _guard = init_logging(&LoggingConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GS_SERVICE_NAME` | `governance-sync` | Service name recorded on startup |
//! | `GS_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `GS_JSON_LOGS` | `false` | Emit JSON lines instead of pretty output |
//! | `GS_LOG_ANSI` | `true` | Colourise pretty output |

mod config;
mod logging;

pub use config::LoggingConfig;
pub use logging::{init_logging, LoggingGuard};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),

    #[error("A global subscriber is already installed: {0}")]
    AlreadyInitialized(String),
}

/// Span carrying the entity kind and id, for use around fetches and waits.
#[macro_export]
macro_rules! entity_span {
    ($name:expr, $entity:expr, $id:expr) => {
        tracing::debug_span!($name, entity = $entity, id = %$id)
    };
}
