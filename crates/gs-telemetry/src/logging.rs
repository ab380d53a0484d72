//! Subscriber installation.
//!
//! Pretty output for development, JSON lines for log shippers. The level
//! filter comes from the config, so `RUST_LOG`-style directives such as
//! `gs_02_entities=debug,info` work.

use crate::{LoggingConfig, TelemetryError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Handle returned by [`init_logging`]. Holding it has no side effects; it
/// records which format was installed.
#[derive(Debug)]
pub struct LoggingGuard {
    json: bool,
}

impl LoggingGuard {
    pub fn is_json(&self) -> bool {
        self.json
    }
}

/// Install the global subscriber.
///
/// Fails with [`TelemetryError::AlreadyInitialized`] if one is already set,
/// so test harnesses can call it repeatedly and ignore the error.
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard, TelemetryError> {
    let env_filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| TelemetryError::InvalidFilter(e.to_string()))?;

    if config.json_logs {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .try_init()
            .map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_ansi(config.ansi);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))?;
    }

    tracing::info!(
        service = %config.service_name,
        level = %config.log_level,
        json = config.json_logs,
        "Logging initialized"
    );

    Ok(LoggingGuard {
        json: config.json_logs,
    })
}
