//! Logging configuration from environment variables.

use std::env;

/// Configuration for the structured logging subscriber.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Service name recorded on startup
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error or an EnvFilter directive)
    pub log_level: String,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,

    /// Whether to colourise pretty output
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            service_name: "governance-sync".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            ansi: true,
        }
    }
}

impl LoggingConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `GS_SERVICE_NAME`: Service name (default: governance-sync)
    /// - `GS_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `GS_JSON_LOGS`: Enable JSON logs (default: false)
    /// - `GS_LOG_ANSI`: Colourise pretty output (default: true)
    pub fn from_env() -> Self {
        Self {
            service_name: env::var("GS_SERVICE_NAME")
                .unwrap_or_else(|_| "governance-sync".to_string()),

            log_level: env::var("GS_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            json_logs: env::var("GS_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(false),

            ansi: env::var("GS_LOG_ANSI")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),
        }
    }

    /// Configuration for test harnesses: debug level, no colour.
    pub fn for_tests() -> Self {
        Self {
            service_name: "governance-sync-tests".to_string(),
            log_level: "debug".to_string(),
            json_logs: false,
            ansi: false,
        }
    }
}
