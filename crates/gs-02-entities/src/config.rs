//! Client configuration.
//!
//! Passed explicitly through [`Context`](crate::Context); nothing reads
//! ambient network settings.

use shared_types::{parse_amount, Address, Amount, FetchPolicy, U256};
use std::env;
use tracing::warn;

/// Default `SCALE` for `floor(stakesFor * SCALE / max(stakesAgainst, 1))`.
pub fn default_confidence_scale() -> Amount {
    U256::from(1u64 << 40)
}

/// Connection endpoints and protocol constants for one client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub graphql_http_provider: String,
    pub graphql_ws_provider: String,
    pub web3_provider: String,
    /// IPFS API endpoint. Proposal creation fails fast without one.
    pub ipfs_provider: Option<String>,
    pub confidence_scale: Amount,
    pub default_fetch_policy: FetchPolicy,
    /// Account used when an action omits an explicit beneficiary.
    pub default_account: Option<Address>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            graphql_http_provider: "http://127.0.0.1:8000/subgraphs/name/daostack".to_string(),
            graphql_ws_provider: "ws://127.0.0.1:8001/subgraphs/name/daostack".to_string(),
            web3_provider: "ws://127.0.0.1:8545".to_string(),
            ipfs_provider: None,
            confidence_scale: default_confidence_scale(),
            default_fetch_policy: FetchPolicy::Shared,
            default_account: None,
        }
    }
}

impl ClientConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `GS_GRAPHQL_HTTP`: index HTTP endpoint
    /// - `GS_GRAPHQL_WS`: index subscription endpoint
    /// - `GS_WEB3_PROVIDER`: ledger endpoint
    /// - `GS_IPFS_PROVIDER`: IPFS API endpoint (unset or empty disables uploads)
    /// - `GS_CONFIDENCE_SCALE`: decimal confidence scale (default: 2^40)
    /// - `GS_DEFAULT_ACCOUNT`: `0x` address used as the default beneficiary
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            graphql_http_provider: env::var("GS_GRAPHQL_HTTP")
                .unwrap_or(defaults.graphql_http_provider),

            graphql_ws_provider: env::var("GS_GRAPHQL_WS").unwrap_or(defaults.graphql_ws_provider),

            web3_provider: env::var("GS_WEB3_PROVIDER").unwrap_or(defaults.web3_provider),

            ipfs_provider: env::var("GS_IPFS_PROVIDER")
                .ok()
                .filter(|v| !v.trim().is_empty()),

            confidence_scale: env::var("GS_CONFIDENCE_SCALE")
                .ok()
                .and_then(|v| {
                    let parsed = parse_amount(&v).filter(|scale| !scale.is_zero());
                    if parsed.is_none() {
                        warn!(value = %v, "Ignoring invalid GS_CONFIDENCE_SCALE");
                    }
                    parsed
                })
                .unwrap_or(defaults.confidence_scale),

            default_fetch_policy: defaults.default_fetch_policy,

            default_account: env::var("GS_DEFAULT_ACCOUNT").ok().and_then(|v| {
                Address::parse(&v)
                    .map_err(|e| warn!(error = %e, "Ignoring invalid GS_DEFAULT_ACCOUNT"))
                    .ok()
            }),
        }
    }

    #[must_use]
    pub fn with_ipfs_provider(mut self, provider: impl Into<String>) -> Self {
        self.ipfs_provider = Some(provider.into());
        self
    }

    #[must_use]
    pub fn with_default_account(mut self, account: Address) -> Self {
        self.default_account = Some(account);
        self
    }

    #[must_use]
    pub fn with_confidence_scale(mut self, scale: Amount) -> Self {
        self.confidence_scale = scale;
        self
    }

    /// Whether an IPFS endpoint is configured (set and non-empty).
    pub fn has_ipfs_provider(&self) -> bool {
        self.ipfs_provider
            .as_deref()
            .is_some_and(|p| !p.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.confidence_scale, U256::from(1_099_511_627_776u64));
        assert!(!config.has_ipfs_provider());
        assert_eq!(config.default_fetch_policy, FetchPolicy::Shared);
    }

    #[test]
    fn test_empty_ipfs_provider_counts_as_missing() {
        let config = ClientConfig::default().with_ipfs_provider("  ");
        assert!(!config.has_ipfs_provider());
        let config = config.with_ipfs_provider("http://localhost:5001/api/v0");
        assert!(config.has_ipfs_provider());
    }
}
