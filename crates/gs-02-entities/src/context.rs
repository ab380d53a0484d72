//! # Context
//!
//! The explicit bundle of configuration and collaborator capabilities every
//! entity is constructed with. Cheap to clone.
//!
//! Only the query port is mandatory. The other capabilities are optional and
//! their accessors fail fast with [`SyncError::ConfigurationMissing`].

use crate::config::ClientConfig;
use crate::ports::outbound::{
    ActionReceipt, BalanceProvider, ContractResolver, IpfsGateway, LedgerAction, LedgerGateway,
    ReceiptStatus,
};
use gs_01_index_port::QueryPort;
use shared_types::{SyncError, SyncResult};
use std::sync::Arc;
use tracing::{info, warn};

struct ContextInner {
    config: ClientConfig,
    port: Arc<dyn QueryPort>,
    ledger: Option<Arc<dyn LedgerGateway>>,
    balances: Option<Arc<dyn BalanceProvider>>,
    contracts: Option<Arc<dyn ContractResolver>>,
    ipfs: Option<Arc<dyn IpfsGateway>>,
}

#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.inner.config)
            .field("ledger", &self.inner.ledger.is_some())
            .field("balances", &self.inner.balances.is_some())
            .field("contracts", &self.inner.contracts.is_some())
            .field("ipfs", &self.inner.ipfs.is_some())
            .finish()
    }
}

impl Context {
    pub fn builder(config: ClientConfig, port: Arc<dyn QueryPort>) -> ContextBuilder {
        ContextBuilder {
            inner: ContextInner {
                config,
                port,
                ledger: None,
                balances: None,
                contracts: None,
                ipfs: None,
            },
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn port(&self) -> &Arc<dyn QueryPort> {
        &self.inner.port
    }

    pub fn ledger(&self) -> SyncResult<&Arc<dyn LedgerGateway>> {
        self.inner
            .ledger
            .as_ref()
            .ok_or_else(|| SyncError::missing("ledger"))
    }

    pub fn balances(&self) -> SyncResult<&Arc<dyn BalanceProvider>> {
        self.inner
            .balances
            .as_ref()
            .ok_or_else(|| SyncError::missing("balanceProvider"))
    }

    /// Contract resolution is best effort; absence just means no fallback names.
    pub fn contracts(&self) -> Option<&Arc<dyn ContractResolver>> {
        self.inner.contracts.as_ref()
    }

    /// Requires both a configured endpoint and a gateway.
    pub fn ipfs(&self) -> SyncResult<&Arc<dyn IpfsGateway>> {
        if !self.inner.config.has_ipfs_provider() {
            return Err(SyncError::missing("ipfsProvider"));
        }
        self.inner
            .ipfs
            .as_ref()
            .ok_or_else(|| SyncError::missing("ipfsProvider"))
    }

    /// Submit an action and interpret the receipt.
    ///
    /// Gateway failures and reverted receipts both surface as
    /// [`SyncError::ActionRejected`]. Nothing is retried.
    pub async fn submit(&self, action: LedgerAction) -> SyncResult<ActionReceipt> {
        let kind = action.kind();
        let ledger = self.ledger()?;
        info!(action = kind, "Submitting ledger action");

        let receipt = ledger.submit(action).await.map_err(|e| {
            warn!(action = kind, error = %e, "Ledger refused action");
            match e {
                SyncError::ActionRejected { .. } => e,
                other => SyncError::ActionRejected {
                    action: kind.to_string(),
                    reason: other.to_string(),
                },
            }
        })?;

        match &receipt.status {
            ReceiptStatus::Succeeded => {
                info!(action = kind, tx = %receipt.tx_hash, "Ledger action succeeded");
                Ok(receipt)
            }
            ReceiptStatus::Reverted { reason } => {
                warn!(action = kind, tx = %receipt.tx_hash, reason = %reason, "Ledger action reverted");
                Err(SyncError::ActionRejected {
                    action: kind.to_string(),
                    reason: format!("reverted: {reason}"),
                })
            }
        }
    }
}

/// Builder for [`Context`].
pub struct ContextBuilder {
    inner: ContextInner,
}

impl ContextBuilder {
    #[must_use]
    pub fn ledger(mut self, ledger: Arc<dyn LedgerGateway>) -> Self {
        self.inner.ledger = Some(ledger);
        self
    }

    #[must_use]
    pub fn balances(mut self, balances: Arc<dyn BalanceProvider>) -> Self {
        self.inner.balances = Some(balances);
        self
    }

    #[must_use]
    pub fn contracts(mut self, contracts: Arc<dyn ContractResolver>) -> Self {
        self.inner.contracts = Some(contracts);
        self
    }

    #[must_use]
    pub fn ipfs(mut self, ipfs: Arc<dyn IpfsGateway>) -> Self {
        self.inner.ipfs = Some(ipfs);
        self
    }

    pub fn build(self) -> Context {
        Context {
            inner: Arc::new(self.inner),
        }
    }
}
