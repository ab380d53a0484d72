//! Driven Ports (SPI - Outbound Dependencies)
//!
//! Capabilities supplied by collaborators: the ledger, token balances,
//! contract-name resolution and IPFS storage. Transports, ABIs and signing
//! live behind these traits.

use crate::domain::proposal::{ProposalOutcome, ProposalRewards};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_bus::LiveStream;
use shared_types::{Address, Amount, EntityId, SyncResult};

/// An encoded governance or token action, opaque to everything but the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerAction {
    CreateProposal {
        dao: EntityId,
        scheme: EntityId,
        beneficiary: Option<Address>,
        description_hash: Option<String>,
        rewards: ProposalRewards,
        external_token: Option<Address>,
        call_data: Option<String>,
        value: Amount,
    },
    Vote {
        proposal: EntityId,
        voting_machine: Option<Address>,
        outcome: ProposalOutcome,
        /// Zero votes with the voter's full reputation.
        amount: Amount,
    },
    Stake {
        proposal: EntityId,
        voting_machine: Option<Address>,
        outcome: ProposalOutcome,
        amount: Amount,
    },
    Execute {
        proposal: EntityId,
    },
    /// Claim the rewards of an executed proposal.
    Redeem {
        proposal: EntityId,
        beneficiary: Address,
    },
    ApproveStaking {
        token: Address,
        spender: Address,
        amount: Amount,
    },
    Transfer {
        token: Address,
        to: Address,
        amount: Amount,
    },
    Mint {
        token: Address,
        to: Address,
        amount: Amount,
    },
}

impl LedgerAction {
    /// Short label for logs, metrics and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateProposal { .. } => "create_proposal",
            Self::Vote { .. } => "vote",
            Self::Stake { .. } => "stake",
            Self::Execute { .. } => "execute",
            Self::Redeem { .. } => "redeem",
            Self::ApproveStaking { .. } => "approve_staking",
            Self::Transfer { .. } => "transfer",
            Self::Mint { .. } => "mint",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiptStatus {
    Succeeded,
    Reverted { reason: String },
}

/// What the ledger reports back. Only success or revert is interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionReceipt {
    pub tx_hash: String,
    pub status: ReceiptStatus,
    /// Id of the record the action created, when the ledger reports one.
    pub created_id: Option<EntityId>,
}

impl ActionReceipt {
    pub fn succeeded(&self) -> bool {
        matches!(self.status, ReceiptStatus::Succeeded)
    }
}

/// Ledger-action capability.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Submit an action and wait for its receipt.
    ///
    /// `Err` means the action never reached the ledger or was refused;
    /// a mined but reverted action is `Ok` with [`ReceiptStatus::Reverted`].
    async fn submit(&self, action: LedgerAction) -> SyncResult<ActionReceipt>;
}

/// Token balance and allowance reads.
///
/// Live views emit `None` until the first successful read.
#[async_trait]
pub trait BalanceProvider: Send + Sync {
    async fn balance(&self, token: &Address, owner: &Address) -> SyncResult<Option<Amount>>;

    fn watch_balance(&self, token: &Address, owner: &Address) -> LiveStream<Option<Amount>>;

    fn watch_allowance(
        &self,
        token: &Address,
        owner: &Address,
        spender: &Address,
    ) -> LiveStream<Option<Amount>>;
}

/// Address and contract-name resolution.
pub trait ContractResolver: Send + Sync {
    /// Human-readable contract name deployed at `address`.
    fn contract_name(&self, address: &Address) -> Option<String>;

    /// Address of a named contract, optionally at a specific version.
    fn contract_address(&self, name: &str, version: Option<&str>) -> Option<Address>;
}

/// Content-addressed JSON storage.
#[async_trait]
pub trait IpfsGateway: Send + Sync {
    /// Store a document, returning its content hash.
    async fn add_json(&self, document: &Value) -> SyncResult<String>;

    async fn cat_json(&self, hash: &str) -> SyncResult<Value>;
}
