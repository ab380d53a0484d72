//! Ports for the entity layer.
//!
//! The indexed-query capability is consumed through
//! [`gs_01_index_port::QueryPort`]; the rest are declared here.

pub mod outbound;

pub use outbound::{
    ActionReceipt, BalanceProvider, ContractResolver, IpfsGateway, LedgerAction, LedgerGateway,
    ReceiptStatus,
};
