//! In-memory implementations of the outbound ports, for tests and local
//! wiring.

pub mod balances;
pub mod contracts;
pub mod ipfs;
pub mod ledger;

pub use balances::StaticBalances;
pub use contracts::StaticContracts;
pub use ipfs::MemoryIpfs;
pub use ledger::{RecordingLedger, SubmitHook};
