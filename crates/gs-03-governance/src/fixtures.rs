//! Index records and a wired context shared by the unit tests.

use gs_01_index_port::{IndexPort, InMemoryIndex};
use gs_02_entities::adapters::{MemoryIpfs, RecordingLedger};
use gs_02_entities::{ClientConfig, Context};
use serde_json::{json, Value};
use shared_types::Address;
use std::sync::Arc;

pub const PROPOSER: &str = "0x90f8bf6a479f320ead074411a4b0e7944ea8c9c1";
pub const ACCOUNT: &str = "0xffcf8fdee72ac11b5c542428b35eef5769c409f0";
pub const VOTING_MACHINE: &str = "0x22d491bde2303f2f43325b2108d26f1eaba1e32b";

pub struct Harness {
    pub ctx: Context,
    pub index: Arc<InMemoryIndex>,
    pub ledger: Arc<RecordingLedger>,
    pub ipfs: Arc<MemoryIpfs>,
}

pub fn harness(config: ClientConfig) -> Harness {
    let index = Arc::new(InMemoryIndex::new());
    let ledger = Arc::new(RecordingLedger::new());
    let ipfs = Arc::new(MemoryIpfs::new());
    let ctx = Context::builder(config, Arc::new(IndexPort::new(Arc::clone(&index))))
        .ledger(ledger.clone())
        .ipfs(ipfs.clone())
        .build();
    Harness {
        ctx,
        index,
        ledger,
        ipfs,
    }
}

pub fn account() -> Address {
    Address::parse(ACCOUNT).unwrap()
}

pub fn proposal(id: &str, stage: &str) -> Value {
    json!({
        "id": id,
        "dao": {"id": "0xdao"},
        "scheme": {"id": "0xscheme"},
        "queue": {"id": "0xqueue"},
        "proposer": PROPOSER,
        "votingMachine": VOTING_MACHINE,
        "stage": stage,
        "createdAt": "1000",
        "boostedAt": null,
        "quietEndingPeriodBeganAt": null,
        "executedAt": null,
        "votesFor": "0",
        "votesAgainst": "0",
        "stakesFor": "0",
        "stakesAgainst": "0",
        "ethReward": "10",
        "nativeTokenReward": "10",
        "externalTokenReward": "0",
        "reputationReward": "10",
        "proposingRepReward": "5"
    })
}

pub fn queue(id: &str) -> Value {
    json!({
        "id": id,
        "dao": {"id": "0xdao"},
        "name": "GenericScheme",
        "address": VOTING_MACHINE,
        "threshold": "2199023255552",
        "queuedVotePeriodLimit": "1800",
        "preBoostedVotePeriodLimit": "600",
        "boostedVotePeriodLimit": "600",
        "quietEndingPeriod": "300",
        "activationTime": "60"
    })
}
