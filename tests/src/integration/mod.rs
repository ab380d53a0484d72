//! Cross-crate scenarios over the in-memory adapters.

pub mod boosting;
pub mod claim;
pub mod decode;
pub mod indexation;

/// Wiring shared by the scenarios.
#[cfg(test)]
pub(crate) mod support {
    use gs_01_index_port::{IndexPort, InMemoryIndex};
    use gs_02_entities::adapters::{RecordingLedger, StaticBalances, StaticContracts};
    use gs_02_entities::{ClientConfig, Context};
    use serde_json::{json, Value};
    use shared_types::Address;
    use std::sync::Arc;

    pub const TOKEN: &str = "0x22d491bde2303f2f43325b2108d26f1eaba1e32b";
    pub const VOTING_MACHINE: &str = "0xe11ba2b4d45eaed5996cd0823791e0c93114882d";
    pub const PROPOSER: &str = "0x90f8bf6a479f320ead074411a4b0e7944ea8c9c1";
    pub const HOLDER: &str = "0xffcf8fdee72ac11b5c542428b35eef5769c409f0";

    /// 2.0 at the default 2^40 confidence scale.
    pub const THRESHOLD: &str = "2199023255552";

    pub struct World {
        pub ctx: Context,
        pub index: Arc<InMemoryIndex>,
        pub ledger: Arc<RecordingLedger>,
        pub balances: Arc<StaticBalances>,
    }

    pub fn address(text: &str) -> Address {
        Address::parse(text).unwrap()
    }

    pub fn world() -> World {
        let index = Arc::new(InMemoryIndex::new());
        let ledger = Arc::new(RecordingLedger::new());
        let balances = Arc::new(StaticBalances::new());
        let contracts = StaticContracts::new().with_contract("GEN", None, address(TOKEN));
        let config = ClientConfig::default().with_default_account(address(HOLDER));
        let ctx = Context::builder(config, Arc::new(IndexPort::new(Arc::clone(&index))))
            .ledger(ledger.clone())
            .balances(balances.clone())
            .contracts(Arc::new(contracts))
            .build();
        World {
            ctx,
            index,
            ledger,
            balances,
        }
    }

    pub fn dao() -> Value {
        json!({
            "id": "0xdao",
            "name": "Scenario DAO",
            "nativeToken": {"id": TOKEN},
            "reputationTotalSupply": "1000",
            "membersCount": "3"
        })
    }

    pub fn queue() -> Value {
        json!({
            "id": "0xqueue",
            "dao": {"id": "0xdao"},
            "name": "ContributionReward",
            "address": VOTING_MACHINE,
            "threshold": THRESHOLD,
            "queuedVotePeriodLimit": "1800",
            "preBoostedVotePeriodLimit": "600",
            "boostedVotePeriodLimit": "600",
            "quietEndingPeriod": "300",
            "activationTime": "60"
        })
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
            "executedAt": null,
            "votesFor": "0",
            "votesAgainst": "0",
            "stakesFor": "0",
            "stakesAgainst": "0",
            "ethReward": "0",
            "nativeTokenReward": "250",
            "externalTokenReward": "0",
            "reputationReward": "40",
            "proposingRepReward": "10"
        })
    }
}
