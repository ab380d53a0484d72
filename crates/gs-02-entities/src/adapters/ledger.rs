//! Ledger gateway that records submissions and answers from a script.

use crate::ports::outbound::{ActionReceipt, LedgerAction, LedgerGateway, ReceiptStatus};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{EntityId, SyncError, SyncResult};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Called after every succeeded submission, e.g. to simulate indexation.
pub type SubmitHook = Arc<dyn Fn(&LedgerAction, &ActionReceipt) + Send + Sync>;

enum Scripted {
    Revert(String),
    Fail(SyncError),
}

/// Records every action and succeeds unless told otherwise.
#[derive(Default)]
pub struct RecordingLedger {
    submitted: Mutex<Vec<LedgerAction>>,
    script: Mutex<VecDeque<Scripted>>,
    hook: Mutex<Option<SubmitHook>>,
}

impl RecordingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mine the next action but revert it with `reason`.
    pub fn revert_next(&self, reason: &str) {
        self.script
            .lock()
            .push_back(Scripted::Revert(reason.to_string()));
    }

    /// Refuse the next action before it reaches the chain.
    pub fn fail_next(&self, error: SyncError) {
        self.script.lock().push_back(Scripted::Fail(error));
    }

    pub fn on_submit(&self, hook: SubmitHook) {
        *self.hook.lock() = Some(hook);
    }

    pub fn submitted(&self) -> Vec<LedgerAction> {
        self.submitted.lock().clone()
    }

    /// Number of submitted actions of `kind` (see [`LedgerAction::kind`]).
    pub fn count(&self, kind: &str) -> usize {
        self.submitted
            .lock()
            .iter()
            .filter(|action| action.kind() == kind)
            .count()
    }
}

#[async_trait]
impl LedgerGateway for RecordingLedger {
    async fn submit(&self, action: LedgerAction) -> SyncResult<ActionReceipt> {
        self.submitted.lock().push(action.clone());
        let scripted = self.script.lock().pop_front();
        let tx_hash = format!("0x{}", Uuid::new_v4().simple());
        debug!(action = action.kind(), tx = %tx_hash, "Recorded ledger action");

        let status = match scripted {
            Some(Scripted::Fail(error)) => return Err(error),
            Some(Scripted::Revert(reason)) => ReceiptStatus::Reverted { reason },
            None => ReceiptStatus::Succeeded,
        };
        let created_id = match (&action, &status) {
            (LedgerAction::CreateProposal { .. }, ReceiptStatus::Succeeded) => {
                Some(EntityId::new(format!("0x{}", Uuid::new_v4().simple())))
            }
            _ => None,
        };
        let receipt = ActionReceipt {
            tx_hash,
            status,
            created_id,
        };

        if receipt.succeeded() {
            let hook = self.hook.lock().clone();
            if let Some(hook) = hook {
                hook(&action, &receipt);
            }
        }
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProposalRewards;
    use shared_types::Amount;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn create() -> LedgerAction {
        LedgerAction::CreateProposal {
            dao: EntityId::new("0xdao"),
            scheme: EntityId::new("0xscheme"),
            beneficiary: None,
            description_hash: None,
            rewards: ProposalRewards::default(),
            external_token: None,
            call_data: None,
            value: Amount::zero(),
        }
    }

    #[tokio::test]
    async fn test_create_reports_new_id() {
        let ledger = RecordingLedger::new();
        let receipt = ledger.submit(create()).await.unwrap();
        assert!(receipt.succeeded());
        assert!(receipt.created_id.is_some());
        assert_eq!(receipt.tx_hash.len(), 34);
        assert_eq!(ledger.count("create_proposal"), 1);
    }

    #[tokio::test]
    async fn test_script_is_consumed_in_order() {
        let ledger = RecordingLedger::new();
        ledger.fail_next(SyncError::Canceled);
        ledger.revert_next("out of gas");

        assert_eq!(ledger.submit(create()).await, Err(SyncError::Canceled));
        let reverted = ledger.submit(create()).await.unwrap();
        assert_eq!(
            reverted.status,
            ReceiptStatus::Reverted {
                reason: "out of gas".into()
            }
        );
        assert!(reverted.created_id.is_none());
        assert!(ledger.submit(create()).await.unwrap().succeeded());
        assert_eq!(ledger.submitted().len(), 3);
    }

    #[tokio::test]
    async fn test_hook_runs_only_on_success() {
        let ledger = RecordingLedger::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        ledger.on_submit(Arc::new(move |_: &LedgerAction, _: &ActionReceipt| {
            seen.fetch_add(1, Ordering::SeqCst);
        }));

        ledger.revert_next("nope");
        ledger.submit(create()).await.unwrap();
        ledger.submit(create()).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
