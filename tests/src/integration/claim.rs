//! # Claim Scenario
//!
//! Rewards of an executed proposal are redeemed twice. The ledger pays out
//! once; the proposal snapshot is the same before and after both claims.

#[cfg(test)]
mod tests {
    use super::super::support::{self, address, world, World, HOLDER, TOKEN};
    use futures::StreamExt;
    use gs_02_entities::{
        ActionReceipt, FetchOptions, LedgerAction, Proposal, ProposalStage, Token,
    };
    use gs_03_governance::GovernanceService;
    use serde_json::json;
    use shared_types::{Amount, SyncError};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    fn executed(world: &World) -> Proposal {
        let mut record = support::proposal("0xp1", "Executed");
        record["executedAt"] = json!("2500");
        record["boostedAt"] = json!("1300");
        record["votesFor"] = json!("600");
        record["votesAgainst"] = json!("100");
        record["winningOutcome"] = json!("Pass");
        world.index.upsert("proposals", record);
        Proposal::from_id(&world.ctx, "0xp1")
    }

    /// Pay the native-token reward on the first redeem only.
    fn pay_once(world: &World) {
        let balances = Arc::clone(&world.balances);
        let paid = Arc::new(AtomicBool::new(false));
        world
            .ledger
            .on_submit(Arc::new(move |action: &LedgerAction, _: &ActionReceipt| {
                if let LedgerAction::Redeem { beneficiary, .. } = action {
                    if !paid.swap(true, Ordering::SeqCst) {
                        balances.set_balance(&address(TOKEN), beneficiary, Amount::from(250u64));
                    }
                }
            }));
    }

    #[tokio::test]
    async fn test_claiming_twice_pays_once_and_keeps_proposal() {
        let world = world();
        pay_once(&world);
        let proposal = executed(&world);
        let service = GovernanceService::new(world.ctx.clone());
        let token = Token::at(&world.ctx, TOKEN).unwrap();
        let mut balance = token.balance_of(&address(HOLDER));

        let before = proposal.fetch_state(FetchOptions::new()).await.unwrap();
        assert_eq!(balance.next().await, Some(Ok(None)));

        service.claim_rewards(&proposal, None).await.unwrap();
        service.claim_rewards(&proposal, None).await.unwrap();

        let paid = timeout(Duration::from_secs(1), balance.next())
            .await
            .expect("timeout");
        assert_eq!(paid, Some(Ok(Some(Amount::from(250u64)))));

        let after = proposal
            .fetch_state(FetchOptions::new().refetch())
            .await
            .unwrap();
        assert_eq!(after.stage, ProposalStage::Executed);
        assert_eq!(after.executed_at, before.executed_at);
        assert_eq!(after.votes_for, before.votes_for);
        assert_eq!(after.votes_against, before.votes_against);
        assert_eq!(after.rewards, before.rewards);
        assert_eq!(world.ledger.count("redeem"), 2);
    }

    #[tokio::test]
    async fn test_claim_on_open_proposal_is_refused() {
        let world = world();
        world
            .index
            .upsert("proposals", support::proposal("0xp2", "Queued"));
        let proposal = Proposal::from_id(&world.ctx, "0xp2");
        let service = GovernanceService::new(world.ctx.clone());

        let result = service.claim_rewards(&proposal, None).await;
        assert!(matches!(result, Err(SyncError::ActionNotAllowed { .. })));
        assert_eq!(world.ledger.count("redeem"), 0);
    }

    #[tokio::test]
    async fn test_reverted_claim_is_rejected() {
        let world = world();
        let proposal = executed(&world);
        let service = GovernanceService::new(world.ctx.clone());

        world.ledger.revert_next("nothing to redeem");
        let result = service.claim_rewards(&proposal, None).await;
        assert!(matches!(
            result,
            Err(SyncError::ActionRejected { ref reason, .. }) if reason.contains("nothing to redeem")
        ));
    }
}
