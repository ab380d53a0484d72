//! # Boosting Scenario
//!
//! A queued proposal is staked past its queue's boosting threshold. The
//! simulated indexer reacts to the ledger the way the protocol does, and the
//! client observes `PreBoosted` and then `Boosted` purely from snapshots.
//!
//! ```text
//! stake ──→ RecordingLedger ──hook──→ InMemoryIndex (stakesFor, PreBoosted, boostedAt)
//!                                         │
//!             wait_for_stage(PreBoosted) ←┘
//! pre-boost delay ──→ InMemoryIndex (Boosted)
//!             wait_for_stage(Boosted) ←───┘
//! ```

#[cfg(test)]
mod tests {
    use super::super::support::{self, world, World};
    use futures::StreamExt;
    use gs_02_entities::{
        ActionReceipt, FetchOptions, LedgerAction, Proposal, ProposalOutcome, ProposalStage,
        ProposalState,
    };
    use gs_03_governance::domain::rules;
    use gs_03_governance::{GovernanceService, LifecycleMonitor};
    use serde_json::json;
    use shared_bus::LiveStream;
    use shared_types::{Amount, SyncError, SyncResult};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    const STAKE_AT: u64 = 1_200;

    /// Index a stake for `Pass` together with the pre-boost the voting
    /// machine records in the same block.
    fn index_stakes(world: &World) {
        let index = Arc::clone(&world.index);
        world
            .ledger
            .on_submit(Arc::new(move |action: &LedgerAction, _: &ActionReceipt| {
                if let LedgerAction::Stake {
                    proposal,
                    outcome: ProposalOutcome::Pass,
                    amount,
                    ..
                } = action
                {
                    index.update(
                        "proposals",
                        proposal.as_str(),
                        json!({
                            "stakesFor": amount.to_string(),
                            "stage": "PreBoosted",
                            "preBoostedAt": STAKE_AT.to_string(),
                            "boostedAt": STAKE_AT.to_string(),
                        }),
                    );
                }
            }));
    }

    async fn next_snapshot(
        stream: &mut LiveStream<Option<Arc<ProposalState>>>,
    ) -> SyncResult<Option<Arc<ProposalState>>> {
        timeout(Duration::from_secs(1), stream.next())
            .await
            .expect("timeout")
            .expect("monitor ended")
    }

    fn setup() -> (World, Proposal) {
        let world = world();
        world.index.upsert("daos", support::dao());
        world.index.upsert("queues", support::queue());
        let mut record = support::proposal("0xp1", "Queued");
        record["stakesAgainst"] = json!("100");
        world.index.upsert("proposals", record);
        index_stakes(&world);
        let proposal = Proposal::from_id(&world.ctx, "0xp1");
        (world, proposal)
    }

    #[tokio::test]
    async fn test_stake_past_threshold_boosts_proposal() {
        let (world, proposal) = setup();
        let service = GovernanceService::new(world.ctx.clone());
        let monitor = LifecycleMonitor::for_proposal(&proposal).await.unwrap();
        let params = monitor.params().clone();
        let mut monitored = monitor.watch(&proposal);

        let before = next_snapshot(&mut monitored).await.unwrap().unwrap();
        assert_eq!(before.stage, ProposalStage::Queued);
        assert!(!rules::meets_boosting_threshold(&before, &params));

        // 200 for / 100 against is a confidence of exactly 2.0
        service
            .stake(&proposal, ProposalOutcome::Pass, Amount::from(200u64))
            .await
            .unwrap();

        let pre = timeout(
            Duration::from_secs(1),
            service.wait_for_stage(&proposal, ProposalStage::PreBoosted, None),
        )
        .await
        .expect("timeout")
        .unwrap();
        assert_eq!(pre.boosted_at, Some(STAKE_AT));
        assert!(rules::meets_boosting_threshold(&pre, &params));
        assert_eq!(
            rules::expected_stage_for_confidence(ProposalStage::Queued, true),
            pre.stage
        );

        // The pre-boost delay elapses and the index confirms the boost.
        let boosted_at = STAKE_AT + params.pre_boost_delay;
        world.index.update(
            "proposals",
            "0xp1",
            json!({"stage": "Boosted", "boostedAt": boosted_at.to_string()}),
        );
        let boosted = timeout(
            Duration::from_secs(1),
            service.wait_for_stage(&proposal, ProposalStage::Boosted, None),
        )
        .await
        .expect("timeout")
        .unwrap();
        assert_eq!(boosted.boosted_at, Some(boosted_at));
        assert_eq!(
            rules::voting_deadline(&boosted, &params),
            Some(boosted_at + params.boosted_vote_period_limit)
        );

        // Every snapshot along the way satisfied the lifecycle rules.
        loop {
            let state = next_snapshot(&mut monitored).await.unwrap();
            if state.is_some_and(|s| s.stage == ProposalStage::Boosted) {
                break;
            }
        }
    }

    #[tokio::test]
    async fn test_stake_below_threshold_leaves_proposal_queued() {
        let (world, proposal) = setup();
        let service = GovernanceService::new(world.ctx.clone());
        let monitor = LifecycleMonitor::for_proposal(&proposal).await.unwrap();

        // A stake against never reaches the indexer hook above.
        service
            .stake(&proposal, ProposalOutcome::Fail, Amount::from(50u64))
            .await
            .unwrap();
        let state = proposal
            .fetch_state(FetchOptions::new().refetch())
            .await
            .unwrap();
        assert_eq!(state.stage, ProposalStage::Queued);
        assert!(!rules::meets_boosting_threshold(&state, monitor.params()));
        assert_eq!(world.ledger.count("stake"), 1);
    }

    #[tokio::test]
    async fn test_boosted_proposal_refuses_stakes() {
        let (world, proposal) = setup();
        world.index.update(
            "proposals",
            "0xp1",
            json!({"stage": "Boosted", "boostedAt": "1300"}),
        );
        let service = GovernanceService::new(world.ctx.clone());

        let result = service
            .stake(&proposal, ProposalOutcome::Pass, Amount::from(10u64))
            .await;
        assert!(matches!(result, Err(SyncError::ActionNotAllowed { .. })));
        assert_eq!(world.ledger.count("stake"), 0);
    }
}
