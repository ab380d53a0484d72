//! # Indexation and Cache
//!
//! Absent-vs-found semantics of `fetch_state` and the per-entity cache.

#[cfg(test)]
mod tests {
    use super::super::support::{self, world};
    use gs_01_index_port::{IndexPort, ScriptedIndex};
    use gs_02_entities::{ClientConfig, Context, FetchOptions, Proposal, ProposalStage};
    use serde_json::json;
    use shared_bus::CancelSource;
    use shared_types::SyncError;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    fn scripted(index: ScriptedIndex) -> Context {
        Context::builder(ClientConfig::default(), Arc::new(IndexPort::new(Arc::new(index))))
            .build()
    }

    #[tokio::test]
    async fn test_absent_id_is_not_indexed() {
        let ctx = scripted(ScriptedIndex::new());
        let proposal = Proposal::from_id(&ctx, "0xnever");

        let result = proposal.fetch_state(FetchOptions::new()).await;
        assert_eq!(
            result.err(),
            Some(SyncError::not_indexed("proposal", "0xnever"))
        );
        assert!(proposal.cached_state().is_none());
    }

    #[tokio::test]
    async fn test_wait_for_indexation_skips_absent_snapshots() {
        let index = ScriptedIndex::new().with_pacing(Duration::from_millis(5));
        index.script_record(
            "proposals",
            "0xp1",
            vec![
                Ok(None),
                Ok(None),
                Ok(Some(support::proposal("0xp1", "Queued"))),
            ],
        );
        let ctx = scripted(index);
        let proposal = Proposal::from_id(&ctx, "0xp1");

        let state = timeout(
            Duration::from_secs(1),
            proposal.fetch_state(FetchOptions::new().wait_for_indexation()),
        )
        .await
        .expect("timeout")
        .unwrap();
        assert_eq!(state.stage, ProposalStage::Queued);
        assert!(Arc::ptr_eq(&proposal.cached_state().unwrap(), &state));
    }

    #[tokio::test]
    async fn test_cancel_releases_pending_wait() {
        let ctx = scripted(ScriptedIndex::new());
        let proposal = Proposal::from_id(&ctx, "0xnever");
        let source = CancelSource::new();
        let options = FetchOptions::new()
            .wait_for_indexation()
            .cancel_on(source.signal());

        let waiter = {
            let proposal = proposal.clone();
            tokio::spawn(async move { proposal.fetch_state(options).await })
        };
        tokio::task::yield_now().await;
        source.cancel();

        let result = timeout(Duration::from_secs(1), waiter)
            .await
            .expect("timeout")
            .expect("join");
        assert_eq!(result.err(), Some(SyncError::Canceled));
    }

    #[tokio::test]
    async fn test_cache_is_stable_until_refetch() {
        let world = world();
        world
            .index
            .upsert("proposals", support::proposal("0xp1", "Queued"));
        let proposal = Proposal::from_id(&world.ctx, "0xp1");

        let first = proposal.fetch_state(FetchOptions::new()).await.unwrap();
        let issued = world.index.queries_issued();
        let second = proposal.fetch_state(FetchOptions::new()).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(world.index.queries_issued(), issued);

        let third = proposal
            .fetch_state(FetchOptions::new().refetch())
            .await
            .unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(*first, *third);
        assert!(world.index.queries_issued() > issued);
    }

    #[tokio::test]
    async fn test_new_state_is_a_new_object() {
        let world = world();
        world
            .index
            .upsert("proposals", support::proposal("0xp1", "Queued"));
        let proposal = Proposal::from_id(&world.ctx, "0xp1");
        let held = proposal.fetch_state(FetchOptions::new()).await.unwrap();

        world
            .index
            .update("proposals", "0xp1", json!({"votesFor": "42"}));
        let fresh = proposal
            .fetch_state(FetchOptions::new().refetch())
            .await
            .unwrap();

        assert!(held.votes_for.is_zero());
        assert_eq!(fresh.votes_for.as_u64(), 42);
        assert!(Arc::ptr_eq(&proposal.cached_state().unwrap(), &fresh));
    }

    #[tokio::test]
    async fn test_handles_for_one_id_cache_independently() {
        let world = world();
        world
            .index
            .upsert("proposals", support::proposal("0xp1", "Queued"));
        let a = Proposal::from_id(&world.ctx, "0xP1");
        let b = Proposal::from_id(&world.ctx, "0xp1");
        assert_eq!(a, b);

        a.fetch_state(FetchOptions::new()).await.unwrap();
        assert!(a.cached_state().is_some());
        assert!(b.cached_state().is_none());
    }
}
