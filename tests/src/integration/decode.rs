//! # Decode Rejection
//!
//! A malformed record ends the subscription that decodes it, with an error,
//! and leaves sibling subscriptions on the same index running.

#[cfg(test)]
mod tests {
    use super::super::support::{self, world, PROPOSER};
    use futures::StreamExt;
    use gs_02_entities::{Dao, Proposal, ProposalStage};
    use serde_json::json;
    use shared_types::{QueryOptions, SyncError};
    use std::time::Duration;
    use tokio::time::timeout;

    fn vote(id: &str, proposal: Option<&str>) -> serde_json::Value {
        json!({
            "id": id,
            "voter": PROPOSER,
            "proposal": proposal.map(|p| json!({"id": p})),
            "dao": {"id": "0xdao"},
            "outcome": "Pass",
            "amount": "10",
            "createdAt": "1100"
        })
    }

    #[tokio::test]
    async fn test_malformed_vote_ends_list_subscription() {
        let world = world();
        world.index.upsert("daos", support::dao());
        world.index.upsert("votes", vote("0xv1", Some("0xp1")));
        world.index.upsert("votes", vote("0xv2", None));
        let dao = Dao::from_id(&world.ctx, "0xdao");

        let mut votes = dao.votes(QueryOptions::new());
        let first = timeout(Duration::from_secs(1), votes.next())
            .await
            .expect("timeout");
        assert_eq!(
            first,
            Some(Err(SyncError::invalid("vote", "missing proposal.id")))
        );
        let end = timeout(Duration::from_secs(1), votes.next())
            .await
            .expect("subscription did not end after the decode error");
        assert!(end.is_none());
    }

    #[tokio::test]
    async fn test_sibling_subscription_survives() {
        let world = world();
        world
            .index
            .upsert("proposals", support::proposal("0xp1", "Queued"));
        let dao = Dao::from_id(&world.ctx, "0xdao");

        let mut proposals = dao.proposals(QueryOptions::new());
        let listed = proposals.next().await.unwrap().unwrap();
        assert_eq!(listed.len(), 1);

        world.index.upsert("votes", vote("0xv2", None));
        let mut votes = dao.votes(QueryOptions::new());
        assert!(matches!(
            votes.next().await,
            Some(Err(SyncError::Invalid { .. }))
        ));

        world
            .index
            .upsert("proposals", support::proposal("0xp2", "Queued"));
        let grown = loop {
            let batch = timeout(Duration::from_secs(1), proposals.next())
                .await
                .expect("timeout")
                .unwrap()
                .unwrap();
            if batch.len() == 2 {
                break batch;
            }
        };
        assert!(grown
            .iter()
            .all(|p| p.cached_state().is_some_and(|s| s.stage == ProposalStage::Queued)));
    }

    #[tokio::test]
    async fn test_unknown_stage_ends_record_subscription() {
        let world = world();
        world
            .index
            .upsert("proposals", support::proposal("0xp1", "Queued"));
        world
            .index
            .upsert("proposals", support::proposal("0xp2", "Queued"));
        let broken = Proposal::from_id(&world.ctx, "0xp1");
        let healthy = Proposal::from_id(&world.ctx, "0xp2");
        let mut broken_states = broken.state();
        let mut healthy_states = healthy.state();
        broken_states.next().await.unwrap().unwrap();
        healthy_states.next().await.unwrap().unwrap();

        world
            .index
            .update("proposals", "0xp1", json!({"stage": "Limbo"}));
        let failure = loop {
            match timeout(Duration::from_secs(1), broken_states.next())
                .await
                .expect("timeout")
            {
                Some(Ok(_)) => continue,
                Some(Err(e)) => break e,
                None => panic!("ended without error"),
            }
        };
        assert_eq!(failure, SyncError::invalid("proposal", "unknown stage Limbo"));

        world
            .index
            .update("proposals", "0xp2", json!({"votesFor": "5"}));
        let updated = loop {
            let state = timeout(Duration::from_secs(1), healthy_states.next())
                .await
                .expect("timeout")
                .unwrap()
                .unwrap()
                .unwrap();
            if !state.votes_for.is_zero() {
                break state;
            }
        };
        assert_eq!(updated.stage, ProposalStage::Queued);
    }
}
