//! # Governance-Sync Benchmarks
//!
//! Hot paths that run once per index emission:
//!
//! | Path | Runs on |
//! |------|---------|
//! | Query rendering | every search / subscription |
//! | Proposal decode | every record snapshot |
//! | Lifecycle validation | every monitored snapshot |
//! | Confidence | every decode and threshold check |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use gs_01_index_port::{IndexPort, InMemoryIndex};
use gs_02_entities::{ClientConfig, Context, EntityKind, ProposalKind, ProposalStage};
use gs_03_governance::domain::{confidence, validate_transition};
use gs_03_governance::ProtocolParams;
use serde_json::{json, Value};
use shared_types::{to_wei, OrderDirection, QueryOptions, U256};
use std::sync::Arc;

fn context() -> Context {
    let port = Arc::new(IndexPort::new(Arc::new(InMemoryIndex::new())));
    Context::builder(ClientConfig::default(), port).build()
}

fn record(stage: &str, votes_for: u64, extra: Value) -> Value {
    let mut raw = json!({
        "id": "0xp1",
        "dao": {"id": "0xdao"},
        "scheme": {"id": "0xscheme"},
        "queue": {"id": "0xqueue"},
        "proposer": "0x90f8bf6a479f320ead074411a4b0e7944ea8c9c1",
        "stage": stage,
        "createdAt": "1000",
        "votesFor": votes_for.to_string(),
        "votesAgainst": "100",
        "stakesFor": "300",
        "stakesAgainst": "100",
        "ethReward": "10",
        "nativeTokenReward": "10",
        "externalTokenReward": "0",
        "reputationReward": "10",
        "proposingRepReward": "5"
    });
    if let (Some(target), Some(fields)) = (raw.as_object_mut(), extra.as_object()) {
        for (key, value) in fields {
            target.insert(key.clone(), value.clone());
        }
    }
    raw
}

// ============================================================================
// Query rendering
// ============================================================================

fn bench_query_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("gs-01-query-build");
    let options = QueryOptions::new()
        .where_eq("dao", "0xDAO")
        .where_eq("stage", "Boosted")
        .first(50)
        .skip(100)
        .order_by("createdAt", OrderDirection::Desc);

    group.bench_function("proposals_filtered", |b| {
        b.iter(|| black_box(ProposalKind::QUERY.build(black_box(&options)).is_ok()))
    });
    group.finish();
}

// ============================================================================
// Decoding
// ============================================================================

fn bench_proposal_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("gs-02-decode");
    let ctx = context();
    let raw = record("Boosted", 500, json!({"boostedAt": "1200"}));

    group.bench_function("proposal", |b| {
        b.iter(|| black_box(ProposalKind::decode(&ctx, black_box(&raw)).is_ok()))
    });
    group.finish();
}

// ============================================================================
// Lifecycle
// ============================================================================

fn bench_lifecycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("gs-03-lifecycle");
    let ctx = context();
    let params = ProtocolParams::default();

    for len in [10u64, 100, 1_000] {
        let snapshots: Vec<_> = (0..len)
            .filter_map(|i| {
                ProposalKind::decode(&ctx, &record("Boosted", 100 + i, json!({"boostedAt": "1200"})))
                    .ok()
            })
            .collect();
        assert!(snapshots.iter().all(|s| s.stage == ProposalStage::Boosted));

        group.throughput(Throughput::Elements(len));
        group.bench_with_input(BenchmarkId::new("validate_sequence", len), &snapshots, |b, seq| {
            b.iter(|| {
                seq.windows(2)
                    .all(|pair| validate_transition(&pair[0], &pair[1], &params).is_ok())
            })
        });
    }

    let scale = U256::from(1u64 << 40);
    group.bench_function("confidence_wei", |b| {
        b.iter(|| confidence(black_box(to_wei(3_000)), black_box(to_wei(7)), scale))
    });
    group.finish();
}

criterion_group!(benches, bench_query_build, bench_proposal_decode, bench_lifecycle);
criterion_main!(benches);
