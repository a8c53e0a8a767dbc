use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::json;

use revenue_attest::config::IdempotencyConfig;
use revenue_attest::idempotency::{IdempotencyCache, IdempotencyEntry, IdempotencyKey, Replay};
use revenue_attest::test_utils::{sample_records, TestHarness};

#[tokio::test]
async fn test_replay_skips_second_submission() {
    let harness = TestHarness::new(sample_records());
    let cache = IdempotencyCache::default();
    let key = IdempotencyKey::new("attestations", "user-1", "req-1").unwrap();

    let run = || async {
        match harness.pipeline.submit("biz-1", "2025-Q1").await {
            Ok(result) => IdempotencyEntry {
                status: 201,
                body: serde_json::to_value(&result).unwrap(),
            },
            Err(err) => IdempotencyEntry {
                status: 422,
                body: json!({ "error": err.to_string() }),
            },
        }
    };

    let first = cache.replay_or_run(&key, run).await;
    let second = cache.replay_or_run(&key, run).await;

    assert!(!first.is_hit());
    assert!(second.is_hit());
    assert_eq!(first.entry(), second.entry());
    assert_eq!(first.entry().status, 201);
    assert_eq!(harness.ledger.submit_calls(), 1);
}

#[tokio::test]
async fn test_keys_are_scoped_per_identity() {
    let cache = IdempotencyCache::default();
    let calls = AtomicUsize::new(0);
    let op = || async {
        calls.fetch_add(1, Ordering::SeqCst);
        IdempotencyEntry {
            status: 200,
            body: json!({}),
        }
    };

    let alice = IdempotencyKey::new("attestations", "alice", "same-token").unwrap();
    let bob = IdempotencyKey::new("attestations", "bob", "same-token").unwrap();
    let other_scope = IdempotencyKey::new("revocations", "alice", "same-token").unwrap();

    assert!(matches!(cache.replay_or_run(&alice, op).await, Replay::Fresh(_)));
    assert!(matches!(cache.replay_or_run(&bob, op).await, Replay::Fresh(_)));
    assert!(matches!(cache.replay_or_run(&other_scope, op).await, Replay::Fresh(_)));
    assert!(matches!(cache.replay_or_run(&alice, op).await, Replay::Hit(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_operation_reruns_after_ttl() {
    let cache = IdempotencyCache::from_config(&IdempotencyConfig { ttl_seconds: 10 });
    let key = IdempotencyKey::new("attestations", "user-1", "req-1").unwrap();
    let op = || async {
        IdempotencyEntry {
            status: 200,
            body: json!({ "ok": true }),
        }
    };

    assert!(!cache.replay_or_run(&key, op).await.is_hit());
    tokio::time::advance(Duration::from_secs(5)).await;
    assert!(cache.replay_or_run(&key, op).await.is_hit());
    tokio::time::advance(Duration::from_secs(6)).await;
    assert!(!cache.replay_or_run(&key, op).await.is_hit());
}

#[test]
fn test_entry_wire_shape() {
    let entry = IdempotencyEntry {
        status: 409,
        body: json!({ "error": "duplicate" }),
    };
    assert_eq!(
        serde_json::to_value(&entry).unwrap(),
        json!({ "status": 409, "body": { "error": "duplicate" } })
    );
}
