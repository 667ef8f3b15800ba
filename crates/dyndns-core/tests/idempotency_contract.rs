//! Contract test: idempotence fast path and first-run behavior
//!
//! Constraints verified:
//! - An unchanged IP makes zero provider calls and leaves state untouched
//! - A first run (no persisted IP) applies and commits the detected IP
//! - A failed state read degrades to first-run semantics instead of
//!   aborting the cycle

mod common;

use common::*;
use dyndns_core::CycleOutcome;

#[tokio::test]
async fn unchanged_ip_makes_no_provider_calls() {
    let resolver = MockResolver::returning("10.0.0.1");
    let updater = MockUpdater::new();
    let store = MockStore::with_ip("10.0.0.1");

    let engine = engine_with(&resolver, &updater, &store, apex_and_www("example.com"));
    let outcome = engine.run_cycle().await;

    assert_eq!(
        outcome,
        CycleOutcome::Unchanged {
            ip: "10.0.0.1".parse().unwrap()
        }
    );
    assert_eq!(updater.call_count(), 0, "fast path must not touch the provider");
    assert_eq!(store.write_count(), 0, "fast path must not rewrite state");
}

#[tokio::test]
async fn first_run_commits_detected_ip() {
    let resolver = MockResolver::returning("1.2.3.4");
    let updater = MockUpdater::new();
    let store = MockStore::empty();

    let engine = engine_with(&resolver, &updater, &store, apex_and_www("example.com"));
    let outcome = engine.run_cycle().await;

    assert_eq!(
        outcome,
        CycleOutcome::Applied {
            ip: "1.2.3.4".parse().unwrap()
        }
    );
    assert_eq!(updater.call_count(), 2);
    assert_eq!(store.value(), Some("1.2.3.4".parse().unwrap()));
}

#[tokio::test]
async fn store_read_failure_degrades_to_first_run() {
    let resolver = MockResolver::returning("1.2.3.4");
    let updater = MockUpdater::new();
    let store = MockStore::with_ip("1.2.3.4").failing_reads();

    let engine = engine_with(&resolver, &updater, &store, apex_and_www("example.com"));
    let outcome = engine.run_cycle().await;

    // The stored value is unreadable, so the engine must assume a change
    // and re-apply; idempotent upserts make the repeat harmless.
    assert_eq!(
        outcome,
        CycleOutcome::Applied {
            ip: "1.2.3.4".parse().unwrap()
        }
    );
    assert_eq!(updater.call_count(), 2);
}

#[tokio::test]
async fn consecutive_cycles_settle_after_apply() {
    let resolver = MockResolver::returning("4.5.6.7");
    let updater = MockUpdater::new();
    let store = MockStore::with_ip("1.1.1.1");

    let engine = engine_with(&resolver, &updater, &store, apex_and_www("example.com"));

    // First cycle applies the change...
    assert!(matches!(engine.run_cycle().await, CycleOutcome::Applied { .. }));
    assert_eq!(updater.call_count(), 2);

    // ...and the second takes the fast path.
    assert!(matches!(engine.run_cycle().await, CycleOutcome::Unchanged { .. }));
    assert_eq!(updater.call_count(), 2, "second cycle made provider calls");
}
