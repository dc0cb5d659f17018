use std::collections::HashSet;
use std::time::Duration;

use dalal::DalalError;
use dalal_mock::MockBehavior;
use dalal_mock::fixtures::bars_for;
use proptest::prelude::*;

use crate::helpers::{UNIVERSE, harness, harness_with, quick_config, tickers};

#[tokio::test]
async fn dense_bulk_result_is_accepted() {
    let h = harness();
    let all = tickers();
    h.feed
        .push_next(MockBehavior::Return(bars_for(&all[..20])))
        .await;

    assert_eq!(h.dalal.warmup().await, 20);
    let requests = h.feed.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0], all);
}

#[tokio::test]
async fn sparse_bulk_result_falls_back_to_batches() {
    let h = harness();
    let all = tickers();
    h.feed
        .push_next(MockBehavior::Return(bars_for(&all[..5])))
        .await;

    assert_eq!(h.dalal.warmup().await, UNIVERSE);
    let requests = h.feed.requests().await;
    assert_eq!(requests.len(), 4);
    let universe: HashSet<&String> = all.iter().collect();
    for batch in &requests[1..] {
        assert_eq!(batch.len(), 10);
        assert!(batch.iter().all(|t| universe.contains(t)));
    }
    let covered: HashSet<&String> = requests[1..].iter().flatten().collect();
    assert_eq!(covered, universe);
}

#[tokio::test(flavor = "multi_thread")]
async fn batches_merge_whatever_succeeds() {
    let mut cfg = quick_config();
    cfg.quotes.batch_timeout = Duration::from_millis(100);
    let h = harness_with(cfg);
    let all = tickers();
    h.feed
        .push_next(MockBehavior::Fail(DalalError::upstream("mock-feed", "bulk refused")))
        .await;
    h.feed.push_next(MockBehavior::Return(bars_for(&all))).await;
    h.feed.push_next(MockBehavior::Hang).await;

    assert_eq!(h.dalal.warmup().await, 20);
    let snapshot = h.dalal.quotes(false).snapshot;
    assert!(snapshot.get("RELIANCE").is_some());
    // second batch hung past its deadline
    assert!(snapshot.get("AXISBANK").is_none());
    assert!(snapshot.get("ADANIPORTS").is_some());
}

#[tokio::test(start_paused = true)]
async fn batches_are_spaced_by_the_pause() {
    let mut cfg = quick_config();
    cfg.quotes.batch_pause = Duration::from_millis(500);
    let h = harness_with(cfg);
    h.feed
        .push_next(MockBehavior::Fail(DalalError::upstream("mock-feed", "bulk refused")))
        .await;

    let started = tokio::time::Instant::now();
    assert_eq!(h.dalal.warmup().await, UNIVERSE);
    assert!(started.elapsed() >= Duration::from_millis(1000));
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 16, .. ProptestConfig::default() })]
    #[test]
    fn bulk_acceptance_follows_coverage(covered in 0usize..=UNIVERSE) {
        tokio_test::block_on(async move {
            let h = harness();
            let all = tickers();
            h.feed.push_next(MockBehavior::Return(bars_for(&all[..covered]))).await;

            let n = h.dalal.warmup().await;
            let calls = h.feed.call_count().await;
            if covered > 0 && covered * 2 >= UNIVERSE {
                assert_eq!(n, covered, "covered={covered}");
                assert_eq!(calls, 1, "covered={covered}");
            } else {
                assert_eq!(n, UNIVERSE, "covered={covered}");
                assert_eq!(calls, 4, "covered={covered}");
            }
            let symbols: HashSet<String> = h.dalal.registry().listings().iter().map(|l| l.symbol.clone()).collect();
            let snapshot = h.dalal.quotes(false).snapshot;
            assert!(snapshot.quotes().keys().all(|k| symbols.contains(k)));
        });
    }
}
