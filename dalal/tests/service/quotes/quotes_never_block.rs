use std::sync::Arc;
use std::time::{Duration, Instant};

use dalal::DalalError;
use dalal_mock::MockBehavior;

use crate::helpers::{UNIVERSE, eventually, harness, harness_with, quick_config};

#[tokio::test(flavor = "multi_thread")]
async fn read_returns_immediately_while_feed_hangs() {
    let mut cfg = quick_config();
    cfg.quotes.bulk_timeout = Duration::from_secs(60);
    let owned = harness_with(cfg);
    let h = &owned;
    h.feed.set_default(MockBehavior::Hang).await;

    let started = Instant::now();
    let first = h.dalal.quotes(false);
    assert!(started.elapsed() < Duration::from_millis(200));
    assert!(first.snapshot.is_empty());
    assert!(first.refresh_started);
    assert!(first.refreshing);

    // a second stale read neither waits nor starts another refresh
    let second = h.dalal.quotes(false);
    assert!(!second.refresh_started);
    assert!(second.refreshing);
    assert!(started.elapsed() < Duration::from_millis(400));

    assert!(eventually(Duration::from_secs(2), move || async move { h.feed.call_count().await == 1 }).await);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(h.feed.call_count().await, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn forced_refreshes_collapse_into_one() {
    let owned = harness();
    let h = &owned;
    h.feed
        .set_default(MockBehavior::Delay(
            Duration::from_millis(200),
            dalal_mock::fixtures::bars_for(&crate::helpers::tickers()),
        ))
        .await;

    let views: Vec<_> = (0..5).map(|_| h.dalal.quotes(true)).collect();
    assert_eq!(views.iter().filter(|v| v.refresh_started).count(), 1);

    assert!(eventually(Duration::from_secs(3), move || async move { !h.dalal.is_refreshing() }).await);
    assert_eq!(h.feed.call_count().await, 1);
    assert_eq!(h.dalal.quotes(false).snapshot.len(), UNIVERSE);
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_refresh_keeps_previous_snapshot() {
    let owned = harness();
    let h = &owned;
    assert_eq!(h.dalal.warmup().await, UNIVERSE);
    let before = h.dalal.quotes(false).snapshot;

    h.feed
        .set_default(MockBehavior::Fail(DalalError::upstream("mock-feed", "down")))
        .await;
    let view = h.dalal.quotes(true);
    assert!(view.refresh_started);
    assert!(Arc::ptr_eq(&view.snapshot, &before));

    assert!(eventually(Duration::from_secs(3), move || async move { !h.dalal.is_refreshing() }).await);
    let after = h.dalal.quotes(false).snapshot;
    assert!(Arc::ptr_eq(&after, &before));
    // warmup, then one bulk and three batches for the failed refresh
    assert_eq!(h.feed.call_count().await, 5);
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_warmup_leaves_empty_snapshot() {
    let h = harness();
    h.feed
        .set_default(MockBehavior::Fail(DalalError::upstream("mock-feed", "down")))
        .await;
    assert_eq!(h.dalal.warmup().await, 0);
    assert!(!h.dalal.is_refreshing());
    assert!(h.dalal.quote("RELIANCE").is_none());
}
