use std::sync::Arc;
use std::time::Duration;

use crate::helpers::{UNIVERSE, harness_with, quick_config};

#[tokio::test(start_paused = true)]
async fn stale_snapshot_triggers_background_refresh() {
    let mut cfg = quick_config();
    cfg.quotes.ttl = Duration::from_secs(300);
    let h = harness_with(cfg);

    assert_eq!(h.dalal.warmup().await, UNIVERSE);
    let fresh = h.dalal.quotes(false);
    assert!(!fresh.refresh_started);
    assert!(!fresh.refreshing);

    tokio::time::advance(Duration::from_secs(301)).await;
    let stale = h.dalal.quotes(false);
    assert!(stale.refresh_started);
    assert!(Arc::ptr_eq(&stale.snapshot, &fresh.snapshot));

    while h.dalal.is_refreshing() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    let replaced = h.dalal.quotes(false);
    assert!(!replaced.refresh_started);
    assert!(!Arc::ptr_eq(&replaced.snapshot, &fresh.snapshot));
    assert_eq!(replaced.snapshot.len(), UNIVERSE);
    assert_eq!(h.feed.call_count().await, 2);
}

#[tokio::test]
async fn quote_resolves_aliases_and_tickers() {
    let h = harness_with(quick_config());
    h.dalal.warmup().await;

    for spelling in ["RELIANCE", "reliance", "RELIANCE.NS", "OILGAS_RELIANCE"] {
        let q = h.dalal.quote(spelling).expect("quote");
        assert_eq!(q.symbol, "RELIANCE");
        assert_eq!(q.venue_ticker, "RELIANCE.NS");
        assert!((q.last - 100.0).abs() < 1e-9);
        assert!((q.previous_close - 99.0).abs() < 1e-9);
    }
    let mm = h.dalal.quote("M&M.NS").expect("quote");
    assert_eq!(mm.symbol, "MM");
    assert!(h.dalal.quote("NOT-LISTED").is_none());
}

#[test]
fn reads_outside_a_runtime_return_the_snapshot() {
    let h = harness_with(quick_config());
    let view = h.dalal.quotes(true);
    assert!(view.snapshot.is_empty());
    assert!(!view.refresh_started);
    assert!(!view.refreshing);
}
