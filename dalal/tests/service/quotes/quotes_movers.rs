use std::collections::HashMap;
use std::time::{Duration, Instant};

use dalal::DailyBar;
use dalal_mock::MockBehavior;
use dalal_mock::fixtures::epoch;

use crate::helpers::{UNIVERSE, harness, tickers};

/// Bars where the `i`-th ticker moves `i - 15` percent on a 100 close.
fn spread_bars() -> HashMap<String, Vec<DailyBar>> {
    let next = dalal_core::business_days_after(epoch(), 1)[0];
    tickers()
        .into_iter()
        .enumerate()
        .map(|(i, t)| {
            let close = 100.0 + i as f64 - 15.0;
            let bar = |date, c: f64| DailyBar {
                date,
                open: c - 0.5,
                high: c + 1.0,
                low: c - 1.0,
                close: c,
                volume: Some(5_000 + i as u64),
            };
            (t, vec![bar(epoch(), 100.0), bar(next, close)])
        })
        .collect()
}

#[tokio::test]
async fn movers_rank_by_percent_change() {
    let h = harness();
    h.feed.set_default(MockBehavior::Return(spread_bars())).await;
    assert_eq!(h.dalal.warmup().await, UNIVERSE);

    let (gainers, losers) = h.dalal.market_movers(3);
    let up: Vec<&str> = gainers.iter().map(|q| q.symbol.as_str()).collect();
    let down: Vec<&str> = losers.iter().map(|q| q.symbol.as_str()).collect();
    assert_eq!(up, vec!["ADANIPORTS", "TECHM", "ULTRACEMCO"]);
    assert_eq!(down, vec!["RELIANCE", "TCS", "HDFCBANK"]);

    let top = &gainers[0];
    assert!((top.change_pct - 14.0).abs() < 1e-9);
    assert_eq!(top.name, "Adani Ports & SEZ");
    assert_eq!(top.sector, "Services");
    assert_eq!(top.open, Some(113.5));
    assert_eq!(top.high, Some(115.0));
    assert_eq!(top.low, Some(113.0));
    assert_eq!(top.volume, 5_029);
    assert!((losers[0].change_pct + 15.0).abs() < 1e-9);
}

#[tokio::test]
async fn movers_are_capped_by_the_snapshot() {
    let h = harness();
    h.feed.set_default(MockBehavior::Return(spread_bars())).await;
    h.dalal.warmup().await;

    let (gainers, losers) = h.dalal.market_movers(50);
    assert_eq!(gainers.len(), UNIVERSE);
    assert_eq!(losers.len(), UNIVERSE);
    assert!(gainers.windows(2).all(|w| w[0].change_pct >= w[1].change_pct));
    assert!(losers.windows(2).all(|w| w[0].change_pct <= w[1].change_pct));
    assert_eq!(h.dalal.market_movers(0), (Vec::new(), Vec::new()));
}

#[tokio::test(flavor = "multi_thread")]
async fn movers_never_wait_on_the_feed() {
    let h = harness();
    h.feed.set_default(MockBehavior::Hang).await;

    let started = Instant::now();
    let (gainers, losers) = h.dalal.market_movers(10);
    assert!(started.elapsed() < Duration::from_millis(200));
    assert!(gainers.is_empty() && losers.is_empty());
    assert!(h.dalal.is_refreshing());
}
