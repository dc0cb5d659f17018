use dalal::{CacheTier, DalalError, PricePoint};
use dalal_mock::MockBehavior;
use dalal_mock::fixtures::{random_walk, trending_series};

use crate::helpers::{INFY, RELIANCE, TCS, harness};

const HDFCBANK: &str = "HDFCBANK";
const WIPRO: &str = "WIPRO";

/// A seeded random walk tilted by `drift` per day.
fn drifting(n: usize, seed: u64, drift: f64) -> Vec<PricePoint> {
    random_walk(n, 100.0, seed)
        .into_iter()
        .enumerate()
        .map(|(i, p)| PricePoint::new(p.date, p.price * (1.0 + drift).powi(i as i32)))
        .collect()
}

async fn seed_universe(h: &crate::helpers::Harness) {
    h.series
        .set_series(HDFCBANK, MockBehavior::Return(drifting(300, 1, 0.004)))
        .await;
    h.series
        .set_series(RELIANCE, MockBehavior::Return(drifting(300, 2, 0.0)))
        .await;
    h.series
        .set_series(WIPRO, MockBehavior::Return(drifting(300, 3, -0.004)))
        .await;
    h.series
        .set_series(TCS, MockBehavior::Return(trending_series(80, 3000.0, 0.001)))
        .await;
    h.series
        .set_series(INFY, MockBehavior::Fail(DalalError::upstream("mock-series", "gone")))
        .await;
}

#[tokio::test]
async fn rankings_order_by_sharpe_and_skip_thin_histories() {
    let h = harness();
    seed_universe(&h).await;

    let ranked = h.dalal.risk_rankings().await;
    let symbols: Vec<&str> = ranked.iter().map(|m| m.symbol.as_str()).collect();
    assert_eq!(symbols, vec![HDFCBANK, RELIANCE, WIPRO]);
    assert!(ranked.windows(2).all(|w| w[0].sharpe >= w[1].sharpe));

    let best = &ranked[0];
    assert_eq!(best.name, "HDFC Bank");
    assert_eq!(best.sector, "Finance");
    assert!(best.annual_return_pct > 0.0);
    assert!(best.volatility_pct > 0.0);
    assert!(ranked[2].annual_return_pct < 0.0);

    // every listing is asked once
    assert_eq!(h.series.total_calls().await, h.dalal.registry().len());
}

#[tokio::test(flavor = "multi_thread")]
async fn prewarm_fills_the_cache_for_the_best_ranked() {
    let h = harness();
    seed_universe(&h).await;

    h.dalal.prewarm_top(2).await.expect("prewarm task");

    assert_eq!(h.dalal.forecast_status(HDFCBANK).await.tier, CacheTier::Fast);
    assert_eq!(h.dalal.forecast_status(RELIANCE).await.tier, CacheTier::Fast);
    assert_eq!(h.dalal.forecast_status(WIPRO).await.tier, CacheTier::None);
    // one call for the rankings, one for the forecast
    assert_eq!(h.series.calls(HDFCBANK).await, 2);
    assert_eq!(h.series.calls(WIPRO).await, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn prewarm_skips_symbols_already_cached() {
    let h = harness();
    seed_universe(&h).await;
    let before = h.dalal.forecast(HDFCBANK).await;
    assert!(before.ready().is_some());

    h.dalal.prewarm_top(1).await.expect("prewarm task");

    let after = h.dalal.forecast(HDFCBANK).await;
    assert!(std::sync::Arc::ptr_eq(
        before.ready().expect("ready"),
        after.ready().expect("ready")
    ));
    assert_eq!(h.series.calls(HDFCBANK).await, 2);
    assert_eq!(h.dalal.forecast_status(RELIANCE).await.tier, CacheTier::None);
}
