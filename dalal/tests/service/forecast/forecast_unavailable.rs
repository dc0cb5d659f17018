use std::time::Duration;

use dalal::{CacheTier, DalalError, ForecastOutcome};
use dalal_cache::DurableTier;
use dalal_mock::MockBehavior;
use dalal_mock::fixtures::trending_series;

use crate::helpers::{INFY, TCS, harness, harness_with, quick_config};

#[tokio::test]
async fn short_history_is_unavailable_and_not_cached() {
    let h = harness();
    h.series
        .set_series(INFY, MockBehavior::Return(trending_series(40, 1500.0, 0.001)))
        .await;

    assert_eq!(h.dalal.forecast(INFY).await, ForecastOutcome::Unavailable);
    assert_eq!(h.dalal.forecast(INFY).await, ForecastOutcome::Unavailable);
    assert_eq!(h.series.calls(INFY).await, 2);

    let status = h.dalal.forecast_status(INFY).await;
    assert_eq!(status.tier, CacheTier::None);
    assert!(!status.computing);
    assert!(!DurableTier::new(h.dir.path(), Duration::from_secs(60)).path_for(INFY).exists());
}

#[tokio::test]
async fn upstream_failure_is_unavailable() {
    let h = harness();
    h.series
        .set_series(TCS, MockBehavior::Fail(DalalError::upstream("mock-series", "boom")))
        .await;
    assert_eq!(h.dalal.forecast("tcs.ns").await, ForecastOutcome::Unavailable);
    assert_eq!(h.series.calls(TCS).await, 1);
}

#[tokio::test(start_paused = true)]
async fn hanging_history_times_out() {
    let mut cfg = quick_config();
    cfg.store.history_timeout = Duration::from_millis(200);
    let h = harness_with(cfg);
    h.series.set_series(TCS, MockBehavior::Hang).await;

    assert_eq!(h.dalal.forecast(TCS).await, ForecastOutcome::Unavailable);
    assert!(!h.dalal.forecast_status(TCS).await.computing);
}

#[tokio::test]
async fn unknown_symbols_pass_through_trimmed() {
    let h = harness();
    assert_eq!(h.dalal.forecast("  XYZ ").await, ForecastOutcome::Unavailable);
    assert_eq!(h.series.calls("XYZ").await, 1);
    assert_eq!(h.dalal.forecast("   ").await, ForecastOutcome::Unavailable);
    assert_eq!(h.series.total_calls().await, 1);
}

#[tokio::test]
async fn status_never_starts_a_computation() {
    let h = harness();
    let status = h.dalal.forecast_status("it_tcs").await;
    assert_eq!(status.symbol, TCS);
    assert!(!status.cached);
    assert!(!status.computing);
    assert_eq!(h.series.total_calls().await, 0);
}
