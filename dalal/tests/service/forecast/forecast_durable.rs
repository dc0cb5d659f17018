use std::time::Duration;

use chrono::Utc;
use dalal::{CacheTier, ForecastOutcome};
use dalal_cache::{CachedForecast, DurableTier};
use dalal_mock::MockBehavior;
use dalal_mock::fixtures::random_walk;

use crate::helpers::{RELIANCE, builder_with, harness, quick_config};

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

#[tokio::test(flavor = "multi_thread")]
async fn durable_record_survives_restart() {
    let first = harness();
    first
        .series
        .set_series(RELIANCE, MockBehavior::Return(random_walk(300, 100.0, 5)))
        .await;
    let computed = first.dalal.forecast(RELIANCE).await;
    let computed = computed.ready().expect("ready").clone();

    // a fresh process over the same directory, with an upstream that has nothing
    let (builder, _feed, series, _dir) = builder_with(quick_config());
    let restarted = builder.cache_dir(first.dir.path()).build().expect("build");

    let status = restarted.forecast_status(RELIANCE).await;
    assert_eq!(status.tier, CacheTier::Durable);
    assert!(status.cached);

    let served = restarted.forecast(RELIANCE).await;
    let served = served.ready().expect("ready");
    assert_eq!(served.symbol, computed.symbol);
    assert_eq!(served.last_date, computed.last_date);
    assert_eq!(served.computed_at, computed.computed_at);
    assert_eq!(series.total_calls().await, 0);

    assert_eq!(
        restarted.forecast_status(RELIANCE).await.tier,
        CacheTier::Fast
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn stale_durable_record_is_recomputed() {
    let h = harness();
    h.series
        .set_series(RELIANCE, MockBehavior::Return(random_walk(300, 100.0, 5)))
        .await;
    let result = h.dalal.forecast(RELIANCE).await.ready().expect("ready").clone();

    let durable = DurableTier::new(h.dir.path(), DAY);
    let backdated = CachedForecast {
        result,
        written_at: Utc::now() - chrono::Duration::hours(25),
    };
    durable.store(RELIANCE, &backdated).await.expect("store");

    let (builder, _feed, series, _dir) = builder_with(quick_config());
    let restarted = builder.cache_dir(h.dir.path()).build().expect("build");
    series
        .set_series(RELIANCE, MockBehavior::Return(random_walk(300, 100.0, 6)))
        .await;

    assert_eq!(restarted.forecast_status(RELIANCE).await.tier, CacheTier::None);
    assert!(matches!(restarted.forecast(RELIANCE).await, ForecastOutcome::Ready(_)));
    assert_eq!(series.calls(RELIANCE).await, 1);

    let rewritten = durable.load(RELIANCE).await.expect("load").expect("fresh");
    assert!(rewritten.written_at > backdated.written_at);
}

#[tokio::test(flavor = "multi_thread")]
async fn corrupt_record_is_treated_as_a_miss() {
    let h = harness();
    let durable = DurableTier::new(h.dir.path(), DAY);
    std::fs::write(durable.path_for(RELIANCE), b"{ not json").expect("write");
    h.series
        .set_series(RELIANCE, MockBehavior::Return(random_walk(300, 100.0, 9)))
        .await;

    assert_eq!(h.dalal.forecast_status(RELIANCE).await.tier, CacheTier::None);
    assert!(matches!(h.dalal.forecast(RELIANCE).await, ForecastOutcome::Ready(_)));
    assert_eq!(h.series.calls(RELIANCE).await, 1);
    assert!(durable.load(RELIANCE).await.expect("valid record").is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn symbols_sharing_a_file_name_keep_their_own_forecasts() {
    let h = harness();
    h.series
        .set_series("A/B", MockBehavior::Return(random_walk(300, 100.0, 12)))
        .await;

    let computed = h.dalal.forecast("A/B").await;
    assert_eq!(computed.ready().expect("ready").symbol, "A/B");

    // a restarted instance must not serve the A/B record for A_B
    let (builder, _feed, series, _dir) = builder_with(quick_config());
    let restarted = builder.cache_dir(h.dir.path()).build().expect("build");
    assert_eq!(restarted.forecast_status("A_B").await.tier, CacheTier::None);
    assert_eq!(restarted.forecast("A_B").await, ForecastOutcome::Unavailable);
    assert_eq!(series.calls("A_B").await, 1);
    assert_eq!(restarted.forecast_status("A/B").await.tier, CacheTier::Durable);
}
