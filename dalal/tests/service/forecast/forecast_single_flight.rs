use std::sync::Arc;
use std::time::Duration;

use dalal::ForecastOutcome;
use dalal_mock::MockBehavior;
use dalal_mock::fixtures::random_walk;

use crate::helpers::{RELIANCE, harness};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_share_one_computation() {
    let h = harness();
    h.series
        .set_series(
            RELIANCE,
            MockBehavior::Delay(Duration::from_millis(300), random_walk(300, 100.0, 7)),
        )
        .await;

    let tasks = (0..8).map(|i| {
        let dalal = h.dalal.clone();
        // mix spellings; they all canonicalise to the same key
        let symbol = if i % 2 == 0 { "RELIANCE" } else { "reliance.ns" };
        tokio::spawn(async move { dalal.forecast(symbol).await })
    });
    let outcomes: Vec<ForecastOutcome> = futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|r| r.expect("task"))
        .collect();

    let first = outcomes[0].ready().expect("ready").clone();
    for outcome in &outcomes {
        let r = outcome.ready().expect("ready");
        assert!(Arc::ptr_eq(r, &first));
    }
    assert_eq!(h.series.calls(RELIANCE).await, 1);
    assert_eq!(first.symbol, RELIANCE);
    assert_eq!(first.display_name, "Reliance Industries");
    assert_eq!(first.trend.len(), 30);
    assert_eq!(first.volatility.len(), 30);
}

#[tokio::test(flavor = "multi_thread")]
async fn cached_forecast_is_served_without_recompute() {
    let h = harness();
    h.series
        .set_series(RELIANCE, MockBehavior::Return(random_walk(300, 100.0, 11)))
        .await;

    let first = h.dalal.forecast("OILGAS_RELIANCE").await;
    let again = h.dalal.forecast("RELIANCE").await;
    assert!(Arc::ptr_eq(
        first.ready().expect("ready"),
        again.ready().expect("ready")
    ));
    assert_eq!(h.series.calls(RELIANCE).await, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn slow_computation_answers_pending_then_completes() {
    let mut cfg = crate::helpers::quick_config();
    cfg.store.lock_wait_timeout = Some(Duration::from_millis(100));
    let owned = crate::helpers::harness_with(cfg);
    let h = &owned;
    h.series
        .set_series(
            RELIANCE,
            MockBehavior::Delay(Duration::from_millis(600), random_walk(300, 100.0, 3)),
        )
        .await;

    assert_eq!(h.dalal.forecast(RELIANCE).await, ForecastOutcome::Pending);
    let status = h.dalal.forecast_status(RELIANCE).await;
    assert!(status.computing);
    assert!(!status.cached);

    // a second caller queues on the lock and also gives up in time
    assert_eq!(h.dalal.forecast(RELIANCE).await, ForecastOutcome::Pending);

    let done = crate::helpers::eventually(Duration::from_secs(10), move || async move {
        h.dalal.forecast_status(RELIANCE).await.cached
    })
    .await;
    assert!(done);
    assert!(crate::helpers::eventually(Duration::from_secs(1), move || async move {
        !h.dalal.forecast_status(RELIANCE).await.computing
    })
    .await);

    assert!(matches!(h.dalal.forecast(RELIANCE).await, ForecastOutcome::Ready(_)));
    assert_eq!(h.series.calls(RELIANCE).await, 1);
    assert!(dalal_cache::DurableTier::new(h.dir.path(), Duration::from_secs(3600))
        .path_for(RELIANCE)
        .exists());
}
