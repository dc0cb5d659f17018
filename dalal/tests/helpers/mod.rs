// Shared wiring so tests can `use crate::helpers::*;`
#![allow(dead_code)]

use std::time::Duration;

use dalal::{Dalal, DalalBuilder, DalalConfig, ForecastConfig};
use dalal_mock::{FeedController, MockQuoteFeed, MockSeriesProvider, SeriesController};
use tempfile::TempDir;

pub const RELIANCE: &str = "RELIANCE";
pub const TCS: &str = "TCS";
pub const INFY: &str = "INFY";

/// Number of instruments in the built-in registry.
pub const UNIVERSE: usize = 30;

/// A service over scripted upstreams and a throwaway cache directory.
///
/// The `TempDir` must outlive the service, so it travels with it.
pub struct Harness {
    pub dalal: Dalal,
    pub feed: FeedController,
    pub series: SeriesController,
    pub dir: TempDir,
}

/// Engine parameters small enough to keep test computations quick.
pub fn light_forecast() -> ForecastConfig {
    ForecastConfig {
        max_ar: 2,
        max_ma: 2,
        simulation_paths: 60,
        garch_max_iter: 120,
        ..ForecastConfig::default()
    }
}

/// Configuration with short upstream deadlines and no pause between batches.
pub fn quick_config() -> DalalConfig {
    let mut cfg = DalalConfig::default();
    cfg.quotes.batch_pause = Duration::ZERO;
    cfg.quotes.bulk_timeout = Duration::from_secs(5);
    cfg.quotes.batch_timeout = Duration::from_secs(5);
    cfg.forecast = light_forecast();
    cfg.store.history_timeout = Duration::from_secs(10);
    cfg.store.lock_wait_timeout = Some(Duration::from_secs(60));
    cfg
}

/// Builder preloaded with mocks, a temp cache dir and [`quick_config`].
pub fn builder_with(cfg: DalalConfig) -> (DalalBuilder, FeedController, SeriesController, TempDir) {
    let (feed, feed_ctl) = MockQuoteFeed::new_with_controller("mock-feed");
    let (series, series_ctl) = MockSeriesProvider::new_with_controller("mock-series");
    let dir = tempfile::tempdir().expect("tempdir");
    let builder = Dalal::builder()
        .quote_feed(feed)
        .price_series(series)
        .config(cfg)
        .cache_dir(dir.path());
    (builder, feed_ctl, series_ctl, dir)
}

pub fn harness_with(cfg: DalalConfig) -> Harness {
    let (builder, feed, series, dir) = builder_with(cfg);
    Harness {
        dalal: builder.build().expect("build"),
        feed,
        series,
        dir,
    }
}

pub fn harness() -> Harness {
    harness_with(quick_config())
}

/// Venue tickers of the built-in registry, in registry order.
pub fn tickers() -> Vec<String> {
    dalal::Registry::nse_large_caps().venue_tickers()
}

/// Poll `cond` every few milliseconds until it holds or `within` elapses.
pub async fn eventually<F, Fut>(within: Duration, mut cond: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + within;
    loop {
        if cond().await {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
