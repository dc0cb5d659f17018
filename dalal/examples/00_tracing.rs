use std::time::Duration;

use dalal::{Dalal, ForecastOutcome};
use dalal_mock::fixtures::random_walk;
use dalal_mock::{MockBehavior, MockQuoteFeed, MockSeriesProvider};
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Suggested: RUST_LOG=info,dalal=trace,dalal_forecast=debug,dalal_cache=debug
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
        .try_init();

    // Scripted upstreams stand in for the market data vendor.
    let (feed, _feed_ctl) = MockQuoteFeed::new_with_controller("mock-feed");
    let (history, series_ctl) = MockSeriesProvider::new_with_controller("mock-series");
    for (i, listing) in dalal::Registry::nse_large_caps().listings().iter().enumerate() {
        let start = 100.0 + 25.0 * (i % 8) as f64;
        series_ctl
            .set_series(&listing.symbol, MockBehavior::Return(random_walk(400, start, i as u64)))
            .await;
    }

    let cache = std::env::temp_dir().join("dalal-example-cache");
    let dalal = Dalal::builder()
        .quote_feed(feed)
        .price_series(history)
        .cache_dir(&cache)
        .lock_wait_timeout(Some(Duration::from_secs(30)))
        .build()?;

    // Quotes
    let n = dalal.warmup().await;
    println!("{n} quotes after warmup");
    if let Some(q) = dalal.quote("reliance.ns") {
        println!("{} {:.2} ({:+.2}%)", q.symbol, q.last, q.change_pct);
    }

    // Rankings
    for m in dalal.risk_rankings().await.iter().take(5) {
        println!("{:<12} sharpe {:>6.2} return {:>7.2}%", m.symbol, m.sharpe, m.annual_return_pct);
    }

    // Forecast, then the cached answer
    for _ in 0..2 {
        match dalal.forecast("TCS").await {
            ForecastOutcome::Ready(f) => println!(
                "{} {:?} last {:.2} -> {:?}",
                f.symbol,
                f.direction,
                f.last_price,
                f.terminal_trend()
            ),
            other => println!("TCS: {other:?}"),
        }
    }
    println!("{:?}", dalal.forecast_status("TCS").await);

    dalal.prewarm_top(3).await?;
    Ok(())
}
