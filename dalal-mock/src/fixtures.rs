//! Deterministic synthetic market data.

use chrono::NaiveDate;
use dalal_core::connector::BarsByTicker;
use dalal_core::{DailyBar, PricePoint, business_days_after};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// First business day used by every generated series.
#[must_use]
pub fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 1, 4).unwrap_or_default()
}

fn dated(prices: impl IntoIterator<Item = f64>) -> Vec<PricePoint> {
    let prices: Vec<f64> = prices.into_iter().collect();
    let start = epoch();
    std::iter::once(start)
        .chain(business_days_after(start, prices.len().saturating_sub(1)))
        .zip(prices)
        .map(|(d, p)| PricePoint::new(d, p))
        .collect()
}

/// `n` business-day prices compounding at `daily_growth` from `start`.
#[must_use]
pub fn trending_series(n: usize, start: f64, daily_growth: f64) -> Vec<PricePoint> {
    dated((0..n).scan(start, |p, i| {
        if i > 0 {
            *p *= 1.0 + daily_growth;
        }
        Some(*p)
    }))
}

/// `n` business-day prices all equal to `price`.
#[must_use]
pub fn constant_series(n: usize, price: f64) -> Vec<PricePoint> {
    dated(std::iter::repeat_n(price, n))
}

/// Seeded random walk with daily moves of up to about two percent.
#[must_use]
pub fn random_walk(n: usize, start: f64, seed: u64) -> Vec<PricePoint> {
    let mut rng = StdRng::seed_from_u64(seed);
    dated((0..n).scan(start, move |p, i| {
        if i > 0 {
            *p *= 1.0 + rng.random_range(-0.02..0.0205);
        }
        Some(*p)
    }))
}

/// Two sessions of bars for each ticker, with a distinct close per ticker.
///
/// The `i`-th ticker closes at `100 + 10 i` after closing `1%` lower the
/// session before.
#[must_use]
pub fn bars_for(tickers: &[String]) -> BarsByTicker {
    let days = business_days_after(epoch(), 2);
    tickers
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let close = 100.0 + 10.0 * i as f64;
            let prev = close * 0.99;
            let bars = days
                .iter()
                .zip([prev, close])
                .map(|(&date, c)| DailyBar {
                    date,
                    open: c * 0.995,
                    high: c * 1.01,
                    low: c * 0.98,
                    close: c,
                    volume: Some(10_000 + i as u64),
                })
                .collect();
            (t.clone(), bars)
        })
        .collect()
}
