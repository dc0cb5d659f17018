//! dalal-forecast
//!
//! Deterministic three-model forecast engine over daily closing prices.
//!
//! - Trend: ARIMA(p, 1, q) with `(p, q)` picked by AIC over a bounded grid.
//! - Seasonal: ARIMA(p, 1, q) x (1, 0, 1, 5) on the most recent 500 prices.
//! - Volatility: GARCH(1,1) on percent returns driving a seeded Monte Carlo
//!   ensemble of price paths, summarised by median and percentile band.
//!
//! Each model degrades to a documented fallback on fit failure; only
//! insufficient history fails a forecast outright. The crate also computes
//! annualised risk metrics used to rank instruments.
//!
//! The engine is synchronous and CPU-bound; async callers should run it on a
//! blocking thread.
#![warn(missing_docs)]

mod arma;
mod engine;
mod linalg;
mod optimize;
mod preprocess;
/// Annualised risk metrics and Sharpe ranking.
pub mod risk;
mod seasonal;
mod stats;
mod trend;
mod volatility;

pub use engine::ForecastEngine;
pub use risk::{RiskMetrics, rank_by_sharpe, risk_metrics};
