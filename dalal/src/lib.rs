//! Dalal serves live quotes and cached price forecasts for a market dashboard.
//!
//! Overview
//! - Quotes: a stale-while-revalidate snapshot of every tracked instrument.
//!   Reads never wait on the network; a stale read starts one background
//!   refresh (single-flight) that tries a bulk fetch and falls back to small
//!   batches, each under its own deadline.
//! - Forecasts: three-model forecasts from `dalal-forecast`, cached in a fast
//!   in-process tier and a durable per-symbol tier. A per-symbol lock makes
//!   sure concurrent requests for the same symbol trigger one computation.
//! - Rankings: annualised return, volatility and Sharpe ratio per instrument,
//!   plus background prewarming of the best-ranked forecasts.
//!
//! Key behaviors and trade-offs
//! - A refresh that yields nothing keeps the previous snapshot; it stays stale
//!   and the next read retries.
//! - Waiting on a peer's computation is bounded by `lock_wait_timeout`; expiry
//!   answers [`ForecastOutcome::Pending`] while the computation continues and
//!   fills both tiers.
//! - Only insufficient history produces [`ForecastOutcome::Unavailable`];
//!   model fit failures degrade single series and are listed in
//!   `ForecastResult::fallbacks`.
//!
//! Examples
//! ```rust,ignore
//! use std::sync::Arc;
//! use dalal::{Dalal, ForecastOutcome};
//!
//! let dalal = Dalal::builder()
//!     .quote_feed(feed)
//!     .price_series(history)
//!     .cache_dir("data/forecast_cache")
//!     .build()?;
//!
//! dalal.warmup().await;
//! let view = dalal.quotes(false);
//! if let ForecastOutcome::Ready(f) = dalal.forecast("reliance").await {
//!     println!("{} {:?}", f.symbol, f.direction);
//! }
//! ```
//!
//! See `dalal/examples/` for a runnable demonstration.
#![warn(missing_docs)]

pub(crate) mod core;
mod forecast;
mod quotes;
mod rankings;

pub use core::{Dalal, DalalBuilder};
pub use forecast::{ForecastOutcome, ForecastStatus};
pub use quotes::{QuoteSnapshot, QuotesView};

pub use dalal_core::{
    ArimaOrder, CacheTier, DailyBar, DalalConfig, DalalError, Direction, ForecastConfig,
    ForecastPoint, ForecastResult, ForecastStoreConfig, Listing, ModelFallback, ModelKind,
    PriceSeriesProvider, PricePoint, Provenance, Quote, QuoteCacheConfig, QuoteFeed, Registry,
};
pub use dalal_forecast::{ForecastEngine, RiskMetrics};
