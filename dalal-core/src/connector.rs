use std::collections::HashMap;

use async_trait::async_trait;

use crate::DalalError;
use crate::types::{DailyBar, PricePoint};

/// Daily bars keyed by venue ticker.
pub type BarsByTicker = HashMap<String, Vec<DailyBar>>;

/// Upstream source of recent daily OHLCV bars for many tickers at once.
///
/// Implementations may legitimately return bars for only some of the requested
/// tickers, return nothing at all, fail, or never complete. Callers bound each
/// call with their own deadline.
#[async_trait]
pub trait QuoteFeed: Send + Sync {
    /// Stable identifier used in diagnostics.
    fn name(&self) -> &'static str;

    /// Fetch the last couple of sessions of daily bars for `tickers`.
    ///
    /// Bars for each ticker are returned in ascending date order.
    async fn daily_bars(&self, tickers: &[String]) -> Result<BarsByTicker, DalalError>;
}

/// Supplies the ordered closing-price history of a symbol.
#[async_trait]
pub trait PriceSeriesProvider: Send + Sync {
    /// Stable identifier used in diagnostics.
    fn name(&self) -> &'static str;

    /// Fetch the date-ordered price series for a canonical symbol.
    ///
    /// An empty series is a valid answer and means "nothing known".
    async fn series(&self, symbol: &str) -> Result<Vec<PricePoint>, DalalError>;
}
