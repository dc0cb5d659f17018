//! Domain data structures shared by the cache, engine and service crates.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Where a quote's numbers came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Provenance {
    /// Parsed from a live upstream fetch.
    Live,
    /// Deterministic fixture data (tests and demos).
    Fixture,
}

/// Point-in-time quote for one tracked instrument.
///
/// Quotes are never mutated in place; a refresh replaces the whole snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Canonical registry key, e.g. `RELIANCE`.
    pub symbol: String,
    /// Human-readable name.
    pub name: String,
    /// Sector tag.
    pub sector: String,
    /// Venue ticker the quote was fetched under, e.g. `RELIANCE.NS`.
    pub venue_ticker: String,
    /// Last traded (closing) price.
    pub last: f64,
    /// Previous session's close.
    pub previous_close: f64,
    /// `last - previous_close`, rounded to 2 dp.
    pub change: f64,
    /// Percentage change versus the previous close, rounded to 2 dp.
    pub change_pct: f64,
    /// Session open, when reported.
    pub open: Option<f64>,
    /// Session high, when reported.
    pub high: Option<f64>,
    /// Session low, when reported.
    pub low: Option<f64>,
    /// Session volume (0 when not reported).
    pub volume: u64,
    /// Provenance tag.
    pub provenance: Provenance,
}

/// One daily OHLCV bar as returned by an upstream feed.
///
/// Fields are `f64` and may be NaN when the upstream omitted them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    /// Session date.
    pub date: NaiveDate,
    /// Opening price.
    pub open: f64,
    /// Session high.
    pub high: f64,
    /// Session low.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Traded volume, if known.
    pub volume: Option<u64>,
}

/// A dated closing price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Observation date.
    pub date: NaiveDate,
    /// Closing price.
    pub price: f64,
}

impl PricePoint {
    /// Construct a new price point.
    #[must_use]
    pub const fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

/// One step of a forecast series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Business date of this step.
    pub date: NaiveDate,
    /// Point estimate.
    pub price: f64,
    /// Lower band.
    pub lower: f64,
    /// Upper band.
    pub upper: f64,
}

/// Expected direction of travel over the forecast horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// Trend model's terminal forecast is above the last price.
    Up,
    /// Anything else, including a flat forecast.
    Down,
}

/// The three forecast models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Non-seasonal ARIMA on price levels.
    Trend,
    /// Weekly-seasonal ARIMA on price levels.
    Seasonal,
    /// GARCH(1,1) variance with a simulated price ensemble.
    Volatility,
}

impl ModelKind {
    /// Stable label used in diagnostics and errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trend => "trend",
            Self::Seasonal => "seasonal",
            Self::Volatility => "volatility",
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagnostic record for a model whose output was replaced by its fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelFallback {
    /// Model that degraded.
    pub model: ModelKind,
    /// Why the primary fit was abandoned.
    pub reason: String,
}

/// `(p, d, q)` order chosen by the trend model's search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArimaOrder {
    /// Autoregressive order.
    pub p: usize,
    /// Differencing order.
    pub d: usize,
    /// Moving-average order.
    pub q: usize,
}

impl std::fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.p, self.d, self.q)
    }
}

/// Complete three-model forecast for one symbol. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    /// Canonical symbol the forecast was computed for.
    pub symbol: String,
    /// Human-readable name.
    pub display_name: String,
    /// Last observed price.
    pub last_price: f64,
    /// Date of the last observation.
    pub last_date: NaiveDate,
    /// Direction implied by the trend model's terminal forecast.
    pub direction: Direction,
    /// Trend model series.
    pub trend: Vec<ForecastPoint>,
    /// Seasonal trend model series.
    pub seasonal: Vec<ForecastPoint>,
    /// Simulated volatility band series.
    pub volatility: Vec<ForecastPoint>,
    /// Order picked by the trend model search, if it fitted.
    pub trend_order: Option<ArimaOrder>,
    /// Models that fell back to their degraded output.
    #[serde(default)]
    pub fallbacks: Vec<ModelFallback>,
    /// When the computation finished.
    pub computed_at: DateTime<Utc>,
}

impl ForecastResult {
    /// Returns true when the given model used its fallback output.
    #[must_use]
    pub fn degraded(&self, model: ModelKind) -> bool {
        self.fallbacks.iter().any(|f| f.model == model)
    }

    /// Terminal (furthest-horizon) point of the trend series.
    #[must_use]
    pub fn terminal_trend(&self) -> Option<f64> {
        self.trend.last().map(|p| p.price)
    }
}

/// Cache tier that answered a forecast lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheTier {
    /// In-process map.
    Fast,
    /// Per-symbol record on disk.
    Durable,
    /// Not cached.
    None,
}
