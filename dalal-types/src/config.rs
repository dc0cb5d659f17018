//! Configuration types shared by the cache, engine and service layers.
//!
//! Every policy constant the service relies on lives here as a named field
//! with a documented default, so deployments and tests can override it.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Live quote snapshot cache and its background refresher.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuoteCacheConfig {
    /// Maximum snapshot age before a read triggers a background refresh.
    pub ttl: Duration,
    /// Deadline for the single bulk fetch of every tracked symbol.
    pub bulk_timeout: Duration,
    /// Deadline for each fallback batch fetch.
    pub batch_timeout: Duration,
    /// Number of symbols per fallback batch.
    pub batch_size: usize,
    /// Pause between fallback batches, to stay under upstream rate limits.
    pub batch_pause: Duration,
    /// Fraction of requested symbols a bulk result must cover to be accepted.
    pub bulk_accept_ratio: f64,
}

impl Default for QuoteCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            bulk_timeout: Duration::from_secs(30),
            batch_timeout: Duration::from_secs(20),
            batch_size: 10,
            batch_pause: Duration::from_millis(500),
            bulk_accept_ratio: 0.5,
        }
    }
}

/// Forecast engine preprocessing, model and simulation parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastConfig {
    /// Number of business days to forecast.
    pub horizon: usize,
    /// Minimum number of price observations before anything is attempted.
    pub min_observations: usize,
    /// Most recent observations retained for fitting (about three trading years).
    pub window: usize,
    /// Minimum number of derived returns required after windowing.
    pub min_returns: usize,
    /// Upper bound of the trend model's autoregressive order search.
    pub max_ar: usize,
    /// Upper bound of the trend model's moving-average order search.
    pub max_ma: usize,
    /// Seasonal period of the seasonal trend model, in trading days.
    pub seasonal_period: usize,
    /// Most recent observations used by the seasonal trend model.
    pub seasonal_window: usize,
    /// Autoregressive order used by the seasonal model when the trend fit failed.
    pub seasonal_default_ar: usize,
    /// Seasonal lower band floor as a fraction of the last price.
    pub seasonal_lower_floor: f64,
    /// Terminal drift of the seasonal fallback, as a fraction of the last price.
    pub seasonal_fallback_drift: f64,
    /// Number of simulated price paths in the volatility model.
    pub simulation_paths: usize,
    /// Seed of the volatility model's random generator.
    pub simulation_seed: u64,
    /// Volatility lower band floor as a fraction of the last price.
    pub volatility_lower_floor: f64,
    /// Lower percentile of the simulated band.
    pub band_low_pct: f64,
    /// Upper percentile of the simulated band.
    pub band_high_pct: f64,
    /// Two-sided normal quantile used for the trend model intervals (95%).
    pub confidence_z: f64,
    /// Iteration cap of the volatility model's likelihood optimiser.
    pub garch_max_iter: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon: 30,
            min_observations: 50,
            window: 756,
            min_returns: 30,
            max_ar: 5,
            max_ma: 5,
            seasonal_period: 5,
            seasonal_window: 500,
            seasonal_default_ar: 1,
            seasonal_lower_floor: 0.5,
            seasonal_fallback_drift: 0.005,
            simulation_paths: 500,
            simulation_seed: 42,
            volatility_lower_floor: 0.3,
            band_low_pct: 5.0,
            band_high_pct: 95.0,
            confidence_z: 1.959_964,
            garch_max_iter: 300,
        }
    }
}

/// Two-tier forecast cache and its per-symbol locking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ForecastStoreConfig {
    /// Maximum age of a cached forecast in either tier.
    pub ttl: Duration,
    /// Maximum number of forecasts held in the fast tier.
    pub fast_capacity: u64,
    /// Directory holding durable per-symbol records.
    pub cache_dir: PathBuf,
    /// How long a caller waits on a peer's computation before getting a
    /// "still computing" answer. `None` waits indefinitely.
    pub lock_wait_timeout: Option<Duration>,
    /// Deadline for fetching the price series that feeds a computation.
    pub history_timeout: Duration,
    /// Lock registry size above which idle entries are pruned.
    pub lock_prune_threshold: usize,
}

impl Default for ForecastStoreConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(24 * 60 * 60),
            fast_capacity: 1024,
            cache_dir: PathBuf::from("data/forecast_cache"),
            lock_wait_timeout: Some(Duration::from_secs(120)),
            history_timeout: Duration::from_secs(30),
            lock_prune_threshold: 256,
        }
    }
}

/// Global configuration for the `Dalal` service object.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DalalConfig {
    /// Quote cache and refresher settings.
    pub quotes: QuoteCacheConfig,
    /// Forecast engine settings.
    pub forecast: ForecastConfig,
    /// Forecast cache settings.
    pub store: ForecastStoreConfig,
}
