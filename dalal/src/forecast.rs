use std::sync::Arc;

use dalal_cache::CachedForecast;
use dalal_core::{CacheTier, DalalError, ForecastResult};
use tokio::sync::OwnedMutexGuard;
use tokio::time::Instant;

use crate::Dalal;

/// Answer to a forecast request.
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastOutcome {
    /// A complete three-model forecast (individual models possibly degraded).
    Ready(Arc<ForecastResult>),
    /// No forecast can be produced: the symbol's history is missing, too
    /// short, or could not be fetched.
    Unavailable,
    /// A computation is running but did not finish within the configured
    /// wait; poll again later.
    Pending,
}

impl ForecastOutcome {
    /// The forecast, when ready.
    #[must_use]
    pub fn ready(&self) -> Option<&Arc<ForecastResult>> {
        match self {
            Self::Ready(r) => Some(r),
            _ => None,
        }
    }
}

/// Cache state of one symbol's forecast, for polling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastStatus {
    /// Canonical symbol the status refers to.
    pub symbol: String,
    /// Whether a fresh forecast is cached in either tier.
    pub cached: bool,
    /// Tier holding the forecast.
    pub tier: CacheTier,
    /// Whether a computation for the symbol is in flight.
    pub computing: bool,
}

impl Dalal {
    /// Forecast for a loose symbol, computing it on a cache miss.
    ///
    /// Behavior:
    /// - Fast-tier hits return immediately; durable hits younger than the
    ///   forecast TTL are promoted to the fast tier and returned.
    /// - On a full miss the symbol's lock is taken and both tiers are checked
    ///   again, so callers queued behind a computation receive its result
    ///   instead of recomputing. At most one computation per symbol runs at a
    ///   time, and every concurrent caller sees the same `Arc`.
    /// - The computation runs in its own task holding the lock. If the
    ///   configured lock wait elapses first, the caller gets
    ///   [`ForecastOutcome::Pending`] while the computation carries on and
    ///   populates both tiers.
    /// - Missing or short history yields [`ForecastOutcome::Unavailable`],
    ///   which is never cached.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dalal::forecast::forecast", skip(self), fields(symbol = %symbol))
    )]
    pub async fn forecast(&self, symbol: &str) -> ForecastOutcome {
        let key = self.canonical(symbol);
        if key.is_empty() {
            return ForecastOutcome::Unavailable;
        }
        if let Some(hit) = self.cached_forecast(&key).await {
            return ForecastOutcome::Ready(hit.result);
        }

        let deadline = self
            .inner
            .cfg
            .store
            .lock_wait_timeout
            .map(|d| Instant::now() + d);
        let lock = self.inner.locks.handle(&key);
        let guard = match deadline {
            Some(at) => match tokio::time::timeout_at(at, lock.lock_owned()).await {
                Ok(g) => g,
                Err(_) => return ForecastOutcome::Pending,
            },
            None => lock.lock_owned().await,
        };

        if let Some(hit) = self.cached_forecast(&key).await {
            return ForecastOutcome::Ready(hit.result);
        }

        let this = self.clone();
        let task_key = key.clone();
        let task = tokio::spawn(async move { this.compute_locked(&task_key, guard).await });
        let joined = match deadline {
            Some(at) => match tokio::time::timeout_at(at, task).await {
                Ok(j) => j,
                Err(_) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(symbol = %key, "forecast still computing; answering pending");
                    return ForecastOutcome::Pending;
                }
            },
            None => task.await,
        };

        match joined {
            Ok(Some(result)) => ForecastOutcome::Ready(result),
            Ok(None) => ForecastOutcome::Unavailable,
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(symbol = %key, error = %_e, "forecast task aborted");
                ForecastOutcome::Unavailable
            }
        }
    }

    /// Cache state for a loose symbol. Never starts a computation.
    pub async fn forecast_status(&self, symbol: &str) -> ForecastStatus {
        let key = self.canonical(symbol);
        let tier = if self.inner.fast.get(&key).await.is_some() {
            CacheTier::Fast
        } else if self.inner.durable.get(&key).await.is_some() {
            CacheTier::Durable
        } else {
            CacheTier::None
        };
        ForecastStatus {
            cached: tier != CacheTier::None,
            tier,
            computing: self.inner.locks.is_held(&key),
            symbol: key,
        }
    }

    async fn cached_forecast(&self, key: &str) -> Option<CachedForecast> {
        if let Some(hit) = self.inner.fast.get(key).await {
            return Some(hit);
        }
        let hit = self.inner.durable.get(key).await?;
        self.inner.fast.insert(key, hit.clone()).await;
        Some(hit)
    }

    /// Fetch history, run the engine, and store the result in both tiers.
    ///
    /// `_guard` keeps the symbol locked until both tiers are written.
    async fn compute_locked(
        &self,
        key: &str,
        _guard: OwnedMutexGuard<()>,
    ) -> Option<Arc<ForecastResult>> {
        let result = match self.compute(key).await {
            Ok(r) => Arc::new(r),
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::info!(symbol = %key, error = %_e, "no forecast");
                return None;
            }
        };

        let entry = CachedForecast::now(Arc::clone(&result));
        self.inner.fast.insert(key, entry.clone()).await;
        if let Err(_e) = self.inner.durable.store(key, &entry).await {
            #[cfg(feature = "tracing")]
            tracing::warn!(symbol = %key, error = %_e, "durable forecast write failed");
        }
        Some(result)
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dalal::forecast::compute", skip(self), fields(symbol = %key))
    )]
    async fn compute(&self, key: &str) -> Result<ForecastResult, DalalError> {
        let series = Self::upstream_call_with_timeout(
            "series",
            self.inner.cfg.store.history_timeout,
            self.inner.history.series(key),
        )
        .await?;

        let engine = self.inner.engine.clone();
        let symbol = key.to_string();
        let display = self.inner.registry.display_name(key);
        tokio::task::spawn_blocking(move || engine.forecast(&symbol, &display, &series))
            .await
            .map_err(|e| DalalError::model_fit("engine", e.to_string()))?
    }
}
