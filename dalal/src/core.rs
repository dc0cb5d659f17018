use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use dalal_cache::{DurableTier, FastTier, LockRegistry};
use dalal_core::{
    DalalConfig, DalalError, ForecastConfig, PriceSeriesProvider, QuoteFeed, Registry,
};
use dalal_forecast::ForecastEngine;

use crate::quotes::QuoteCache;

/// Market data service: live quote snapshot plus cached forecasts.
///
/// Cheap to clone; clones share all caches, locks and upstream handles.
/// Build one per process (or one per test) with [`Dalal::builder`].
#[derive(Clone)]
pub struct Dalal {
    pub(crate) inner: Arc<Inner>,
}

pub(crate) struct Inner {
    pub(crate) registry: Registry,
    pub(crate) feed: Arc<dyn QuoteFeed>,
    pub(crate) history: Arc<dyn PriceSeriesProvider>,
    pub(crate) engine: ForecastEngine,
    pub(crate) cfg: DalalConfig,
    pub(crate) quotes: QuoteCache,
    pub(crate) fast: FastTier,
    pub(crate) durable: DurableTier,
    pub(crate) locks: LockRegistry,
}

impl std::fmt::Debug for Dalal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dalal")
            .field("feed", &self.inner.feed.name())
            .field("history", &self.inner.history.name())
            .field("symbols", &self.inner.registry.len())
            .field("cfg", &self.inner.cfg)
            .finish_non_exhaustive()
    }
}

/// Builder for constructing a [`Dalal`] service with custom configuration.
pub struct DalalBuilder {
    feed: Option<Arc<dyn QuoteFeed>>,
    history: Option<Arc<dyn PriceSeriesProvider>>,
    registry: Registry,
    cfg: DalalConfig,
}

impl Default for DalalBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DalalBuilder {
    /// Create a builder tracking the built-in NSE large-cap registry with
    /// default policy.
    ///
    /// Both upstreams must be supplied before [`build`](Self::build).
    #[must_use]
    pub fn new() -> Self {
        Self {
            feed: None,
            history: None,
            registry: Registry::nse_large_caps(),
            cfg: DalalConfig::default(),
        }
    }

    /// Upstream source of daily bars for the quote snapshot.
    #[must_use]
    pub fn quote_feed(mut self, feed: Arc<dyn QuoteFeed>) -> Self {
        self.feed = Some(feed);
        self
    }

    /// Upstream source of price history for forecasts and risk metrics.
    #[must_use]
    pub fn price_series(mut self, provider: Arc<dyn PriceSeriesProvider>) -> Self {
        self.history = Some(provider);
        self
    }

    /// Replace the tracked instruments.
    #[must_use]
    pub fn registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, cfg: DalalConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Maximum quote snapshot age before reads trigger a background refresh.
    #[must_use]
    pub const fn quote_ttl(mut self, ttl: Duration) -> Self {
        self.cfg.quotes.ttl = ttl;
        self
    }

    /// Forecast engine parameters.
    #[must_use]
    pub fn forecast_config(mut self, cfg: ForecastConfig) -> Self {
        self.cfg.forecast = cfg;
        self
    }

    /// Directory for durable forecast records.
    #[must_use]
    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cfg.store.cache_dir = dir.into();
        self
    }

    /// Maximum age of a cached forecast in either tier.
    #[must_use]
    pub const fn forecast_ttl(mut self, ttl: Duration) -> Self {
        self.cfg.store.ttl = ttl;
        self
    }

    /// How long a forecast request waits on a peer's computation before
    /// answering "still computing". `None` waits indefinitely.
    #[must_use]
    pub const fn lock_wait_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.cfg.store.lock_wait_timeout = timeout;
        self
    }

    /// Deadline for fetching a symbol's price history.
    #[must_use]
    pub const fn history_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.store.history_timeout = timeout;
        self
    }

    /// Build the service.
    ///
    /// # Errors
    /// Returns `InvalidArg` when an upstream is missing, the registry is
    /// empty, or the quote policy is unusable (zero batch size, acceptance
    /// ratio outside `0..=1`).
    pub fn build(self) -> Result<Dalal, DalalError> {
        let feed = self.feed.ok_or_else(|| {
            DalalError::InvalidArg("no quote feed registered; add one via quote_feed(...)".into())
        })?;
        let history = self.history.ok_or_else(|| {
            DalalError::InvalidArg(
                "no price series provider registered; add one via price_series(...)".into(),
            )
        })?;
        if self.registry.is_empty() {
            return Err(DalalError::InvalidArg("registry has no listings".into()));
        }
        let q = &self.cfg.quotes;
        if q.batch_size == 0 {
            return Err(DalalError::InvalidArg("quote batch_size must be positive".into()));
        }
        if !(0.0..=1.0).contains(&q.bulk_accept_ratio) {
            return Err(DalalError::InvalidArg(format!(
                "bulk_accept_ratio {} outside 0..=1",
                q.bulk_accept_ratio
            )));
        }

        let store = &self.cfg.store;
        let inner = Inner {
            fast: FastTier::new(store.fast_capacity, store.ttl),
            durable: DurableTier::new(store.cache_dir.clone(), store.ttl),
            locks: LockRegistry::new(store.lock_prune_threshold),
            engine: ForecastEngine::new(self.cfg.forecast.clone()),
            quotes: QuoteCache::default(),
            registry: self.registry,
            feed,
            history,
            cfg: self.cfg,
        };
        Ok(Dalal {
            inner: Arc::new(inner),
        })
    }
}

impl Dalal {
    /// Start building a new service.
    #[must_use]
    pub fn builder() -> DalalBuilder {
        DalalBuilder::new()
    }

    /// Tracked instruments.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &DalalConfig {
        &self.inner.cfg
    }

    /// Canonical key for a loose symbol; unknown symbols pass through trimmed.
    pub(crate) fn canonical(&self, symbol: &str) -> String {
        self.inner
            .registry
            .resolve(symbol)
            .map_or_else(|| symbol.trim().to_string(), str::to_string)
    }

    /// Wrap an upstream future with a deadline and map expiry to `UpstreamTimeout`.
    ///
    /// Expiry drops the future, cancelling the in-flight request.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dalal::core::upstream_call_with_timeout",
            skip(fut),
            fields(
                capability = capability,
                timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            ),
        )
    )]
    pub(crate) async fn upstream_call_with_timeout<T, Fut>(
        capability: &'static str,
        timeout: Duration,
        fut: Fut,
    ) -> Result<T, DalalError>
    where
        Fut: core::future::Future<Output = Result<T, DalalError>>,
    {
        (tokio::time::timeout(timeout, fut).await)
            .unwrap_or_else(|_| Err(DalalError::upstream_timeout(capability, timeout)))
    }
}
