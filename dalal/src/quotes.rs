use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use dalal_core::{DalalError, Quote, quotes_from_bars};
use tokio::time::Instant;

use crate::Dalal;
use crate::core::Inner;

/// Point-in-time quotes for the tracked instruments, keyed by canonical symbol.
///
/// A snapshot is never modified; refreshes publish a new one.
#[derive(Debug, Clone, Default)]
pub struct QuoteSnapshot {
    quotes: HashMap<String, Quote>,
    refreshed_at: Option<Instant>,
    as_of: Option<DateTime<Utc>>,
}

impl QuoteSnapshot {
    fn new(quotes: HashMap<String, Quote>) -> Self {
        Self {
            quotes,
            refreshed_at: Some(Instant::now()),
            as_of: Some(Utc::now()),
        }
    }

    /// Quote for a canonical symbol.
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<&Quote> {
        self.quotes.get(symbol)
    }

    /// All quotes, keyed by canonical symbol.
    #[must_use]
    pub const fn quotes(&self) -> &HashMap<String, Quote> {
        &self.quotes
    }

    /// Number of quotes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    /// True before the first successful refresh.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Wall-clock time of the refresh that produced this snapshot.
    #[must_use]
    pub const fn as_of(&self) -> Option<DateTime<Utc>> {
        self.as_of
    }

    /// Whether the snapshot is older than `ttl` (always true before the
    /// first refresh).
    #[must_use]
    pub fn is_stale(&self, ttl: Duration) -> bool {
        self.refreshed_at.is_none_or(|t| t.elapsed() > ttl)
    }
}

/// Result of a quote read.
#[derive(Debug, Clone)]
pub struct QuotesView {
    /// The snapshot current at the time of the read.
    pub snapshot: Arc<QuoteSnapshot>,
    /// Whether this read started a background refresh.
    pub refresh_started: bool,
    /// Whether a refresh was in flight when the read returned.
    pub refreshing: bool,
}

#[derive(Default)]
pub(crate) struct QuoteCache {
    snapshot: RwLock<Arc<QuoteSnapshot>>,
    refreshing: AtomicBool,
}

impl QuoteCache {
    fn current(&self) -> Arc<QuoteSnapshot> {
        Arc::clone(&self.snapshot.read().expect("quote snapshot poisoned"))
    }

    fn publish(&self, snapshot: QuoteSnapshot) {
        *self.snapshot.write().expect("quote snapshot poisoned") = Arc::new(snapshot);
    }
}

/// Ownership of the single refresh slot; releases it on drop, including on
/// panic inside the refresh.
struct RefreshClaim {
    inner: Arc<Inner>,
}

impl RefreshClaim {
    fn try_claim(inner: &Arc<Inner>) -> Option<Self> {
        inner
            .quotes
            .refreshing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                inner: Arc::clone(inner),
            })
    }
}

impl Drop for RefreshClaim {
    fn drop(&mut self) {
        self.inner.quotes.refreshing.store(false, Ordering::Release);
    }
}

impl Dalal {
    /// Current quote snapshot; never waits on the network.
    ///
    /// Behavior:
    /// - Returns the snapshot as it is right now, possibly stale or empty.
    /// - When the snapshot is older than the quote TTL, or `force_refresh` is
    ///   set, and no refresh is in flight, starts one background refresh
    ///   without waiting for it. Requests arriving while a refresh runs are
    ///   dropped, not queued.
    /// - Outside a Tokio runtime no refresh can be started; the snapshot is
    ///   still returned.
    #[must_use]
    pub fn quotes(&self, force_refresh: bool) -> QuotesView {
        let snapshot = self.inner.quotes.current();
        let due = force_refresh || snapshot.is_stale(self.inner.cfg.quotes.ttl);
        let refresh_started = due && self.spawn_refresh();
        QuotesView {
            snapshot,
            refresh_started,
            refreshing: self.is_refreshing(),
        }
    }

    /// Quote for a loose symbol (canonical key, alias or venue ticker).
    ///
    /// Reads the snapshot like [`quotes`](Self::quotes), so it may start a
    /// background refresh; there is no per-symbol freshness check.
    #[must_use]
    pub fn quote(&self, symbol: &str) -> Option<Quote> {
        let key = self.inner.registry.resolve(symbol)?;
        self.quotes(false).snapshot.get(key).cloned()
    }

    /// Top `n` gainers and top `n` losers by percent change, read from the
    /// current snapshot.
    ///
    /// Reads like [`quotes`](Self::quotes), so it never waits on the network
    /// and may start a background refresh. Both lists are empty before the
    /// first successful refresh. Equal changes keep registry order.
    #[must_use]
    pub fn market_movers(&self, n: usize) -> (Vec<Quote>, Vec<Quote>) {
        let snapshot = self.quotes(false).snapshot;
        let mut movers: Vec<&Quote> = self
            .inner
            .registry
            .listings()
            .iter()
            .filter_map(|l| snapshot.get(&l.symbol))
            .collect();

        movers.sort_by(|a, b| b.change_pct.total_cmp(&a.change_pct));
        let gainers = movers.iter().take(n).map(|q| (*q).clone()).collect();
        movers.sort_by(|a, b| a.change_pct.total_cmp(&b.change_pct));
        let losers = movers.iter().take(n).map(|q| (*q).clone()).collect();
        (gainers, losers)
    }

    /// Whether a quote refresh is currently running.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.inner.quotes.refreshing.load(Ordering::Acquire)
    }

    /// Run one refresh inline so the first reads find data.
    ///
    /// Returns the number of quotes in the snapshot afterwards. When another
    /// refresh is already running this does not wait for it.
    #[cfg_attr(feature = "tracing", tracing::instrument(name = "dalal::quotes::warmup", skip(self)))]
    pub async fn warmup(&self) -> usize {
        if let Some(claim) = RefreshClaim::try_claim(&self.inner) {
            let _ = self.refresh_once().await;
            drop(claim);
        }
        self.inner.quotes.current().len()
    }

    fn spawn_refresh(&self) -> bool {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            #[cfg(feature = "tracing")]
            tracing::debug!("no runtime; quote refresh skipped");
            return false;
        };
        let Some(claim) = RefreshClaim::try_claim(&self.inner) else {
            return false;
        };
        let this = self.clone();
        handle.spawn(async move {
            let _claim = claim;
            let _ = this.refresh_once().await;
        });
        true
    }

    /// Bulk fetch, then batched fallback; publishes any non-empty result.
    ///
    /// # Errors
    /// `UpstreamUnavailable` when neither strategy produced a single quote;
    /// the previous snapshot is kept.
    #[cfg_attr(feature = "tracing", tracing::instrument(name = "dalal::quotes::refresh", skip(self)))]
    async fn refresh_once(&self) -> Result<usize, DalalError> {
        let fresh = self.fetch_all_quotes().await;
        if fresh.is_empty() {
            #[cfg(feature = "tracing")]
            tracing::warn!("quote refresh returned nothing; keeping previous snapshot");
            return Err(DalalError::upstream(
                self.inner.feed.name(),
                "no quotes from bulk or batched fetch",
            ));
        }
        let n = fresh.len();
        self.inner.quotes.publish(QuoteSnapshot::new(fresh));
        #[cfg(feature = "tracing")]
        tracing::info!(quotes = n, "quote snapshot replaced");
        Ok(n)
    }

    async fn fetch_all_quotes(&self) -> HashMap<String, Quote> {
        let inner = &self.inner;
        let cfg = &inner.cfg.quotes;
        let tickers = inner.registry.venue_tickers();

        let bulk = Self::upstream_call_with_timeout(
            "daily_bars",
            cfg.bulk_timeout,
            inner.feed.daily_bars(&tickers),
        )
        .await;
        match bulk {
            Ok(bars) => {
                let parsed = quotes_from_bars(&inner.registry, &tickers, &bars);
                let needed = cfg.bulk_accept_ratio * tickers.len() as f64;
                let have = parsed.len() as f64;
                if !parsed.is_empty() && have >= needed {
                    return parsed;
                }
                #[cfg(feature = "tracing")]
                tracing::info!(parsed = parsed.len(), requested = tickers.len(), "bulk fetch too sparse; trying batches");
            }
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %_e, "bulk quote fetch failed; trying batches");
            }
        }

        let mut merged = HashMap::new();
        for (i, batch) in tickers.chunks(cfg.batch_size).enumerate() {
            if i > 0 && !cfg.batch_pause.is_zero() {
                tokio::time::sleep(cfg.batch_pause).await;
            }
            match Self::upstream_call_with_timeout(
                "daily_bars",
                cfg.batch_timeout,
                inner.feed.daily_bars(batch),
            )
            .await
            {
                Ok(bars) => merged.extend(quotes_from_bars(&inner.registry, batch, &bars)),
                Err(_e) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(batch = i, error = %_e, "quote batch failed");
                }
            }
        }
        merged
    }
}
