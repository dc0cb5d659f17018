use std::time::Duration;

use chrono::Utc;
use moka::future::Cache;

use crate::CachedForecast;

/// Bounded in-memory forecast map keyed by canonical symbol.
///
/// Entries older than the configured TTL are treated as absent and evicted
/// on read.
#[derive(Clone)]
pub struct FastTier {
    inner: Cache<String, CachedForecast>,
    ttl: Duration,
}

impl std::fmt::Debug for FastTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastTier")
            .field("entries", &self.inner.entry_count())
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl FastTier {
    /// Create a tier holding at most `capacity` forecasts for at most `ttl`.
    #[must_use]
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        let inner = Cache::builder()
            .max_capacity(capacity.max(1))
            .time_to_live(ttl.max(Duration::from_millis(1)))
            .build();
        Self { inner, ttl }
    }

    /// Fresh entry for `symbol`, if any.
    pub async fn get(&self, symbol: &str) -> Option<CachedForecast> {
        let entry = self.inner.get(symbol).await?;
        if entry.is_fresh(self.ttl, Utc::now()) {
            return Some(entry);
        }
        self.inner.invalidate(symbol).await;
        None
    }

    /// Store an entry, replacing any previous one for `symbol`.
    pub async fn insert(&self, symbol: &str, entry: CachedForecast) {
        self.inner.insert(symbol.to_string(), entry).await;
    }

    /// Drop the entry for `symbol`.
    pub async fn invalidate(&self, symbol: &str) {
        self.inner.invalidate(symbol).await;
    }
}
