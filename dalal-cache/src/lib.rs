//! dalal-cache
//!
//! Storage and coordination pieces behind the forecast store:
//!
//! - [`FastTier`]: bounded in-process map of recent forecasts.
//! - [`DurableTier`]: one JSON record per symbol on disk, written atomically,
//!   surviving restarts.
//! - [`LockRegistry`]: one async mutex per symbol so that at most one
//!   computation per symbol runs at a time.
//!
//! Both tiers judge freshness by the age of the record (time since it was
//! written), never by when it was last read, so promoting a durable record
//! into the fast tier does not extend its life.
#![warn(missing_docs)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dalal_core::ForecastResult;

mod durable;
mod fast;
mod locks;

pub use durable::{DurableTier, safe_file_name};
pub use fast::FastTier;
pub use locks::{LockRegistry, SymbolLock};

/// A forecast together with the time it was stored.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedForecast {
    /// The cached forecast.
    pub result: Arc<ForecastResult>,
    /// When the forecast was first written to a cache tier.
    pub written_at: DateTime<Utc>,
}

impl CachedForecast {
    /// Wrap a freshly computed forecast, stamped now.
    #[must_use]
    pub fn now(result: Arc<ForecastResult>) -> Self {
        Self {
            result,
            written_at: Utc::now(),
        }
    }

    /// Age at `now`; records stamped in the future count as age zero.
    #[must_use]
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.written_at).to_std().unwrap_or(Duration::ZERO)
    }

    /// Whether the record is strictly younger than `ttl` at `now`.
    #[must_use]
    pub fn is_fresh(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        self.age(now) < ttl
    }
}
