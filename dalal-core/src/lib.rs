//! dalal-core
//!
//! Core types, traits, and utilities shared across the dalal workspace.
//!
//! - `types`: quotes, daily bars, price points and forecast results.
//! - `connector`: the upstream `QuoteFeed` and `PriceSeriesProvider` traits.
//! - `registry`: tracked instruments and loose symbol resolution.
//! - `calendar`: business-day helpers used to date forecast horizons.
//! - `quotes`: turning upstream daily bars into quotes.
//!
//! Async runtime (Tokio)
//! ---------------------
//! The traits here are runtime-agnostic `async_trait`s, but the service crate
//! that drives them assumes a Tokio 1.x runtime for spawning and deadlines.
#![warn(missing_docs)]

/// Business-day calendar helpers.
pub mod calendar;
/// Upstream collaborator traits.
pub mod connector;
/// Quote construction from daily bars.
pub mod quotes;
/// Registry of tracked instruments.
pub mod registry;
/// Quotes, bars, price points and forecast results.
pub mod types;

pub use calendar::{business_days_after, is_business_day};
pub use connector::{PriceSeriesProvider, QuoteFeed};
pub use dalal_types::{DalalConfig, DalalError, ForecastConfig, ForecastStoreConfig, QuoteCacheConfig};
pub use quotes::{quote_from_bars, quotes_from_bars, round2};
pub use registry::{Listing, Registry};
pub use types::*;
