//! Dalal-specific configuration primitives and the shared error type.
#![warn(missing_docs)]

mod config;
mod error;

pub use config::{DalalConfig, ForecastConfig, ForecastStoreConfig, QuoteCacheConfig};
pub use error::DalalError;
