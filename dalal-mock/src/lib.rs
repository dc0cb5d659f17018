//! Scriptable mocks for the dalal upstream traits.
//!
//! [`MockQuoteFeed`] and [`MockSeriesProvider`] defer every call to a
//! controller handle, so tests can make an upstream return data, fail, stall
//! for a while, or hang forever, and can count how often it was called.
//! [`fixtures`] generates deterministic price series and daily bars.
#![warn(missing_docs)]

mod dynamic;
pub mod fixtures;

pub use dynamic::{
    FeedController, MockBehavior, MockQuoteFeed, MockSeriesProvider, SeriesController,
};
