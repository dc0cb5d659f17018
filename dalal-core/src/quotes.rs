use std::collections::HashMap;

use crate::connector::BarsByTicker;
use crate::registry::{Listing, Registry};
use crate::types::{DailyBar, Provenance, Quote};

/// Round to two decimal places.
#[must_use]
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn last_finite(bars: &[DailyBar], field: impl Fn(&DailyBar) -> f64) -> Option<f64> {
    bars.iter().rev().map(field).find(|v| v.is_finite())
}

/// Build a quote for `listing` from its recent daily bars.
///
/// Uses the last two finite closes; with a single close the previous close
/// equals the last one. Returns `None` when no bar carries a finite close.
#[must_use]
pub fn quote_from_bars(listing: &Listing, bars: &[DailyBar]) -> Option<Quote> {
    let mut closes = bars.iter().map(|b| b.close).filter(|c| c.is_finite());
    let last = closes.next_back()?;
    let prev = closes.next_back().unwrap_or(last);

    let change_pct = if prev == 0.0 {
        0.0
    } else {
        round2((last - prev) / prev * 100.0)
    };

    Some(Quote {
        symbol: listing.symbol.clone(),
        name: listing.name.clone(),
        sector: listing.sector.clone(),
        venue_ticker: listing.venue_ticker.clone(),
        last: round2(last),
        previous_close: round2(prev),
        change: round2(last - prev),
        change_pct,
        open: last_finite(bars, |b| b.open).map(round2),
        high: last_finite(bars, |b| b.high).map(round2),
        low: last_finite(bars, |b| b.low).map(round2),
        volume: bars.iter().rev().find_map(|b| b.volume).unwrap_or(0),
        provenance: Provenance::Live,
    })
}

/// Parse quotes for the `requested` venue tickers out of a feed response.
///
/// Tickers the registry does not know, tickers that were not requested, and
/// tickers without a usable close are skipped. The result is keyed by
/// canonical symbol.
#[must_use]
pub fn quotes_from_bars(
    registry: &Registry,
    requested: &[String],
    bars: &BarsByTicker,
) -> HashMap<String, Quote> {
    requested
        .iter()
        .filter_map(|ticker| {
            let listing = registry.by_venue_ticker(ticker)?;
            let quote = quote_from_bars(listing, bars.get(ticker)?)?;
            Some((listing.symbol.clone(), quote))
        })
        .collect()
}
