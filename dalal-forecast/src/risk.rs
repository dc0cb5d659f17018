use dalal_core::{Listing, round2};
use serde::{Deserialize, Serialize};

use crate::stats::{mean, sample_std};

/// Minimum number of prices before risk metrics are reported.
pub const MIN_OBSERVATIONS: usize = 100;
/// Trading days per year used for annualisation.
pub const TRADING_DAYS: f64 = 252.0;

/// Annualised return, volatility and Sharpe ratio for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    /// Canonical symbol.
    pub symbol: String,
    /// Human-readable name.
    pub name: String,
    /// Sector tag.
    pub sector: String,
    /// Compounded annual return in percent.
    pub annual_return_pct: f64,
    /// Annualised volatility in percent.
    pub volatility_pct: f64,
    /// Return over volatility, without a risk-free rate.
    pub sharpe: f64,
}

/// Compute risk metrics from a listing's closing prices.
///
/// Returns `None` for fewer than [`MIN_OBSERVATIONS`] prices or when no
/// finite daily return can be derived.
#[must_use]
pub fn risk_metrics(listing: &Listing, prices: &[f64]) -> Option<RiskMetrics> {
    if prices.len() < MIN_OBSERVATIONS {
        return None;
    }
    let daily: Vec<f64> = prices
        .windows(2)
        .map(|w| w[1] / w[0] - 1.0)
        .filter(|r| r.is_finite())
        .collect();
    if daily.is_empty() {
        return None;
    }

    let annual_return = (1.0 + mean(&daily)).powf(TRADING_DAYS) - 1.0;
    let annual_vol = sample_std(&daily) * TRADING_DAYS.sqrt();
    let sharpe = if annual_vol == 0.0 {
        0.0
    } else {
        annual_return / annual_vol
    };

    Some(RiskMetrics {
        symbol: listing.symbol.clone(),
        name: listing.name.clone(),
        sector: listing.sector.clone(),
        annual_return_pct: round2(annual_return * 100.0),
        volatility_pct: round2(annual_vol * 100.0),
        sharpe: round2(sharpe),
    })
}

/// Sort by Sharpe ratio, best first. Equal ratios keep their input order.
#[must_use]
pub fn rank_by_sharpe(mut metrics: Vec<RiskMetrics>) -> Vec<RiskMetrics> {
    metrics.sort_by(|a, b| b.sharpe.total_cmp(&a.sharpe));
    metrics
}
