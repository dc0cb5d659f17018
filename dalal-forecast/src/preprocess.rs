use chrono::NaiveDate;
use dalal_core::{DalalError, ForecastConfig, PricePoint};

/// Cleaned, windowed history ready for model fitting.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Prepared {
    pub(crate) prices: Vec<f64>,
    pub(crate) last_date: NaiveDate,
    /// Daily percentage returns in percent units.
    pub(crate) returns_pct: Vec<f64>,
    pub(crate) log_returns: Vec<f64>,
}

impl Prepared {
    pub(crate) fn last_price(&self) -> f64 {
        self.prices.last().copied().unwrap_or(f64::NAN)
    }
}

/// Drop unusable observations, keep the most recent `window`, and derive returns.
///
/// Fails with [`DalalError::InsufficientHistory`] when fewer than
/// `min_observations` usable prices exist, or when the window yields fewer
/// than `min_returns` returns.
pub(crate) fn prepare(series: &[PricePoint], cfg: &ForecastConfig) -> Result<Prepared, DalalError> {
    let clean: Vec<&PricePoint> = series
        .iter()
        .filter(|p| p.price.is_finite() && p.price > 0.0)
        .collect();
    if clean.len() < cfg.min_observations {
        return Err(DalalError::InsufficientHistory {
            have: clean.len(),
            need: cfg.min_observations,
        });
    }

    let windowed = &clean[clean.len().saturating_sub(cfg.window)..];
    let prices: Vec<f64> = windowed.iter().map(|p| p.price).collect();
    let last_date = match windowed.last() {
        Some(p) => p.date,
        None => {
            return Err(DalalError::InsufficientHistory {
                have: 0,
                need: cfg.min_observations.max(1),
            });
        }
    };

    let returns_pct: Vec<f64> = prices
        .windows(2)
        .map(|w| (w[1] / w[0] - 1.0) * 100.0)
        .collect();
    let log_returns: Vec<f64> = prices.windows(2).map(|w| (w[1] / w[0]).ln()).collect();
    if log_returns.len() < cfg.min_returns {
        return Err(DalalError::InsufficientHistory {
            have: log_returns.len(),
            need: cfg.min_returns,
        });
    }

    Ok(Prepared {
        prices,
        last_date,
        returns_pct,
        log_returns,
    })
}
