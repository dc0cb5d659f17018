//! Weekly-seasonal ARIMA(p, 1, q) x (1, 0, 1, s) and its drift fallback.

use dalal_core::{ArimaOrder, DalalError, ForecastConfig};

use crate::arma::{self, ArmaSpec, Band, Layout};
use crate::stats::linspace;

const MODEL: &str = "seasonal";

/// Fit on the most recent `seasonal_window` prices, reusing the trend order
/// (or `(seasonal_default_ar, 1, 0)` when the trend search failed).
pub(crate) fn forecast(
    prices: &[f64],
    trend_order: Option<ArimaOrder>,
    cfg: &ForecastConfig,
) -> Result<Band, DalalError> {
    let (p, q) = trend_order.map_or((cfg.seasonal_default_ar, 0), |o| (o.p, o.q));
    let recent = &prices[prices.len().saturating_sub(cfg.seasonal_window)..];
    let last = match recent.last() {
        Some(&v) => v,
        None => return Err(DalalError::model_fit(MODEL, "empty series")),
    };

    let w = arma::diff(recent);
    let spec = ArmaSpec::seasonal(p, q, cfg.seasonal_period);
    let fit = arma::fit(&w, &spec, Layout::for_spec(w.len(), &spec), MODEL)?;
    let mut band = arma::integrate(&fit, last, cfg.horizon, cfg.confidence_z, MODEL)?;
    band.floor_lower(last * cfg.seasonal_lower_floor);
    Ok(band)
}

/// Trend series plus a small linear drift; the trend band is kept and
/// widened by twice the drift on each side.
pub(crate) fn fallback(trend: &Band, last_price: f64, cfg: &ForecastConfig) -> Band {
    let noise = linspace(0.0, last_price * cfg.seasonal_fallback_drift, trend.mean.len());
    let mean = trend.mean.iter().zip(&noise).map(|(t, n)| t + n).collect();
    let lower = trend.lower.iter().zip(&noise).map(|(l, n)| l - 2.0 * n.abs()).collect();
    let upper = trend.upper.iter().zip(&noise).map(|(u, n)| u + 2.0 * n.abs()).collect();
    Band { mean, lower, upper }
}
