//! Non-seasonal ARIMA(p, 1, q) with order chosen by information criterion.

use dalal_core::{ArimaOrder, DalalError, ForecastConfig};

use crate::arma::{self, ArmaFit, ArmaSpec, Band, Layout};

const MODEL: &str = "trend";

#[derive(Debug, Clone)]
pub(crate) struct TrendForecast {
    pub(crate) order: ArimaOrder,
    pub(crate) band: Band,
}

/// Search `p in 0..=max_ar`, `q in 0..=max_ma` on first differences and keep
/// the lowest-AIC candidate. Ties keep the earlier (smaller) order.
pub(crate) fn forecast(prices: &[f64], cfg: &ForecastConfig) -> Result<TrendForecast, DalalError> {
    let last = match prices.last() {
        Some(&p) => p,
        None => return Err(DalalError::model_fit(MODEL, "empty series")),
    };
    let w = arma::diff(prices);
    let layout = Layout::covering(w.len(), cfg.max_ar, cfg.max_ma);

    let mut best: Option<(usize, usize, ArmaFit)> = None;
    let mut last_err = None;
    for p in 0..=cfg.max_ar {
        for q in 0..=cfg.max_ma {
            match arma::fit(&w, &ArmaSpec::contiguous(p, q), layout, MODEL) {
                Ok(fit) => {
                    if best.as_ref().is_none_or(|(_, _, b)| fit.aic() < b.aic()) {
                        best = Some((p, q, fit));
                    }
                }
                Err(e) => last_err = Some(e),
            }
        }
    }

    let Some((p, q, fit)) = best else {
        return Err(last_err
            .unwrap_or_else(|| DalalError::model_fit(MODEL, "no candidate order fitted")));
    };
    let band = arma::integrate(&fit, last, cfg.horizon, cfg.confidence_z, MODEL)?;
    Ok(TrendForecast {
        order: ArimaOrder { p, d: 1, q },
        band,
    })
}
