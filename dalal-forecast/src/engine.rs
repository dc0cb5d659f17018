use chrono::{NaiveDate, Utc};
use dalal_core::{
    DalalError, Direction, ForecastConfig, ForecastPoint, ForecastResult, ModelFallback,
    ModelKind, PricePoint, business_days_after, round2,
};

use crate::arma::Band;
use crate::preprocess::prepare;
use crate::{seasonal, trend, volatility};

/// Produces three-model forecasts from a daily closing-price series.
///
/// The engine is stateless apart from its configuration and is cheap to
/// share; identical inputs yield identical outputs (the simulation is
/// seeded), except for `computed_at`.
#[derive(Debug, Clone, Default)]
pub struct ForecastEngine {
    cfg: ForecastConfig,
}

impl ForecastEngine {
    /// Create an engine with the given parameters.
    #[must_use]
    pub const fn new(cfg: ForecastConfig) -> Self {
        Self { cfg }
    }

    /// Active parameters.
    #[must_use]
    pub const fn config(&self) -> &ForecastConfig {
        &self.cfg
    }

    /// Compute the trend, seasonal and volatility forecasts for `symbol`.
    ///
    /// Behavior:
    /// - Non-finite and non-positive prices are dropped; only the most recent
    ///   `window` observations are used.
    /// - A model whose fit fails is replaced by its fallback output and
    ///   recorded in [`ForecastResult::fallbacks`]; such failures never fail
    ///   the whole forecast.
    /// - Direction is `Up` only when the trend model's terminal forecast is
    ///   strictly above the last price.
    /// - Reported prices are rounded to two decimals.
    ///
    /// # Errors
    /// Returns [`DalalError::InsufficientHistory`] when the series is too short
    /// to forecast at all. Callers treat this as "no result" and must not cache it.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dalal_forecast::engine::forecast",
            skip(self, series),
            fields(symbol = %symbol, observations = series.len()),
        )
    )]
    pub fn forecast(
        &self,
        symbol: &str,
        display_name: &str,
        series: &[PricePoint],
    ) -> Result<ForecastResult, DalalError> {
        let cfg = &self.cfg;
        let prepared = prepare(series, cfg)?;
        let last = prepared.last_price();
        let mut fallbacks = Vec::new();

        let (trend_band, trend_order) = match trend::forecast(&prepared.prices, cfg) {
            Ok(t) => (t.band, Some(t.order)),
            Err(e) => {
                note_fallback(&mut fallbacks, symbol, ModelKind::Trend, &e);
                (Band::flat(last, cfg.horizon), None)
            }
        };

        let seasonal_band = seasonal::forecast(&prepared.prices, trend_order, cfg)
            .unwrap_or_else(|e| {
                note_fallback(&mut fallbacks, symbol, ModelKind::Seasonal, &e);
                seasonal::fallback(&trend_band, last, cfg)
            });

        let volatility_band = volatility::forecast(&prepared.returns_pct, last, cfg)
            .unwrap_or_else(|e| {
                note_fallback(&mut fallbacks, symbol, ModelKind::Volatility, &e);
                Band::flat(last, cfg.horizon)
            });

        let direction = match trend_band.terminal() {
            Some(t) if t > last => Direction::Up,
            _ => Direction::Down,
        };

        let dates = business_days_after(prepared.last_date, cfg.horizon);
        Ok(ForecastResult {
            symbol: symbol.to_string(),
            display_name: display_name.to_string(),
            last_price: round2(last),
            last_date: prepared.last_date,
            direction,
            trend: to_points(&dates, &trend_band),
            seasonal: to_points(&dates, &seasonal_band),
            volatility: to_points(&dates, &volatility_band),
            trend_order,
            fallbacks,
            computed_at: Utc::now(),
        })
    }
}

#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
fn note_fallback(out: &mut Vec<ModelFallback>, symbol: &str, model: ModelKind, err: &DalalError) {
    #[cfg(feature = "tracing")]
    tracing::warn!(symbol = %symbol, model = %model, error = %err, "model fit failed; using fallback");
    out.push(ModelFallback {
        model,
        reason: err.to_string(),
    });
}

fn to_points(dates: &[NaiveDate], band: &Band) -> Vec<ForecastPoint> {
    dates
        .iter()
        .zip(band.mean.iter().zip(band.lower.iter().zip(&band.upper)))
        .map(|(&date, (&price, (&lower, &upper)))| ForecastPoint {
            date,
            price: round2(price),
            lower: round2(lower),
            upper: round2(upper),
        })
        .collect()
}
