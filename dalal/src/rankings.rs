use dalal_core::CacheTier;
use dalal_forecast::{RiskMetrics, rank_by_sharpe, risk_metrics};
use tokio::task::JoinHandle;

use crate::{Dalal, ForecastOutcome};

impl Dalal {
    /// Annualised risk metrics for every tracked instrument, best Sharpe first.
    ///
    /// Histories are fetched concurrently under the history deadline.
    /// Instruments whose history fails, times out, or has fewer than 100
    /// prices are left out.
    #[cfg_attr(feature = "tracing", tracing::instrument(name = "dalal::rankings::risk_rankings", skip(self)))]
    pub async fn risk_rankings(&self) -> Vec<RiskMetrics> {
        let timeout = self.inner.cfg.store.history_timeout;
        let tasks = self.inner.registry.listings().iter().map(|listing| async move {
            let series = Self::upstream_call_with_timeout(
                "series",
                timeout,
                self.inner.history.series(&listing.symbol),
            )
            .await;
            match series {
                Ok(points) => {
                    let prices: Vec<f64> = points
                        .iter()
                        .map(|p| p.price)
                        .filter(|p| p.is_finite() && *p > 0.0)
                        .collect();
                    risk_metrics(listing, &prices)
                }
                Err(_e) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(symbol = %listing.symbol, error = %_e, "history unavailable for risk metrics");
                    None
                }
            }
        });
        let metrics = futures::future::join_all(tasks)
            .await
            .into_iter()
            .flatten()
            .collect();
        rank_by_sharpe(metrics)
    }

    /// Compute forecasts for the `n` best-ranked instruments in the background.
    ///
    /// Symbols already cached in either tier are skipped; failures are
    /// logged and skipped. Returns the task handle so callers may await
    /// completion; dropping it leaves the task running.
    pub fn prewarm_top(&self, n: usize) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            let ranked = this.risk_rankings().await;
            for m in ranked.into_iter().take(n) {
                if this.forecast_status(&m.symbol).await.tier != CacheTier::None {
                    continue;
                }
                let outcome = this.forecast(&m.symbol).await;
                log_prewarm(&m.symbol, &outcome);
            }
        })
    }
}

#[cfg(feature = "tracing")]
fn log_prewarm(symbol: &str, outcome: &ForecastOutcome) {
    match outcome {
        ForecastOutcome::Ready(_) => tracing::info!(symbol = %symbol, "prewarmed forecast"),
        other => tracing::warn!(symbol = %symbol, outcome = ?other, "prewarm produced no forecast"),
    }
}

#[cfg(not(feature = "tracing"))]
const fn log_prewarm(_symbol: &str, _outcome: &ForecastOutcome) {}
