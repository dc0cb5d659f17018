//! GARCH(1,1) volatility model and the seeded Monte Carlo price ensemble.
//!
//! Returns are in percent (daily percentage change x 100), matching the
//! conventional scaling that keeps the likelihood well conditioned.

use dalal_core::{DalalError, ForecastConfig};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, StandardNormal};

use crate::arma::Band;
use crate::optimize::nelder_mead;
use crate::stats::{mean, percentile_sorted, sample_variance};

const MODEL: &str = "volatility";
const LN_2PI: f64 = 1.837_877_066_409_345_3;
/// Upper bound on `alpha + beta`, keeping the variance process stationary.
const PERSISTENCE_MAX: f64 = 0.999;
const MIN_RETURNS: usize = 10;

/// Fitted constant-mean GARCH(1,1) on percent returns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Garch {
    pub(crate) mu: f64,
    pub(crate) omega: f64,
    pub(crate) alpha: f64,
    pub(crate) beta: f64,
    last_resid: f64,
    last_var: f64,
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn logit(p: f64) -> f64 {
    (p / (1.0 - p)).ln()
}

/// Unconstrained optimiser coordinates to `(mu, omega, alpha, beta)`.
fn decode(x: &[f64]) -> (f64, f64, f64, f64) {
    let s = PERSISTENCE_MAX * sigmoid(x[2]);
    let alpha = s * sigmoid(x[3]);
    (x[0], x[1].exp(), alpha, s - alpha)
}

/// Variance recursion seeded with `backcast`; returns the negative
/// log-likelihood and the final residual and conditional variance.
fn filter(r: &[f64], mu: f64, omega: f64, alpha: f64, beta: f64, backcast: f64) -> (f64, f64, f64) {
    let mut h = backcast;
    let mut prev = 0.0;
    let mut nll = 0.0;
    for (t, &x) in r.iter().enumerate() {
        if t > 0 {
            h = omega + alpha * prev * prev + beta * h;
        }
        if h.is_nan() || h <= 0.0 || h.is_infinite() {
            return (f64::INFINITY, prev, h);
        }
        let e = x - mu;
        nll += 0.5 * (LN_2PI + h.ln() + e * e / h);
        prev = e;
    }
    (nll, prev, h)
}

impl Garch {
    /// Maximum-likelihood fit on percent returns.
    pub(crate) fn fit(returns_pct: &[f64], max_iter: usize) -> Result<Self, DalalError> {
        if returns_pct.len() < MIN_RETURNS {
            return Err(DalalError::model_fit(
                MODEL,
                format!("{} returns too few", returns_pct.len()),
            ));
        }
        if returns_pct.iter().any(|v| !v.is_finite()) {
            return Err(DalalError::model_fit(MODEL, "non-finite returns"));
        }
        let var = sample_variance(returns_pct);
        if var.is_nan() || var <= 1e-12 {
            return Err(DalalError::model_fit(MODEL, "returns have no variance"));
        }
        let mu0 = mean(returns_pct);

        let x0 = [
            mu0,
            (0.1 * var).ln(),
            logit(0.9 / PERSISTENCE_MAX),
            logit(0.1 / 0.9),
        ];
        let step = [0.1 * var.sqrt(), 0.5, 0.5, 0.5];
        let objective = |x: &[f64]| {
            let (mu, omega, alpha, beta) = decode(x);
            filter(returns_pct, mu, omega, alpha, beta, var).0
        };
        let best = nelder_mead(objective, &x0, &step, max_iter, 1e-9);
        if !best.value.is_finite() {
            return Err(DalalError::model_fit(MODEL, "likelihood did not converge"));
        }

        let (mu, omega, alpha, beta) = decode(&best.x);
        let (_, last_resid, last_var) = filter(returns_pct, mu, omega, alpha, beta, var);
        let fit = Self {
            mu,
            omega,
            alpha,
            beta,
            last_resid,
            last_var,
        };
        if [mu, omega, alpha, beta, last_resid, last_var]
            .iter()
            .any(|v| !v.is_finite())
        {
            return Err(DalalError::model_fit(MODEL, "non-finite parameters"));
        }
        Ok(fit)
    }

    /// Conditional variance forecasts for the next `steps` days.
    pub(crate) fn variance_forecast(&self, steps: usize) -> Vec<f64> {
        let mut out = Vec::with_capacity(steps);
        let mut h = self.omega + self.alpha * self.last_resid * self.last_resid + self.beta * self.last_var;
        for _ in 0..steps {
            out.push(h);
            h = self.omega + (self.alpha + self.beta) * h;
        }
        out
    }
}

/// Simulate price paths compounding `mu + sigma_t * z` returns from
/// `last_price`, and summarise each step by its median and percentile band.
///
/// `mu_pct` and `variances` are in percent units. The generator is seeded,
/// so equal inputs produce equal bands.
pub(crate) fn simulate_band(
    last_price: f64,
    mu_pct: f64,
    variances: &[f64],
    cfg: &ForecastConfig,
) -> Band {
    let steps = variances.len();
    let paths = cfg.simulation_paths.max(1);
    let sigmas: Vec<f64> = variances.iter().map(|v| v.max(0.0).sqrt() / 100.0).collect();
    let drift = mu_pct / 100.0;

    let mut rng = StdRng::seed_from_u64(cfg.simulation_seed);
    let mut by_step: Vec<Vec<f64>> = (0..steps).map(|_| Vec::with_capacity(paths)).collect();
    for _ in 0..paths {
        let mut price = last_price;
        for (t, sigma) in sigmas.iter().enumerate() {
            let z: f64 = StandardNormal.sample(&mut rng);
            price *= 1.0 + drift + sigma * z;
            by_step[t].push(price);
        }
    }

    let mut band = Band {
        mean: Vec::with_capacity(steps),
        lower: Vec::with_capacity(steps),
        upper: Vec::with_capacity(steps),
    };
    for mut prices in by_step {
        prices.sort_by(f64::total_cmp);
        band.mean.push(percentile_sorted(&prices, 50.0));
        band.lower.push(percentile_sorted(&prices, cfg.band_low_pct));
        band.upper.push(percentile_sorted(&prices, cfg.band_high_pct));
    }
    band.floor_lower(last_price * cfg.volatility_lower_floor);
    band
}

/// Fit the variance model to `returns_pct` and simulate the price band.
pub(crate) fn forecast(
    returns_pct: &[f64],
    last_price: f64,
    cfg: &ForecastConfig,
) -> Result<Band, DalalError> {
    let garch = Garch::fit(returns_pct, cfg.garch_max_iter)?;
    let variances = garch.variance_forecast(cfg.horizon);
    Ok(simulate_band(last_price, garch.mu, &variances, cfg))
}
