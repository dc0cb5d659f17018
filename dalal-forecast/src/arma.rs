//! ARMA estimation on a differenced series by two-stage least squares.
//!
//! Stage one fits a long autoregression to recover innovation estimates;
//! stage two regresses the series on its own lags and on lagged innovations
//! (Hannan-Rissanen). Lag sets are arbitrary, which lets the same code fit a
//! plain `(p, q)` model and a multiplicative weekly-seasonal one with its
//! polynomial products expanded into free coefficients.

use dalal_core::DalalError;

use crate::linalg::NormalEquations;

const RIDGE: f64 = 1e-8;

/// Which lags enter the autoregressive and moving-average parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ArmaSpec {
    ar_lags: Vec<usize>,
    ma_lags: Vec<usize>,
}

impl ArmaSpec {
    pub(crate) fn new(mut ar_lags: Vec<usize>, mut ma_lags: Vec<usize>) -> Self {
        for v in [&mut ar_lags, &mut ma_lags] {
            v.retain(|&l| l > 0);
            v.sort_unstable();
            v.dedup();
        }
        Self { ar_lags, ma_lags }
    }

    /// Plain ARMA(p, q).
    pub(crate) fn contiguous(p: usize, q: usize) -> Self {
        Self::new((1..=p).collect(), (1..=q).collect())
    }

    /// ARMA(p, q) x (1, 1) with the given seasonal period.
    ///
    /// `(1 - a(B))(1 - A B^s)` expands to lags `1..=p`, `s` and `s+1..=s+p`;
    /// the moving-average side expands the same way with `q`.
    pub(crate) fn seasonal(p: usize, q: usize, period: usize) -> Self {
        let expand = |order: usize| -> Vec<usize> {
            (1..=order)
                .chain(std::iter::once(period))
                .chain((1..=order).map(|l| period + l))
                .collect()
        };
        Self::new(expand(p), expand(q))
    }

    pub(crate) fn max_ar(&self) -> usize {
        self.ar_lags.last().copied().unwrap_or(0)
    }

    pub(crate) fn max_ma(&self) -> usize {
        self.ma_lags.last().copied().unwrap_or(0)
    }

    pub(crate) fn n_params(&self) -> usize {
        1 + self.ar_lags.len() + self.ma_lags.len()
    }
}

/// Sample layout: the long-AR order of stage one and the first regression row.
///
/// Holding `start` fixed across candidate orders keeps their information
/// criteria comparable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Layout {
    pub(crate) long_ar: usize,
    pub(crate) start: usize,
}

impl Layout {
    /// Layout able to host every spec with AR lags up to `max_ar` and MA lags
    /// up to `max_ma` on a series of length `n`.
    pub(crate) fn covering(n: usize, max_ar: usize, max_ma: usize) -> Self {
        if max_ma == 0 {
            return Self {
                long_ar: 0,
                start: max_ar,
            };
        }
        let max_lag = max_ar.max(max_ma);
        let long_ar = (2 * max_lag).min((n / 5).max(1)).max(1);
        Self {
            long_ar,
            start: (long_ar + max_ma).max(max_ar),
        }
    }

    pub(crate) fn for_spec(n: usize, spec: &ArmaSpec) -> Self {
        Self::covering(n, spec.max_ar(), spec.max_ma())
    }
}

/// A fitted ARMA model together with the data it was fitted on.
#[derive(Debug, Clone)]
pub(crate) struct ArmaFit {
    spec: ArmaSpec,
    intercept: f64,
    ar: Vec<f64>,
    ma: Vec<f64>,
    sigma2: f64,
    aic: f64,
    data: Vec<f64>,
    residuals: Vec<f64>,
}

fn long_ar_residuals(w: &[f64], order: usize) -> Option<Vec<f64>> {
    let n = w.len();
    let mut e = vec![0.0; n];
    if order == 0 {
        return Some(e);
    }
    let mut ne = NormalEquations::new(order + 1);
    let mut row = vec![0.0; order + 1];
    let fill = |t: usize, row: &mut [f64]| {
        row[0] = 1.0;
        for l in 1..=order {
            row[l] = w[t - l];
        }
    };
    for t in order..n {
        fill(t, &mut row);
        ne.add(&row, w[t]);
    }
    let beta = ne.solve(RIDGE)?;
    for t in order..n {
        fill(t, &mut row);
        e[t] = w[t] - dot(&beta, &row);
    }
    Some(e)
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Fit `spec` to `w` using the given sample layout.
pub(crate) fn fit(
    w: &[f64],
    spec: &ArmaSpec,
    layout: Layout,
    model: &str,
) -> Result<ArmaFit, DalalError> {
    let n = w.len();
    let k = spec.n_params();
    if layout.start < spec.max_ar()
        || (spec.max_ma() > 0 && layout.start < layout.long_ar + spec.max_ma())
    {
        return Err(DalalError::model_fit(model, "layout does not cover the lag set"));
    }
    if n < layout.start + k + 3 {
        return Err(DalalError::model_fit(
            model,
            format!("{n} observations too few for {k} parameters"),
        ));
    }
    if w.iter().any(|v| !v.is_finite()) {
        return Err(DalalError::model_fit(model, "non-finite input"));
    }

    let innovations = if spec.ma_lags.is_empty() {
        vec![0.0; n]
    } else {
        long_ar_residuals(w, layout.long_ar)
            .ok_or_else(|| DalalError::model_fit(model, "long autoregression is singular"))?
    };

    let mut row = vec![0.0; k];
    let fill = |t: usize, row: &mut [f64]| {
        row[0] = 1.0;
        let mut i = 1;
        for &l in &spec.ar_lags {
            row[i] = w[t - l];
            i += 1;
        }
        for &l in &spec.ma_lags {
            row[i] = innovations[t - l];
            i += 1;
        }
    };

    let mut ne = NormalEquations::new(k);
    for t in layout.start..n {
        fill(t, &mut row);
        ne.add(&row, w[t]);
    }
    let beta = ne
        .solve(RIDGE)
        .ok_or_else(|| DalalError::model_fit(model, "singular design"))?;

    let mut residuals = innovations.clone();
    let mut rss = 0.0;
    for t in layout.start..n {
        fill(t, &mut row);
        let e = w[t] - dot(&beta, &row);
        residuals[t] = e;
        rss += e * e;
    }

    let n_eff = ne.rows();
    let scale = w.iter().map(|v| v * v).sum::<f64>() / n as f64;
    // A perfect fit (e.g. constant differences) would send the criterion to
    // minus infinity; floor the variance relative to the data's scale.
    let sigma2 = (rss / n_eff as f64).max(1e-10 * scale.max(1e-12));
    let aic = (n_eff as f64).mul_add(sigma2.ln(), 2.0 * (k + 1) as f64);
    if !aic.is_finite() {
        return Err(DalalError::model_fit(model, "non-finite information criterion"));
    }

    let n_ar = spec.ar_lags.len();
    Ok(ArmaFit {
        spec: spec.clone(),
        intercept: beta[0],
        ar: beta[1..=n_ar].to_vec(),
        ma: beta[1 + n_ar..].to_vec(),
        sigma2,
        aic,
        data: w.to_vec(),
        residuals,
    })
}

impl ArmaFit {
    pub(crate) const fn aic(&self) -> f64 {
        self.aic
    }

    pub(crate) const fn sigma2(&self) -> f64 {
        self.sigma2
    }

    /// Out-of-sample forecasts of the fitted series for `steps` steps.
    pub(crate) fn forecast(&self, steps: usize) -> Vec<f64> {
        let n = self.data.len();
        let mut x = self.data.clone();
        let mut e = self.residuals.clone();
        x.reserve(steps);
        e.reserve(steps);
        for h in 0..steps {
            let t = n + h;
            let mut v = self.intercept;
            for (&l, a) in self.spec.ar_lags.iter().zip(&self.ar) {
                v += a * x[t - l];
            }
            for (&l, b) in self.spec.ma_lags.iter().zip(&self.ma) {
                v += b * e[t - l];
            }
            x.push(v);
            e.push(0.0);
        }
        x.split_off(n)
    }

    /// MA(infinity) weights `psi_0..psi_{count-1}`.
    pub(crate) fn psi_weights(&self, count: usize) -> Vec<f64> {
        let mut psi = Vec::with_capacity(count);
        for j in 0..count {
            if j == 0 {
                psi.push(1.0);
                continue;
            }
            let mut v = self
                .spec
                .ma_lags
                .iter()
                .zip(&self.ma)
                .find(|(l, _)| **l == j)
                .map_or(0.0, |(_, b)| *b);
            for (&l, a) in self.spec.ar_lags.iter().zip(&self.ar) {
                if l <= j {
                    v += a * psi[j - l];
                }
            }
            psi.push(v);
        }
        psi
    }
}

/// Price-level forecast with a symmetric or floored band.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Band {
    pub(crate) mean: Vec<f64>,
    pub(crate) lower: Vec<f64>,
    pub(crate) upper: Vec<f64>,
}

impl Band {
    /// Flat line at `level` with zero width.
    pub(crate) fn flat(level: f64, steps: usize) -> Self {
        Self {
            mean: vec![level; steps],
            lower: vec![level; steps],
            upper: vec![level; steps],
        }
    }

    pub(crate) fn terminal(&self) -> Option<f64> {
        self.mean.last().copied()
    }

    pub(crate) fn floor_lower(&mut self, floor: f64) {
        for v in &mut self.lower {
            *v = v.max(floor);
        }
    }

    fn is_finite(&self) -> bool {
        self.mean
            .iter()
            .chain(&self.lower)
            .chain(&self.upper)
            .all(|v| v.is_finite())
    }
}

/// First differences.
pub(crate) fn diff(xs: &[f64]) -> Vec<f64> {
    xs.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Undo one order of differencing: price-level forecast and `z`-sigma band.
pub(crate) fn integrate(
    fit: &ArmaFit,
    last_level: f64,
    steps: usize,
    z: f64,
    model: &str,
) -> Result<Band, DalalError> {
    let dw = fit.forecast(steps);
    let psi = fit.psi_weights(steps);

    let mut band = Band {
        mean: Vec::with_capacity(steps),
        lower: Vec::with_capacity(steps),
        upper: Vec::with_capacity(steps),
    };
    let mut level = last_level;
    let mut cum_psi = 0.0;
    let mut var_sum = 0.0;
    for (d, p) in dw.iter().zip(&psi) {
        level += d;
        cum_psi += p;
        var_sum += cum_psi * cum_psi;
        let half = z * (fit.sigma2() * var_sum).sqrt();
        band.mean.push(level);
        band.lower.push(level - half);
        band.upper.push(level + half);
    }
    if !band.is_finite() {
        return Err(DalalError::model_fit(model, "forecast diverged"));
    }
    Ok(band)
}
