//! Small dense least-squares helpers for the ARMA regressions.
//!
//! Designs here have at most a couple of dozen columns, so normal equations
//! solved by Gaussian elimination with partial pivoting are sufficient.

/// Accumulates `X'X` and `X'y` one row at a time.
pub(crate) struct NormalEquations {
    k: usize,
    xtx: Vec<f64>,
    xty: Vec<f64>,
    rows: usize,
}

impl NormalEquations {
    pub(crate) fn new(k: usize) -> Self {
        Self {
            k,
            xtx: vec![0.0; k * k],
            xty: vec![0.0; k],
            rows: 0,
        }
    }

    pub(crate) fn add(&mut self, row: &[f64], y: f64) {
        debug_assert_eq!(row.len(), self.k);
        for i in 0..self.k {
            let ri = row[i];
            self.xty[i] += ri * y;
            for j in i..self.k {
                self.xtx[i * self.k + j] += ri * row[j];
            }
        }
        self.rows += 1;
    }

    pub(crate) const fn rows(&self) -> usize {
        self.rows
    }

    /// Solve with a ridge term scaled to the mean diagonal of `X'X`.
    ///
    /// The ridge keeps collinear designs (e.g. a perfectly linear price path,
    /// whose differences are constant) solvable without visibly moving
    /// well-conditioned solutions.
    pub(crate) fn solve(&self, ridge_rel: f64) -> Option<Vec<f64>> {
        let k = self.k;
        let mut a = vec![0.0; k * k];
        for i in 0..k {
            for j in i..k {
                let v = self.xtx[i * k + j];
                a[i * k + j] = v;
                a[j * k + i] = v;
            }
        }
        let trace: f64 = (0..k).map(|i| a[i * k + i]).sum();
        let lambda = ridge_rel * (trace / k as f64).max(1e-12);
        for i in 0..k {
            a[i * k + i] += lambda;
        }
        solve_dense(a, self.xty.clone(), k)
    }
}

/// Solve `A x = b` in place. Returns `None` for singular or non-finite systems.
pub(crate) fn solve_dense(mut a: Vec<f64>, mut b: Vec<f64>, n: usize) -> Option<Vec<f64>> {
    for col in 0..n {
        let pivot = (col..n).max_by(|&x, &y| a[x * n + col].abs().total_cmp(&a[y * n + col].abs()))?;
        let pv = a[pivot * n + col];
        if !pv.is_finite() || pv.abs() < 1e-300 {
            return None;
        }
        if pivot != col {
            for j in 0..n {
                a.swap(col * n + j, pivot * n + j);
            }
            b.swap(col, pivot);
        }
        for row in (col + 1)..n {
            let f = a[row * n + col] / a[col * n + col];
            if f == 0.0 {
                continue;
            }
            for j in col..n {
                a[row * n + j] -= f * a[col * n + j];
            }
            b[row] -= f * b[col];
        }
    }
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut s = b[i];
        for j in (i + 1)..n {
            s -= a[i * n + j] * x[j];
        }
        x[i] = s / a[i * n + i];
    }
    x.iter().all(|v| v.is_finite()).then_some(x)
}
