//! Derivative-free minimisation (Nelder-Mead simplex).

const REFLECT: f64 = 1.0;
const EXPAND: f64 = 2.0;
const CONTRACT: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Outcome of a minimisation run.
#[derive(Debug, Clone)]
pub(crate) struct Minimum {
    pub(crate) x: Vec<f64>,
    pub(crate) value: f64,
    pub(crate) iterations: usize,
}

/// Minimise `f` starting from `x0`, with the initial simplex offset by `step`
/// along each axis. Non-finite objective values are treated as `+inf`.
pub(crate) fn nelder_mead(
    f: impl Fn(&[f64]) -> f64,
    x0: &[f64],
    step: &[f64],
    max_iter: usize,
    tol: f64,
) -> Minimum {
    let n = x0.len();
    let eval = |x: &[f64]| {
        let v = f(x);
        if v.is_finite() { v } else { f64::INFINITY }
    };

    let mut simplex: Vec<(Vec<f64>, f64)> = Vec::with_capacity(n + 1);
    simplex.push((x0.to_vec(), eval(x0)));
    for i in 0..n {
        let mut x = x0.to_vec();
        x[i] += step[i];
        let v = eval(&x);
        simplex.push((x, v));
    }

    let mut iterations = 0;
    while iterations < max_iter {
        simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
        let best = simplex[0].1;
        let worst = simplex[n].1;
        if best.is_finite() && (worst - best).abs() <= tol * (best.abs() + tol) {
            break;
        }
        iterations += 1;

        let centroid: Vec<f64> = (0..n)
            .map(|j| simplex[..n].iter().map(|(x, _)| x[j]).sum::<f64>() / n as f64)
            .collect();
        let along = |coef: f64| -> Vec<f64> {
            centroid
                .iter()
                .zip(&simplex[n].0)
                .map(|(c, w)| c + coef * (c - w))
                .collect()
        };

        let xr = along(REFLECT);
        let fr = eval(&xr);
        if fr < simplex[0].1 {
            let xe = along(EXPAND);
            let fe = eval(&xe);
            simplex[n] = if fe < fr { (xe, fe) } else { (xr, fr) };
            continue;
        }
        if fr < simplex[n - 1].1 {
            simplex[n] = (xr, fr);
            continue;
        }
        let (xc, fc) = if fr < simplex[n].1 {
            let xc = along(CONTRACT * REFLECT);
            let fc = eval(&xc);
            (xc, fc)
        } else {
            let xc = along(-CONTRACT);
            let fc = eval(&xc);
            (xc, fc)
        };
        if fc < fr.min(simplex[n].1) {
            simplex[n] = (xc, fc);
            continue;
        }
        let x_best = simplex[0].0.clone();
        for (x, v) in simplex.iter_mut().skip(1) {
            for (xi, bi) in x.iter_mut().zip(&x_best) {
                *xi = bi + SHRINK * (*xi - bi);
            }
            *v = eval(x);
        }
    }

    simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
    let (x, value) = simplex.swap_remove(0);
    Minimum {
        x,
        value,
        iterations,
    }
}
