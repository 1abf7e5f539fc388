//! Brent's univariate minimizer: golden-section search with parabolic steps.

use super::minimizer::{BoundedProblem, Minimizer};
use super::types::StopReason;

/// 2 − golden ratio.
const GOLDEN_SECTION: f64 = 0.381_966_011_250_105;

#[derive(Debug, Clone)]
pub struct BrentMinimizer {
    pub relative_tolerance: f64,
    /// Absolute tolerance as a fraction of the bound range.
    pub absolute_tolerance: f64,
    pub max_iterations: usize,
}

impl Default for BrentMinimizer {
    fn default() -> Self {
        Self {
            relative_tolerance: 1e-8,
            absolute_tolerance: 1e-9,
            max_iterations: 500,
        }
    }
}

impl Minimizer for BrentMinimizer {
    /// Minimizes along dimension 0; any other dimensions stay at `start`.
    fn minimize(&mut self, problem: &mut BoundedProblem<'_>, start: &[f64]) -> StopReason {
        if problem.dimensions() == 0 {
            return StopReason::Converged;
        }
        let lower = problem.bounds().lower[0];
        let upper = problem.bounds().upper[0];
        let mut point = start.to_vec();
        let result = brent_search(
            |x| {
                point[0] = x;
                problem.evaluate(&point)
            },
            lower,
            upper,
            start[0],
            self.relative_tolerance,
            self.absolute_tolerance * (upper - lower),
            self.max_iterations,
        );
        match result {
            Some(_) => StopReason::Converged,
            None => problem.stop_reason(),
        }
    }
}

/// Minimize `f` on `[lower, upper]`, starting from `start`.
///
/// `f` returns `None` to abort the search (budget or cancellation), in which
/// case the search returns `None`. Otherwise returns the best (x, f(x)).
pub(crate) fn brent_search<F>(
    mut f: F,
    lower: f64,
    upper: f64,
    start: f64,
    relative_tolerance: f64,
    absolute_tolerance: f64,
    max_iterations: usize,
) -> Option<(f64, f64)>
where
    F: FnMut(f64) -> Option<f64>,
{
    let (mut a, mut b) = if lower <= upper { (lower, upper) } else { (upper, lower) };
    let abs_tol = absolute_tolerance.max(f64::EPSILON);

    let mut x = if start > a && start < b {
        start
    } else {
        a + GOLDEN_SECTION * (b - a)
    };
    let mut fx = f(x)?;
    if b - a <= abs_tol {
        return Some((x, fx));
    }

    let (mut w, mut v) = (x, x);
    let (mut fw, mut fv) = (fx, fx);
    let mut d: f64 = 0.0;
    let mut e: f64 = 0.0;

    for _ in 0..max_iterations {
        let m = 0.5 * (a + b);
        let tol1 = relative_tolerance * x.abs() + abs_tol;
        let tol2 = 2.0 * tol1;

        if (x - m).abs() <= tol2 - 0.5 * (b - a) {
            break;
        }

        let mut use_golden = true;
        if e.abs() > tol1 {
            // Parabola through x, w, v.
            let mut r = (x - w) * (fx - fv);
            let mut q = (x - v) * (fx - fw);
            let mut p = (x - v) * q - (x - w) * r;
            q = 2.0 * (q - r);
            if q > 0.0 {
                p = -p;
            } else {
                q = -q;
            }
            r = e;
            e = d;

            if p.abs() < (0.5 * q * r).abs() && p > q * (a - x) && p < q * (b - x) {
                d = p / q;
                let u = x + d;
                if u - a < tol2 || b - u < tol2 {
                    d = if x <= m { tol1 } else { -tol1 };
                }
                use_golden = false;
            }
        }
        if use_golden {
            e = if x < m { b - x } else { a - x };
            d = GOLDEN_SECTION * e;
        }

        let u = if d.abs() >= tol1 {
            x + d
        } else if d >= 0.0 {
            x + tol1
        } else {
            x - tol1
        };
        let fu = f(u)?;

        if fu <= fx {
            if u < x {
                b = x;
            } else {
                a = x;
            }
            v = w;
            fv = fw;
            w = x;
            fw = fx;
            x = u;
            fx = fu;
        } else {
            if u < x {
                a = u;
            } else {
                b = u;
            }
            if fu <= fw || w == x {
                v = w;
                fv = fw;
                w = u;
                fw = fu;
            } else if fu <= fv || v == x || v == w {
                v = u;
                fv = fu;
            }
        }
    }

    Some((x, fx))
}
