//! Powell's conjugate-direction method with bounded Brent line searches.

use super::brent::brent_search;
use super::minimizer::{BoundedProblem, Minimizer};
use super::types::StopReason;

#[derive(Debug, Clone)]
pub struct PowellMinimizer {
    /// Converged when a full sweep improves the value by less than this fraction.
    pub relative_tolerance: f64,
    pub absolute_tolerance: f64,
    /// Tolerance of each line search, as a fraction of the step range.
    pub line_tolerance: f64,
    pub max_iterations: usize,
}

impl Default for PowellMinimizer {
    fn default() -> Self {
        Self {
            relative_tolerance: 1e-10,
            absolute_tolerance: 1e-14,
            line_tolerance: 1e-8,
            max_iterations: 200,
        }
    }
}

/// Range of `t` keeping `point + t * direction` inside the bounds.
fn step_range(problem: &BoundedProblem<'_>, point: &[f64], direction: &[f64]) -> (f64, f64) {
    let bounds = problem.bounds();
    let mut t_min = f64::NEG_INFINITY;
    let mut t_max = f64::INFINITY;
    for (i, &d) in direction.iter().enumerate() {
        if d.abs() < f64::EPSILON {
            continue;
        }
        let a = (bounds.lower[i] - point[i]) / d;
        let b = (bounds.upper[i] - point[i]) / d;
        t_min = t_min.max(a.min(b));
        t_max = t_max.min(a.max(b));
    }
    if !t_min.is_finite() || !t_max.is_finite() {
        return (0.0, 0.0);
    }
    (t_min.min(0.0), t_max.max(0.0))
}

fn along(point: &[f64], direction: &[f64], t: f64) -> Vec<f64> {
    point.iter().zip(direction.iter()).map(|(p, d)| p + t * d).collect()
}

impl PowellMinimizer {
    /// Line search from `point` along `direction`. Moves `point` only on improvement.
    fn line_search(
        &self,
        problem: &mut BoundedProblem<'_>,
        point: &mut Vec<f64>,
        value: &mut f64,
        direction: &[f64],
    ) -> Option<()> {
        let (t_min, t_max) = step_range(problem, &point[..], direction);
        if t_max - t_min <= 0.0 {
            return Some(());
        }
        let origin = point.clone();
        let (t, f) = brent_search(
            |t| problem.evaluate(&along(&origin, direction, t)),
            t_min,
            t_max,
            0.0,
            self.line_tolerance,
            self.line_tolerance * (t_max - t_min),
            100,
        )?;
        if f < *value {
            *point = problem.bounds().clamp(&along(&origin, direction, t));
            *value = f;
        }
        Some(())
    }

    fn search(&self, problem: &mut BoundedProblem<'_>, start: &[f64]) -> Option<()> {
        let n = problem.dimensions();
        let mut directions: Vec<Vec<f64>> = (0..n)
            .map(|i| {
                let mut d = vec![0.0; n];
                d[i] = problem.bounds().range(i).max(f64::MIN_POSITIVE);
                d
            })
            .collect();

        let mut point = problem.bounds().clamp(start);
        let mut value = problem.evaluate(&point)?;

        for _ in 0..self.max_iterations {
            let sweep_start = point.clone();
            let sweep_value = value;
            let mut biggest_drop = 0.0;
            let mut biggest_index = 0;

            for (i, direction) in directions.iter().enumerate() {
                let before = value;
                self.line_search(problem, &mut point, &mut value, direction)?;
                if before - value > biggest_drop {
                    biggest_drop = before - value;
                    biggest_index = i;
                }
            }

            let improvement = sweep_value - value;
            if 2.0 * improvement
                <= self.relative_tolerance * (sweep_value.abs() + value.abs()) + self.absolute_tolerance
            {
                return Some(());
            }

            // Replace the most productive direction with the net displacement.
            let net: Vec<f64> = point.iter().zip(sweep_start.iter()).map(|(p, s)| p - s).collect();
            if net.iter().any(|d| d.abs() > 0.0) {
                directions.remove(biggest_index);
                self.line_search(problem, &mut point, &mut value, &net)?;
                directions.push(net);
            }
        }
        Some(())
    }
}

impl Minimizer for PowellMinimizer {
    fn minimize(&mut self, problem: &mut BoundedProblem<'_>, start: &[f64]) -> StopReason {
        match self.search(problem, start) {
            Some(()) => StopReason::Converged,
            None => problem.stop_reason(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::minimizer::test_support::{bowl, distance, unit_bounds};

    #[test]
    fn converges_on_bowl() {
        let center = vec![0.15, 0.55, 0.75];
        let mut f = bowl(center.clone());
        let mut problem = BoundedProblem::new(&mut f, unit_bounds(3), 5000);
        let reason = PowellMinimizer::default().minimize(&mut problem, &[0.9, 0.1, 0.3]);
        assert_eq!(reason, StopReason::Converged);
        assert!(distance(problem.best_point(), &center) < 1e-4);
    }

    #[test]
    fn coupled_valley() {
        // Minimum at (0.4, 0.6) along a diagonal valley.
        let mut f = |x: &[f64]| {
            let u = x[0] + x[1] - 1.0;
            let v = x[0] - x[1] + 0.2;
            100.0 * u * u + v * v
        };
        let mut problem = BoundedProblem::new(&mut f, unit_bounds(2), 5000);
        PowellMinimizer::default().minimize(&mut problem, &[0.9, 0.9]);
        assert!(distance(problem.best_point(), &[0.4, 0.6]) < 1e-3);
    }

    #[test]
    fn step_range_respects_box() {
        let mut f = bowl(vec![0.5, 0.5]);
        let problem = BoundedProblem::new(&mut f, unit_bounds(2), 10);
        let (lo, hi) = step_range(&problem, &[0.25, 0.5], &[1.0, 0.0]);
        assert!((lo + 0.25).abs() < 1e-12);
        assert!((hi - 0.75).abs() < 1e-12);
    }
}
