//! Hooke-Jeeves pattern search within box bounds.

use super::minimizer::{BoundedProblem, Minimizer};
use super::types::StopReason;

#[derive(Debug, Clone)]
pub struct PatternSearchMinimizer {
    /// Initial step as a fraction of each bound range.
    pub initial_step: f64,
    /// Converged when every step is below this fraction of its range.
    pub tolerance: f64,
}

impl Default for PatternSearchMinimizer {
    fn default() -> Self {
        Self {
            initial_step: 0.1,
            tolerance: 1e-7,
        }
    }
}

/// Coordinate-wise probe around `base`. Returns the best point found and its value.
fn explore(
    problem: &mut BoundedProblem<'_>,
    base: &[f64],
    base_value: f64,
    steps: &[f64],
) -> Option<(Vec<f64>, f64)> {
    let mut point = base.to_vec();
    let mut value = base_value;
    for (i, &step) in steps.iter().enumerate() {
        if step == 0.0 {
            continue;
        }
        let (lo, hi) = (problem.bounds().lower[i], problem.bounds().upper[i]);
        let original = point[i];
        let mut moved = false;
        for candidate in [original + step, original - step] {
            let candidate = candidate.clamp(lo, hi);
            if candidate == original {
                continue;
            }
            point[i] = candidate;
            let trial = problem.evaluate(&point)?;
            if trial < value {
                value = trial;
                moved = true;
                break;
            }
        }
        if !moved {
            point[i] = original;
        }
    }
    Some((point, value))
}

impl PatternSearchMinimizer {
    fn search(&self, problem: &mut BoundedProblem<'_>, start: &[f64]) -> Option<()> {
        let bounds = problem.bounds().clone();
        let ranges: Vec<f64> = (0..bounds.len()).map(|i| bounds.range(i)).collect();
        let mut steps: Vec<f64> = ranges.iter().map(|r| r * self.initial_step).collect();

        let mut base = bounds.clamp(start);
        let mut base_value = problem.evaluate(&base)?;

        loop {
            let (mut trial, mut trial_value) = explore(problem, &base, base_value, &steps)?;

            if trial_value < base_value {
                // Keep moving along the improving direction while it pays.
                loop {
                    let pattern: Vec<f64> = trial
                        .iter()
                        .zip(base.iter())
                        .map(|(t, b)| 2.0 * t - b)
                        .collect();
                    let pattern = bounds.clamp(&pattern);
                    base = trial;
                    base_value = trial_value;

                    let pattern_value = problem.evaluate(&pattern)?;
                    let (next, next_value) = explore(problem, &pattern, pattern_value, &steps)?;
                    if next_value < base_value {
                        trial = next;
                        trial_value = next_value;
                    } else {
                        break;
                    }
                }
            } else {
                let mut converged = true;
                for (step, range) in steps.iter_mut().zip(ranges.iter()) {
                    *step *= 0.5;
                    if *step > self.tolerance * range {
                        converged = false;
                    }
                }
                if converged {
                    return Some(());
                }
            }
        }
    }
}

impl Minimizer for PatternSearchMinimizer {
    fn minimize(&mut self, problem: &mut BoundedProblem<'_>, start: &[f64]) -> StopReason {
        match self.search(problem, start) {
            Some(()) => StopReason::Converged,
            None => problem.stop_reason(),
        }
    }
}
