//! Multi-start search: local simplex refinements from space-filling starts.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use super::minimizer::{BoundedProblem, Minimizer};
use super::sampling::latin_hypercube_sample;
use super::simplex::SimplexMinimizer;
use super::types::StopReason;

#[derive(Debug, Clone)]
pub struct MultiStartMinimizer {
    /// Number of starts, including the caller's start point.
    pub starts: usize,
    pub local: SimplexMinimizer,
    pub seed: Option<u64>,
}

impl Default for MultiStartMinimizer {
    fn default() -> Self {
        Self {
            starts: 8,
            local: SimplexMinimizer {
                tolerance: 1e-6,
                ..SimplexMinimizer::default()
            },
            seed: None,
        }
    }
}

impl Minimizer for MultiStartMinimizer {
    fn minimize(&mut self, problem: &mut BoundedProblem<'_>, start: &[f64]) -> StopReason {
        let starts = self.starts.max(1);
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut points = vec![problem.bounds().clamp(start)];
        points.extend(latin_hypercube_sample(&problem.bounds().pairs(), starts - 1, &mut rng));

        let total = points.len();
        for (i, point) in points.iter().enumerate() {
            let share = problem.remaining() / (total - i);
            if share == 0 {
                break;
            }
            let mut local = SimplexMinimizer {
                max_local_evaluations: Some(share),
                ..self.local.clone()
            };
            match local.minimize(problem, point) {
                StopReason::Converged => {}
                reason => return reason,
            }
            debug!(start = i, best = problem.best_value(), "multi-start local search finished");
        }
        StopReason::Converged
    }
}
