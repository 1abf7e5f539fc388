//! Nelder-Mead simplex with vertices clamped into the bounds.

use super::minimizer::{BoundedProblem, Minimizer};
use super::types::StopReason;

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct SimplexMinimizer {
    /// Initial edge length as a fraction of each bound range.
    pub initial_step: f64,
    /// Converged when the simplex spans less than this fraction of every range.
    pub tolerance: f64,
    /// Cap on evaluations for one call, used by multi-start.
    pub max_local_evaluations: Option<usize>,
}

impl Default for SimplexMinimizer {
    fn default() -> Self {
        Self {
            initial_step: 0.1,
            tolerance: 1e-7,
            max_local_evaluations: None,
        }
    }
}

struct Vertex {
    point: Vec<f64>,
    value: f64,
}

impl SimplexMinimizer {
    fn search(&self, problem: &mut BoundedProblem<'_>, start: &[f64]) -> Option<bool> {
        let bounds = problem.bounds().clone();
        let n = bounds.len();
        let first_evaluation = problem.evaluations();
        let local_limit = self.max_local_evaluations.unwrap_or(usize::MAX);
        let ranges: Vec<f64> = (0..n).map(|i| bounds.range(i)).collect();

        let origin = bounds.clamp(start);
        let mut simplex = Vec::with_capacity(n + 1);
        simplex.push(Vertex {
            value: problem.evaluate(&origin)?,
            point: origin.clone(),
        });
        for i in 0..n {
            let mut point = origin.clone();
            let step = self.initial_step * ranges[i];
            point[i] = if point[i] + step <= bounds.upper[i] {
                point[i] + step
            } else {
                point[i] - step
            };
            simplex.push(Vertex {
                value: problem.evaluate(&point)?,
                point,
            });
        }

        loop {
            simplex.sort_by(|a, b| a.value.total_cmp(&b.value));

            let spread_ok = (0..n).all(|i| {
                let (lo, hi) = simplex.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                    (lo.min(v.point[i]), hi.max(v.point[i]))
                });
                hi - lo <= self.tolerance * ranges[i].max(f64::MIN_POSITIVE)
            });
            if spread_ok {
                return Some(true);
            }
            if problem.evaluations() - first_evaluation >= local_limit {
                return Some(false);
            }

            let worst = n;
            let centroid: Vec<f64> = (0..n)
                .map(|i| simplex[..worst].iter().map(|v| v.point[i]).sum::<f64>() / n as f64)
                .collect();
            let along = |scale: f64| -> Vec<f64> {
                let raw: Vec<f64> = centroid
                    .iter()
                    .zip(simplex[worst].point.iter())
                    .map(|(c, w)| c + scale * (c - w))
                    .collect();
                bounds.clamp(&raw)
            };

            let reflected = along(REFLECTION);
            let reflected_value = problem.evaluate(&reflected)?;

            if reflected_value < simplex[0].value {
                let expanded = along(EXPANSION);
                let expanded_value = problem.evaluate(&expanded)?;
                simplex[worst] = if expanded_value < reflected_value {
                    Vertex { point: expanded, value: expanded_value }
                } else {
                    Vertex { point: reflected, value: reflected_value }
                };
                continue;
            }
            if reflected_value < simplex[n - 1].value {
                simplex[worst] = Vertex { point: reflected, value: reflected_value };
                continue;
            }

            let (contracted, limit) = if reflected_value < simplex[worst].value {
                (along(CONTRACTION * REFLECTION), reflected_value)
            } else {
                (along(-CONTRACTION), simplex[worst].value)
            };
            let contracted_value = problem.evaluate(&contracted)?;
            if contracted_value < limit {
                simplex[worst] = Vertex { point: contracted, value: contracted_value };
                continue;
            }

            // Shrink toward the best vertex.
            let best = simplex[0].point.clone();
            for vertex in simplex.iter_mut().skip(1) {
                let point: Vec<f64> = best
                    .iter()
                    .zip(vertex.point.iter())
                    .map(|(b, p)| b + SHRINK * (p - b))
                    .collect();
                vertex.value = problem.evaluate(&point)?;
                vertex.point = point;
            }
        }
    }
}

impl Minimizer for SimplexMinimizer {
    fn minimize(&mut self, problem: &mut BoundedProblem<'_>, start: &[f64]) -> StopReason {
        match self.search(problem, start) {
            Some(_) => StopReason::Converged,
            None => problem.stop_reason(),
        }
    }
}
