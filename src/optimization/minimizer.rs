//! The "minimize this objective within these bounds" contract.
//!
//! Every backend drives a [`BoundedProblem`], which owns the evaluation budget,
//! the cancellation check, and the best point seen so far. Backends never call
//! the objective directly, so budget and best-point bookkeeping are uniform.

use super::algorithm::EvolutionaryMinimizer;
use super::brent::BrentMinimizer;
use super::multistart::MultiStartMinimizer;
use super::pattern::PatternSearchMinimizer;
use super::powell::PowellMinimizer;
use super::simplex::SimplexMinimizer;
use super::types::{OptimizerType, StopReason, VariableBounds};

/// A pluggable minimizer backend.
pub trait Minimizer {
    /// Minimize from `start` (already inside the bounds). The best point is
    /// left in `problem`.
    fn minimize(&mut self, problem: &mut BoundedProblem<'_>, start: &[f64]) -> StopReason;
}

/// Objective closure plus bounds, budget, cancellation, and best-point tracking.
pub struct BoundedProblem<'a> {
    objective: &'a mut dyn FnMut(&[f64]) -> f64,
    bounds: VariableBounds,
    max_evaluations: usize,
    evaluations: usize,
    should_stop: Option<&'a dyn Fn() -> bool>,
    cancelled: bool,
    best_point: Vec<f64>,
    best_value: f64,
    on_improvement: Option<&'a mut dyn FnMut(usize, f64, &[f64])>,
}

impl<'a> BoundedProblem<'a> {
    pub fn new(
        objective: &'a mut dyn FnMut(&[f64]) -> f64,
        bounds: VariableBounds,
        max_evaluations: usize,
    ) -> Self {
        Self {
            objective,
            bounds,
            max_evaluations,
            evaluations: 0,
            should_stop: None,
            cancelled: false,
            best_point: Vec::new(),
            best_value: f64::INFINITY,
            on_improvement: None,
        }
    }

    pub fn with_should_stop(mut self, should_stop: &'a dyn Fn() -> bool) -> Self {
        self.should_stop = Some(should_stop);
        self
    }

    /// Called with (evaluations, value, point) whenever the best value improves.
    pub fn with_on_improvement(mut self, on_improvement: &'a mut dyn FnMut(usize, f64, &[f64])) -> Self {
        self.on_improvement = Some(on_improvement);
        self
    }

    pub fn bounds(&self) -> &VariableBounds {
        &self.bounds
    }

    pub fn dimensions(&self) -> usize {
        self.bounds.len()
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    pub fn max_evaluations(&self) -> usize {
        self.max_evaluations
    }

    pub fn remaining(&self) -> usize {
        self.max_evaluations.saturating_sub(self.evaluations)
    }

    pub fn best_point(&self) -> &[f64] {
        &self.best_point
    }

    pub fn best_value(&self) -> f64 {
        self.best_value
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// True once the budget is spent or cancellation was requested.
    pub fn is_exhausted(&self) -> bool {
        self.cancelled || self.evaluations >= self.max_evaluations
    }

    /// Reason to report when a backend stops because `evaluate` returned `None`.
    pub fn stop_reason(&self) -> StopReason {
        if self.cancelled {
            StopReason::Cancelled
        } else {
            StopReason::BudgetExhausted
        }
    }

    /// Evaluate at `point` clamped into the bounds. Returns `None` when the
    /// budget is spent or the run was cancelled.
    pub fn evaluate(&mut self, point: &[f64]) -> Option<f64> {
        if self.evaluations >= self.max_evaluations {
            return None;
        }
        if let Some(should_stop) = self.should_stop {
            if should_stop() {
                self.cancelled = true;
            }
        }
        if self.cancelled {
            return None;
        }

        let clamped = self.bounds.clamp(point);
        let raw = (self.objective)(&clamped);
        let value = if raw.is_nan() { f64::INFINITY } else { raw };
        self.evaluations += 1;

        if value < self.best_value || self.best_point.is_empty() {
            self.best_value = value;
            self.best_point = clamped;
            if let Some(callback) = self.on_improvement.as_mut() {
                callback(self.evaluations, value, &self.best_point);
            }
        }
        Some(value)
    }
}

/// Backend for an optimizer type, with default settings.
pub fn minimizer_for(optimizer_type: OptimizerType) -> Box<dyn Minimizer> {
    match optimizer_type {
        OptimizerType::DerivativeFree => Box::new(PatternSearchMinimizer::default()),
        OptimizerType::Evolutionary => Box::new(EvolutionaryMinimizer::default()),
        OptimizerType::MultiStart => Box::new(MultiStartMinimizer::default()),
        OptimizerType::Simplex => Box::new(SimplexMinimizer::default()),
        OptimizerType::Powell => Box::new(PowellMinimizer::default()),
        OptimizerType::Brent => Box::new(BrentMinimizer::default()),
    }
}
