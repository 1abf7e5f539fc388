//! Optimization runs: objective + evaluator + minimizer, start to finish.

use tracing::{info, info_span};

use crate::config::StudyConfig;
use crate::error::Result;
use crate::evaluator::{played_frequencies, Evaluator};
use crate::solver::InstrumentCalculator;
use crate::spectrum::SearchBand;
use crate::tuning::Tuning;

use super::minimizer::{minimizer_for, BoundedProblem};
use super::objective::ObjectiveFunction;
use super::types::{OptimizationResult, OptimizerType, ProgressUpdate};

/// Caller preferences layered over the objective's own settings.
#[derive(Debug, Clone, Default)]
pub struct OptimizationOptions {
    /// Replaces the objective's optimizer for multivariate problems.
    pub optimizer: Option<OptimizerType>,
    /// Replaces the objective's evaluation budget.
    pub max_evaluations: Option<usize>,
    /// Band used to report played frequencies after the run.
    pub band: SearchBand,
}

impl OptimizationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &StudyConfig) -> Result<Self> {
        Ok(Self {
            optimizer: config.optimizer,
            max_evaluations: config.max_evaluations,
            band: config.search_band()?,
        })
    }

    pub fn with_optimizer(mut self, optimizer: OptimizerType) -> Self {
        self.optimizer = Some(optimizer);
        self
    }

    pub fn with_max_evaluations(mut self, max_evaluations: usize) -> Self {
        self.max_evaluations = Some(max_evaluations);
        self
    }

    pub fn with_band(mut self, band: SearchBand) -> Self {
        self.band = band;
        self
    }
}

/// Optimizer for a run. Univariate problems always use the objective's choice.
fn choose_optimizer<O: ObjectiveFunction + ?Sized>(objective: &O, options: &OptimizationOptions) -> OptimizerType {
    match options.optimizer {
        Some(requested) if objective.nr_dimensions() > 1 && !requested.is_univariate() => requested,
        _ => objective.optimizer_type(),
    }
}

/// Optimize without progress reporting or cancellation.
pub fn optimize<O: ObjectiveFunction + ?Sized>(
    calculator: &mut InstrumentCalculator,
    tuning: &Tuning,
    evaluator: &dyn Evaluator,
    objective: &O,
    options: &OptimizationOptions,
) -> Result<OptimizationResult> {
    run_optimization(
        calculator,
        tuning,
        evaluator,
        objective,
        options,
        None::<fn(ProgressUpdate)>,
        None::<fn() -> bool>,
    )
}

/// Optimize the objective's dimensions of `calculator`'s instrument against
/// `tuning`. The best geometry found is written back to the instrument.
///
/// `on_progress` is called whenever the best error improves; `should_stop` is
/// polled before every evaluation.
pub fn run_optimization<O, F, S>(
    calculator: &mut InstrumentCalculator,
    tuning: &Tuning,
    evaluator: &dyn Evaluator,
    objective: &O,
    options: &OptimizationOptions,
    mut on_progress: Option<F>,
    should_stop: Option<S>,
) -> Result<OptimizationResult>
where
    O: ObjectiveFunction + ?Sized,
    F: FnMut(ProgressUpdate),
    S: Fn() -> bool,
{
    tuning.check_holes(calculator.instrument())?;
    let bounds = objective.base().bounds()?;
    let initial_point = bounds.clamp(&objective.geometry_point(calculator.instrument()));
    let optimizer = choose_optimizer(objective, options);
    let max_evaluations = options.max_evaluations.unwrap_or_else(|| objective.max_evaluations());

    let span = info_span!(
        "optimize",
        objective = objective.name(),
        %optimizer,
        dimensions = bounds.len(),
        max_evaluations
    );
    let _enter = span.enter();

    let initial_error = objective.calc_norm(calculator, tuning, evaluator, &initial_point);
    info!(initial_error, "starting optimization");

    let (stop_reason, evaluations, best) = {
        let mut objective_fn = |point: &[f64]| objective.calc_norm(calculator, tuning, evaluator, point);
        let mut report = |evaluations: usize, best_error: f64, best_point: &[f64]| {
            if let Some(callback) = on_progress.as_mut() {
                callback(ProgressUpdate {
                    evaluations,
                    best_error,
                    best_point: best_point.to_vec(),
                });
            }
        };
        let mut problem =
            BoundedProblem::new(&mut objective_fn, bounds.clone(), max_evaluations).with_on_improvement(&mut report);
        if let Some(stop) = should_stop.as_ref() {
            problem = problem.with_should_stop(stop);
        }

        let stop_reason = minimizer_for(optimizer).minimize(&mut problem, &initial_point);
        let best = if problem.best_point().is_empty() {
            None
        } else {
            Some((problem.best_point().to_vec(), problem.best_value()))
        };
        (stop_reason, problem.evaluations(), best)
    };

    let (point, final_error) = best.unwrap_or_else(|| (initial_point.clone(), initial_error));
    objective.set_geometry_point(calculator.instrument_mut(), &point)?;

    let played = played_frequencies(calculator, tuning, &options.band);
    info!(final_error, evaluations, %stop_reason, "optimization finished");

    Ok(OptimizationResult {
        optimizer,
        objective_name: objective.name().to_string(),
        initial_point,
        point,
        initial_error,
        final_error,
        evaluations,
        stop_reason,
        played_frequencies: played,
        target_frequencies: tuning.target_frequencies(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::evaluator::CentDeviationEvaluator;
    use crate::geometry::{BorePoint, Instrument, Mouthpiece, MouthpieceKind, Termination};
    use crate::optimization::bore_position::BorePositionObjectiveFunction;
    use crate::optimization::types::StopReason;
    use crate::physical::PhysicalParameters;
    use crate::tuning::{Fingering, Note};
    use std::cell::Cell;

    fn setup() -> (InstrumentCalculator, Tuning, BorePositionObjectiveFunction) {
        let instrument = Instrument::new(
            "pipe",
            Mouthpiece::new(0.0, MouthpieceKind::Reed { length_correction: 0.0 }),
            vec![BorePoint::new(0.0, 0.02), BorePoint::new(0.3, 0.02)],
            vec![],
            Termination::open(0.0),
        )
        .unwrap();
        let mut objective = BorePositionObjectiveFunction::new(&instrument, 1, false).unwrap();
        objective.set_lower_bounds(&instrument, vec![0.2]).unwrap();
        objective.set_upper_bounds(&instrument, vec![0.4]).unwrap();
        let tuning = Tuning::new("one", vec![Fingering::new(Note::new("D4", 293.66), vec![])]);
        let calc = InstrumentCalculator::new(instrument, PhysicalParameters::default());
        (calc, tuning, objective)
    }

    fn coarse() -> OptimizationOptions {
        OptimizationOptions::new().with_band(SearchBand::new(1.5, 400).unwrap())
    }

    #[test]
    fn univariate_run_tunes_pipe_length() {
        let (mut calc, tuning, objective) = setup();
        let evaluator = CentDeviationEvaluator::new(SearchBand::new(1.5, 400).unwrap());
        let result = optimize(&mut calc, &tuning, &evaluator, &objective, &coarse()).unwrap();

        assert_eq!(result.optimizer, OptimizerType::Brent);
        assert!(result.improved());
        assert!(result.final_error < 25.0, "{result}");
        // Shorter pipe plays higher.
        assert!(result.point[0] < 0.3);
        assert!((calc.instrument().bore_points()[1].position - result.point[0]).abs() < 1e-12);
    }

    #[test]
    fn cancellation_is_reported() {
        let (mut calc, tuning, objective) = setup();
        let evaluator = CentDeviationEvaluator::new(SearchBand::new(1.5, 400).unwrap());
        let calls = Cell::new(0);
        let stop = || {
            calls.set(calls.get() + 1);
            calls.get() > 3
        };
        let mut updates = Vec::new();
        let result = run_optimization(
            &mut calc,
            &tuning,
            &evaluator,
            &objective,
            &coarse(),
            Some(|update: ProgressUpdate| updates.push(update.best_error)),
            Some(stop),
        )
        .unwrap();
        assert_eq!(result.stop_reason, StopReason::Cancelled);
        assert_eq!(result.evaluations, 3);
        assert!(!updates.is_empty());
    }

    #[test]
    fn missing_bounds_are_rejected() {
        let (mut calc, tuning, _) = setup();
        let objective = BorePositionObjectiveFunction::new(calc.instrument(), 1, false).unwrap();
        let evaluator = CentDeviationEvaluator::default();
        assert!(matches!(
            optimize(&mut calc, &tuning, &evaluator, &objective, &coarse()),
            Err(Error::MissingBounds)
        ));
    }

    #[test]
    fn univariate_problems_ignore_optimizer_override() {
        let (_, _, objective) = setup();
        let options = OptimizationOptions::new().with_optimizer(OptimizerType::Evolutionary);
        assert_eq!(choose_optimizer(&objective, &options), OptimizerType::Brent);
    }
}
