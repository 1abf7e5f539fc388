//! Objective functions: a mapping between a geometry vector and part of an
//! instrument's geometry, plus the optimizer settings for that mapping.

use tracing::debug;

use crate::error::{Error, Result};
use crate::evaluator::Evaluator;
use crate::geometry::Instrument;
use crate::solver::InstrumentCalculator;
use crate::tuning::Tuning;
use crate::types::DEFAULT_MAX_EVALUATIONS;

use super::constraints::Constraints;
use super::types::{ErrorNorm, OptimizerType, VariableBounds};

/// State shared by every objective function.
#[derive(Debug, Clone)]
pub struct ObjectiveBase {
    pub nr_dimensions: usize,
    pub optimizer_type: OptimizerType,
    pub max_evaluations: usize,
    pub constraints: Constraints,
    pub error_norm: ErrorNorm,
    lower_bounds: Option<Vec<f64>>,
    upper_bounds: Option<Vec<f64>>,
}

impl ObjectiveBase {
    /// Multivariate problems get a derivative-free search, single dimensions Brent.
    pub fn new(nr_dimensions: usize) -> Self {
        Self {
            nr_dimensions,
            optimizer_type: OptimizerType::for_dimensions(nr_dimensions),
            max_evaluations: DEFAULT_MAX_EVALUATIONS,
            constraints: Constraints::new(),
            error_norm: ErrorNorm::default(),
            lower_bounds: None,
            upper_bounds: None,
        }
    }

    pub fn lower_bounds(&self) -> Option<&[f64]> {
        self.lower_bounds.as_deref()
    }

    pub fn upper_bounds(&self) -> Option<&[f64]> {
        self.upper_bounds.as_deref()
    }

    /// Store lower bounds after checking their length.
    pub fn store_lower_bounds(&mut self, bounds: Vec<f64>) -> Result<()> {
        self.check_length(bounds.len())?;
        self.constraints.set_lower_bounds(&bounds);
        self.lower_bounds = Some(bounds);
        Ok(())
    }

    /// Store upper bounds after checking their length.
    pub fn store_upper_bounds(&mut self, bounds: Vec<f64>) -> Result<()> {
        self.check_length(bounds.len())?;
        self.constraints.set_upper_bounds(&bounds);
        self.upper_bounds = Some(bounds);
        Ok(())
    }

    /// Both bound vectors, validated against each other.
    pub fn bounds(&self) -> Result<VariableBounds> {
        if self.nr_dimensions == 0 {
            return Err(Error::NoDimensions);
        }
        match (&self.lower_bounds, &self.upper_bounds) {
            (Some(lower), Some(upper)) => VariableBounds::new(lower.clone(), upper.clone()),
            _ => Err(Error::MissingBounds),
        }
    }

    pub fn check_length(&self, actual: usize) -> Result<()> {
        if actual != self.nr_dimensions {
            return Err(Error::DimensionMismatch {
                expected: self.nr_dimensions,
                actual,
            });
        }
        Ok(())
    }
}

/// A set of geometry dimensions the optimizer may vary.
///
/// `set_geometry_point` must be the exact inverse of `geometry_point`: writing
/// back a vector read from an instrument leaves the geometry unchanged, and
/// reading after writing an in-bounds vector returns that vector.
pub trait ObjectiveFunction {
    fn base(&self) -> &ObjectiveBase;

    fn base_mut(&mut self) -> &mut ObjectiveBase;

    /// Read the current geometry into a vector of `nr_dimensions` values.
    fn geometry_point(&self, instrument: &Instrument) -> Vec<f64>;

    /// Write a geometry vector back and rebuild the instrument's components.
    fn set_geometry_point(&self, instrument: &mut Instrument, point: &[f64]) -> Result<()>;

    /// Accept proposed lower bounds. Implementations may tighten them.
    fn set_lower_bounds(&mut self, _instrument: &Instrument, bounds: Vec<f64>) -> Result<()> {
        self.base_mut().store_lower_bounds(bounds)
    }

    /// Accept proposed upper bounds. Implementations may tighten them.
    fn set_upper_bounds(&mut self, _instrument: &Instrument, bounds: Vec<f64>) -> Result<()> {
        self.base_mut().store_upper_bounds(bounds)
    }

    fn name(&self) -> &str {
        self.base().constraints.objective_function_name()
    }

    fn nr_dimensions(&self) -> usize {
        self.base().nr_dimensions
    }

    fn optimizer_type(&self) -> OptimizerType {
        self.base().optimizer_type
    }

    fn max_evaluations(&self) -> usize {
        self.base().max_evaluations
    }

    fn constraints(&self) -> &Constraints {
        &self.base().constraints
    }

    /// Apply `point` to the calculator's instrument and score the tuning.
    ///
    /// A point that cannot be applied scores infinity so the minimizer moves away.
    fn calc_norm(
        &self,
        calculator: &mut InstrumentCalculator,
        tuning: &Tuning,
        evaluator: &dyn Evaluator,
        point: &[f64],
    ) -> f64 {
        if let Err(err) = self.set_geometry_point(calculator.instrument_mut(), point) {
            debug!(%err, "geometry point rejected");
            return f64::INFINITY;
        }
        let errors = evaluator.calculate_error_vector(calculator, tuning);
        self.base().error_norm.apply(&errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_checks_bound_lengths() {
        let mut base = ObjectiveBase::new(2);
        assert!(matches!(
            base.store_lower_bounds(vec![0.0]),
            Err(Error::DimensionMismatch { expected: 2, actual: 1 })
        ));
        assert!(matches!(base.bounds(), Err(Error::MissingBounds)));

        base.store_lower_bounds(vec![0.0, 0.0]).unwrap();
        base.store_upper_bounds(vec![1.0, 2.0]).unwrap();
        let bounds = base.bounds().unwrap();
        assert_eq!(bounds.upper, vec![1.0, 2.0]);
    }

    #[test]
    fn base_policy() {
        assert_eq!(ObjectiveBase::new(1).optimizer_type, OptimizerType::Brent);
        assert_eq!(ObjectiveBase::new(4).optimizer_type, OptimizerType::DerivativeFree);
        assert_eq!(ObjectiveBase::new(4).max_evaluations, 10_000);
        assert!(matches!(ObjectiveBase::new(0).bounds(), Err(Error::NoDimensions)));
    }
}
