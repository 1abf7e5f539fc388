//! Bore point positions as optimization dimensions.
//!
//! Dimension 0, when the bottom point is free, is the absolute position of the
//! bottom bore point. Every other dimension is the position of one interior
//! bore point as a fraction of the distance from the point above it to the
//! bottom. Any vector in the unit box for those dimensions therefore keeps the
//! bore points in order.

use tracing::debug;

use crate::error::{Error, Result};
use crate::geometry::Instrument;
use crate::types::{BORE_POSITION_CATEGORY, MIN_BOTTOM_HOLE_CLEARANCE};

use super::constraints::{Constraint, ConstraintType};
use super::objective::{ObjectiveBase, ObjectiveFunction};

pub const DISPLAY_NAME: &str = "Bore Position optimizer";
pub const FUNCTION_NAME: &str = "BorePositionObjectiveFunction";

#[derive(Debug, Clone)]
pub struct BorePositionObjectiveFunction {
    base: ObjectiveBase,
    /// Bore points at the top whose position never changes (at least 1).
    unchanged_bore_points: usize,
    bottom_point_unchanged: bool,
}

impl BorePositionObjectiveFunction {
    /// Vary the bore points below the first `unchanged_bore_points`, and the
    /// bottom point unless `bottom_point_unchanged`.
    pub fn new(
        instrument: &Instrument,
        unchanged_bore_points: usize,
        bottom_point_unchanged: bool,
    ) -> Result<Self> {
        let total = instrument.bore_points().len();
        let unchanged_bore_points = unchanged_bore_points.max(1);
        let unchanged_bottom = usize::from(bottom_point_unchanged);
        let nr_dimensions = total.saturating_sub(unchanged_bore_points + unchanged_bottom);
        if nr_dimensions == 0 {
            return Err(Error::NoDimensions);
        }

        let mut objective = Self {
            base: ObjectiveBase::new(nr_dimensions),
            unchanged_bore_points,
            bottom_point_unchanged,
        };
        objective.set_constraints(instrument);
        Ok(objective)
    }

    pub fn unchanged_bore_points(&self) -> usize {
        self.unchanged_bore_points
    }

    pub fn bottom_point_unchanged(&self) -> bool {
        self.bottom_point_unchanged
    }

    fn total_bore_points(&self) -> usize {
        self.base.nr_dimensions + self.unchanged_bore_points + usize::from(self.bottom_point_unchanged)
    }

    fn bottom_is_free(&self) -> bool {
        !self.bottom_point_unchanged
    }

    /// 1-based bore point number varied by a dimension.
    fn bore_point_number(&self, dimension: usize) -> usize {
        if dimension == 0 && self.bottom_is_free() {
            return self.base.nr_dimensions + self.unchanged_bore_points;
        }
        self.unchanged_bore_points + dimension + usize::from(self.bottom_point_unchanged)
    }

    fn set_constraints(&mut self, instrument: &Instrument) {
        let total = self.total_bore_points();
        let mut first_relative = 0;
        if self.bottom_is_free() {
            let name = format!("Position of bore point {} (bottom)", self.bore_point_number(0));
            self.base.constraints.add_constraint(Constraint::new(
                BORE_POSITION_CATEGORY,
                name,
                ConstraintType::Dimensional,
            ));
            first_relative = 1;
        }
        for dimension in first_relative..self.base.nr_dimensions {
            let number = self.bore_point_number(dimension);
            let name = format!(
                "Relative position of bore point {} between points {} and {}",
                number,
                number - 1,
                total
            );
            self.base.constraints.add_constraint(Constraint::new(
                BORE_POSITION_CATEGORY,
                name,
                ConstraintType::Dimensionless,
            ));
        }

        let constraints = &mut self.base.constraints;
        constraints.set_number_of_holes(instrument.holes().len());
        constraints.set_objective_display_name(DISPLAY_NAME);
        constraints.set_objective_function_name(FUNCTION_NAME);
        constraints.set_constraints_name("Default");
    }

    fn check_instrument(&self, instrument: &Instrument) -> Result<()> {
        let actual = instrument.bore_points().len();
        if actual != self.total_bore_points() {
            return Err(Error::InvalidGeometry(format!(
                "objective expects {} bore points, instrument has {}",
                self.total_bore_points(),
                actual
            )));
        }
        Ok(())
    }
}

impl ObjectiveFunction for BorePositionObjectiveFunction {
    fn base(&self) -> &ObjectiveBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ObjectiveBase {
        &mut self.base
    }

    fn geometry_point(&self, instrument: &Instrument) -> Vec<f64> {
        let points = instrument.bore_points();
        let mut geometry = vec![0.0; self.base.nr_dimensions];
        let (Some(last), Some(reference)) = (points.last(), points.get(self.unchanged_bore_points - 1)) else {
            return geometry;
        };
        let last_position = last.position;

        let mut first_relative = 0;
        if self.bottom_is_free() {
            geometry[0] = last_position;
            first_relative = 1;
        }

        let mut prior_position = reference.position;
        for dimension in first_relative..self.base.nr_dimensions {
            let position = points[self.bore_point_number(dimension) - 1].position;
            let span = last_position - prior_position;
            geometry[dimension] = if span != 0.0 {
                (position - prior_position) / span
            } else {
                0.0
            };
            prior_position = position;
        }
        geometry
    }

    fn set_geometry_point(&self, instrument: &mut Instrument, point: &[f64]) -> Result<()> {
        self.base.check_length(point.len())?;
        self.check_instrument(instrument)?;

        let reference_index = self.unchanged_bore_points - 1;
        let points = instrument.bore_points_mut();
        let bottom_index = points.len() - 1;

        let mut first_relative = 0;
        if self.bottom_is_free() {
            // The bottom must stay below every fixed point or the fixed points
            // would be re-sorted out of place.
            let reference_position = points[reference_index].position;
            if !(point[0] > reference_position) {
                return Err(Error::InvalidGeometry(format!(
                    "bottom bore point at {} is not below fixed bore point {} at {}",
                    point[0],
                    reference_index + 1,
                    reference_position
                )));
            }
            points[bottom_index].position = point[0];
            first_relative = 1;
        }
        let last_position = points[bottom_index].position;

        let mut prior_position = points[reference_index].position;
        for dimension in first_relative..self.base.nr_dimensions {
            let index = self.bore_point_number(dimension) - 1;
            let position = prior_position + point[dimension] * (last_position - prior_position);
            points[index].position = position;
            prior_position = position;
        }

        instrument.update_components();
        Ok(())
    }

    /// Keeps a free bottom point below the lowest tone hole.
    fn set_lower_bounds(&mut self, instrument: &Instrument, mut bounds: Vec<f64>) -> Result<()> {
        self.base.check_length(bounds.len())?;
        if self.bottom_is_free() {
            let reference = instrument.bottom_hole_position().unwrap_or_else(|| {
                let (top, bottom) = instrument.bore_span();
                0.5 * (top + bottom)
            });
            let minimum = reference + MIN_BOTTOM_HOLE_CLEARANCE;
            if bounds[0] < minimum {
                debug!(proposed = bounds[0], minimum, "raising lower bound of bottom bore point");
                bounds[0] = minimum;
            }
        }
        self.base.store_lower_bounds(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::CentDeviationEvaluator;
    use crate::geometry::{BorePoint, Hole, Mouthpiece, MouthpieceKind, Termination};
    use crate::physical::PhysicalParameters;
    use crate::solver::InstrumentCalculator;
    use crate::tuning::{Fingering, Note, Tuning};
    use pretty_assertions::assert_eq;

    fn instrument(holes: Vec<Hole>) -> Instrument {
        Instrument::new(
            "test",
            Mouthpiece::new(0.0, MouthpieceKind::Reed { length_correction: 0.0 }),
            vec![
                BorePoint::new(0.0, 0.02),
                BorePoint::new(0.05, 0.02),
                BorePoint::new(0.12, 0.019),
                BorePoint::new(0.2, 0.018),
                BorePoint::new(0.3, 0.017),
            ],
            holes,
            Termination::open(0.0),
        )
        .unwrap()
    }

    fn positions(instrument: &Instrument) -> Vec<f64> {
        instrument.bore_points().iter().map(|p| p.position).collect()
    }

    #[test]
    fn dimension_count() {
        let inst = instrument(vec![]);
        for (unchanged, bottom_fixed, expected) in [(1, false, 4), (2, false, 3), (1, true, 3), (3, true, 1)] {
            let objective = BorePositionObjectiveFunction::new(&inst, unchanged, bottom_fixed).unwrap();
            assert_eq!(objective.nr_dimensions(), expected);
        }
        // Zero unchanged points behaves like one.
        let objective = BorePositionObjectiveFunction::new(&inst, 0, false).unwrap();
        assert_eq!(objective.unchanged_bore_points(), 1);
        assert_eq!(objective.nr_dimensions(), 4);

        assert!(matches!(
            BorePositionObjectiveFunction::new(&inst, 4, true),
            Err(Error::NoDimensions)
        ));
    }

    #[test]
    fn optimizer_follows_dimension_count() {
        let inst = instrument(vec![]);
        let one = BorePositionObjectiveFunction::new(&inst, 4, false).unwrap();
        assert_eq!(one.optimizer_type(), crate::optimization::OptimizerType::Brent);
        let many = BorePositionObjectiveFunction::new(&inst, 1, false).unwrap();
        assert_eq!(many.optimizer_type(), crate::optimization::OptimizerType::DerivativeFree);
        assert_eq!(many.max_evaluations(), 10_000);
    }

    #[test]
    fn geometry_point_reads_bottom_then_fractions() {
        let inst = instrument(vec![]);
        let objective = BorePositionObjectiveFunction::new(&inst, 2, false).unwrap();
        let point = objective.geometry_point(&inst);
        assert_eq!(point.len(), 3);
        assert!((point[0] - 0.3).abs() < 1e-12);
        // 0.12 between 0.05 and 0.3
        assert!((point[1] - 0.28).abs() < 1e-12);
        // 0.2 between 0.12 and 0.3
        assert!((point[2] - 0.08 / 0.18).abs() < 1e-12);
    }

    #[test]
    fn round_trip_leaves_geometry_unchanged() {
        let mut inst = instrument(vec![Hole::new(0.15, 0.006, 0.003)]);
        let before = positions(&inst);
        let objective = BorePositionObjectiveFunction::new(&inst, 1, false).unwrap();
        let point = objective.geometry_point(&inst);
        objective.set_geometry_point(&mut inst, &point).unwrap();
        for (a, b) in positions(&inst).iter().zip(before.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn set_then_get_returns_vector() {
        let mut inst = instrument(vec![]);
        for bottom_fixed in [false, true] {
            let objective = BorePositionObjectiveFunction::new(&inst, 1, bottom_fixed).unwrap();
            let v: Vec<f64> = if bottom_fixed {
                vec![0.1, 0.5, 0.9]
            } else {
                vec![0.34, 0.1, 0.5, 0.9]
            };
            objective.set_geometry_point(&mut inst, &v).unwrap();
            let read = objective.geometry_point(&inst);
            for (a, b) in read.iter().zip(v.iter()) {
                assert!((a - b).abs() < 1e-12, "{read:?} != {v:?}");
            }
            // Written positions stay ordered.
            let p = positions(&inst);
            assert!(p.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn set_geometry_point_rejects_wrong_length() {
        let mut inst = instrument(vec![]);
        let objective = BorePositionObjectiveFunction::new(&inst, 1, false).unwrap();
        assert!(matches!(
            objective.set_geometry_point(&mut inst, &[0.3]),
            Err(Error::DimensionMismatch { expected: 4, actual: 1 })
        ));
    }

    #[test]
    fn bottom_cannot_pass_fixed_points() {
        let mut inst = instrument(vec![Hole::new(0.03, 0.006, 0.003)]);
        let mut objective = BorePositionObjectiveFunction::new(&inst, 4, false).unwrap();
        objective.set_lower_bounds(&inst, vec![0.0]).unwrap();
        let lower = objective.base().lower_bounds().unwrap()[0];
        assert_eq!(lower, 0.03 + MIN_BOTTOM_HOLE_CLEARANCE);

        // The lower bound clears the hole but not the fixed point at 0.2.
        let before = positions(&inst);
        assert!(matches!(
            objective.set_geometry_point(&mut inst, &[lower]),
            Err(Error::InvalidGeometry(_))
        ));
        assert_eq!(positions(&inst), before);

        objective.set_geometry_point(&mut inst, &[0.25]).unwrap();
        assert_eq!(&positions(&inst)[..4], &before[..4]);
        assert_eq!(positions(&inst)[4], 0.25);

        // Scored as unusable rather than silently reordering the bore.
        let mut calc = InstrumentCalculator::new(inst, PhysicalParameters::default());
        let tuning = Tuning::new("one", vec![Fingering::new(Note::new("A", 440.0), vec![false])]);
        let evaluator = CentDeviationEvaluator::default();
        let norm = objective.calc_norm(&mut calc, &tuning, &evaluator, &[lower]);
        assert_eq!(norm, f64::INFINITY);
        assert_eq!(&positions(calc.instrument())[..4], &before[..4]);
    }

    #[test]
    fn lower_bound_clears_bottom_hole() {
        let inst = instrument(vec![Hole::new(0.15, 0.006, 0.003), Hole::new(0.22, 0.006, 0.003)]);
        let mut objective = BorePositionObjectiveFunction::new(&inst, 2, false).unwrap();

        objective.set_lower_bounds(&inst, vec![0.1, 0.0, 0.0]).unwrap();
        let lower = objective.base().lower_bounds().unwrap();
        assert_eq!(lower[0], 0.22 + MIN_BOTTOM_HOLE_CLEARANCE);
        assert_eq!(&lower[1..], &[0.0, 0.0]);

        objective.set_lower_bounds(&inst, vec![0.25, 0.0, 0.0]).unwrap();
        assert_eq!(objective.base().lower_bounds().unwrap()[0], 0.25);
    }

    #[test]
    fn lower_bound_uses_single_hole() {
        let inst = instrument(vec![Hole::new(0.15, 0.006, 0.003)]);
        let mut objective = BorePositionObjectiveFunction::new(&inst, 1, false).unwrap();
        objective.set_lower_bounds(&inst, vec![0.0; 4]).unwrap();
        assert_eq!(objective.base().lower_bounds().unwrap()[0], 0.15 + MIN_BOTTOM_HOLE_CLEARANCE);
    }

    #[test]
    fn lower_bound_without_holes_uses_bore_midpoint() {
        let inst = instrument(vec![]);
        let mut objective = BorePositionObjectiveFunction::new(&inst, 1, false).unwrap();
        objective.set_lower_bounds(&inst, vec![0.0; 4]).unwrap();
        assert_eq!(objective.base().lower_bounds().unwrap()[0], 0.15 + MIN_BOTTOM_HOLE_CLEARANCE);
    }

    #[test]
    fn fixed_bottom_bounds_pass_through() {
        let inst = instrument(vec![Hole::new(0.15, 0.006, 0.003)]);
        let mut objective = BorePositionObjectiveFunction::new(&inst, 1, true).unwrap();
        objective.set_lower_bounds(&inst, vec![0.0; 3]).unwrap();
        assert_eq!(objective.base().lower_bounds().unwrap(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn constraint_names() {
        let inst = instrument(vec![Hole::new(0.15, 0.006, 0.003)]);
        let objective = BorePositionObjectiveFunction::new(&inst, 2, false).unwrap();
        let constraints = objective.constraints();
        let names: Vec<&str> = constraints
            .get(BORE_POSITION_CATEGORY)
            .unwrap()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec![
                "Position of bore point 5 (bottom)",
                "Relative position of bore point 3 between points 2 and 5",
                "Relative position of bore point 4 between points 3 and 5",
            ]
        );
        assert_eq!(constraints.number_of_holes(), 1);
        assert_eq!(constraints.objective_display_name(), "Bore Position optimizer");
        assert_eq!(constraints.objective_function_name(), "BorePositionObjectiveFunction");
        assert_eq!(constraints.constraints_name(), "Default");
    }

    #[test]
    fn fixed_bottom_constraint_names() {
        let inst = instrument(vec![]);
        let objective = BorePositionObjectiveFunction::new(&inst, 2, true).unwrap();
        let names: Vec<String> = objective.constraints().iter().map(|c| c.name.clone()).collect();
        assert_eq!(
            names,
            vec![
                "Relative position of bore point 3 between points 2 and 5".to_string(),
                "Relative position of bore point 4 between points 3 and 5".to_string(),
            ]
        );
    }
}
