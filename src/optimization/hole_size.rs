//! Tone-hole diameters as optimization dimensions, one per hole, top to bottom.

use tracing::debug;

use crate::error::{Error, Result};
use crate::geometry::Instrument;
use crate::types::{HOLE_SIZE_CATEGORY, MIN_HOLE_DIAMETER};

use super::constraints::{Constraint, ConstraintType};
use super::objective::{ObjectiveBase, ObjectiveFunction};

pub const DISPLAY_NAME: &str = "Hole size optimizer";
pub const FUNCTION_NAME: &str = "HoleSizeObjectiveFunction";

#[derive(Debug, Clone)]
pub struct HoleSizeObjectiveFunction {
    base: ObjectiveBase,
}

impl HoleSizeObjectiveFunction {
    pub fn new(instrument: &Instrument) -> Result<Self> {
        let nr_holes = instrument.holes().len();
        if nr_holes == 0 {
            return Err(Error::NoDimensions);
        }
        let mut base = ObjectiveBase::new(nr_holes);
        for i in 0..nr_holes {
            base.constraints.add_constraint(Constraint::new(
                HOLE_SIZE_CATEGORY,
                format!("Hole {} diameter", i + 1),
                ConstraintType::Dimensional,
            ));
        }
        base.constraints.set_number_of_holes(nr_holes);
        base.constraints.set_objective_display_name(DISPLAY_NAME);
        base.constraints.set_objective_function_name(FUNCTION_NAME);
        base.constraints.set_constraints_name("Default");
        Ok(Self { base })
    }
}

impl ObjectiveFunction for HoleSizeObjectiveFunction {
    fn base(&self) -> &ObjectiveBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ObjectiveBase {
        &mut self.base
    }

    fn geometry_point(&self, instrument: &Instrument) -> Vec<f64> {
        instrument.holes().iter().map(|h| h.diameter).collect()
    }

    fn set_geometry_point(&self, instrument: &mut Instrument, point: &[f64]) -> Result<()> {
        self.base.check_length(point.len())?;
        self.base.check_length(instrument.holes().len())?;
        for (hole, &diameter) in instrument.holes_mut().iter_mut().zip(point) {
            hole.diameter = diameter;
        }
        instrument.update_components();
        Ok(())
    }

    /// Holes narrower than the drilling minimum are not allowed.
    fn set_lower_bounds(&mut self, _instrument: &Instrument, mut bounds: Vec<f64>) -> Result<()> {
        self.base.check_length(bounds.len())?;
        for bound in bounds.iter_mut() {
            if *bound < MIN_HOLE_DIAMETER {
                debug!(proposed = *bound, "raising hole diameter lower bound");
                *bound = MIN_HOLE_DIAMETER;
            }
        }
        self.base.store_lower_bounds(bounds)
    }

    /// A hole cannot be wider than the bore it is drilled into.
    fn set_upper_bounds(&mut self, instrument: &Instrument, mut bounds: Vec<f64>) -> Result<()> {
        self.base.check_length(bounds.len())?;
        for (bound, hole) in bounds.iter_mut().zip(instrument.holes()) {
            if *bound > hole.bore_diameter {
                debug!(proposed = *bound, bore = hole.bore_diameter, "lowering hole diameter upper bound");
                *bound = hole.bore_diameter;
            }
        }
        self.base.store_upper_bounds(bounds)
    }
}
