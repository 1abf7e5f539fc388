//! Per-component acoustic calculators.
//!
//! Each calculator is a pure function of one geometric element, a wave number,
//! and the physical parameters. Transfer matrices map the (pressure, flow)
//! state at the downstream face of a component to its upstream face, so an
//! instrument is evaluated by folding matrices from the termination upward.

pub mod bore_section;
pub mod hole;
pub mod mouthpiece;
pub mod termination;

use num_complex::Complex64;

use crate::geometry::Component;
use crate::physical::PhysicalParameters;
use crate::types::TransferMatrix;

pub use bore_section::calc_bore_section_matrix;
pub use hole::calc_hole_matrix;
pub use mouthpiece::{
    calc_headspace_admittance, calc_mouthpiece_matrix, calc_z as calc_mouthpiece_z,
    reflectance_multiplier,
};
pub use termination::calc_state_vector;

/// Transfer matrix for any chain component.
pub fn calc_transfer_matrix(
    component: &Component,
    wave_number: f64,
    params: &PhysicalParameters,
) -> TransferMatrix {
    match component {
        Component::Mouthpiece(mouthpiece) => calc_mouthpiece_matrix(mouthpiece, wave_number, params),
        Component::BoreSection(section) => calc_bore_section_matrix(section, wave_number, params),
        Component::Hole(hole) => calc_hole_matrix(hole, wave_number, params),
    }
}

/// Complex wave number with visco-thermal boundary-layer losses folded in.
///
/// `loss_factor` is the dimensionless ε in `k(1+ε) − jkε`.
pub(crate) fn lossy_wave_number(wave_number: f64, loss_factor: f64) -> Complex64 {
    Complex64::new(
        wave_number * (1.0 + loss_factor),
        -wave_number * loss_factor,
    )
}

/// Loss factor for a cylinder of the given radius.
pub(crate) fn cylinder_loss_factor(wave_number: f64, radius: f64, params: &PhysicalParameters) -> f64 {
    if wave_number <= 0.0 || radius <= 0.0 {
        return 0.0;
    }
    params.alpha_constant() / (radius * wave_number.sqrt())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lossy_wave_number_attenuates_forward_wave() {
        let k = lossy_wave_number(10.0, 0.01);
        assert!(k.re > 10.0);
        assert!(k.im < 0.0);
        assert!((k.im + 0.1).abs() < 1e-12);
    }

    #[test]
    fn loss_factor_shrinks_with_radius() {
        let params = PhysicalParameters::default();
        let narrow = cylinder_loss_factor(8.0, 0.002, &params);
        let wide = cylinder_loss_factor(8.0, 0.01, &params);
        assert!(narrow > wide);
        assert!(wide > 0.0);
        assert_eq!(cylinder_loss_factor(0.0, 0.01, &params), 0.0);
    }
}
