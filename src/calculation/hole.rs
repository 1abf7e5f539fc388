//! Tone-hole T-network.
//!
//! Length corrections follow Lefebvre & Scavone (2012) and Dalmont et al. (2002):
//! matching volume `tm`, inner correction `ti`, series correction `ta`.

use num_complex::Complex64;

use crate::geometry::Hole;
use crate::physical::PhysicalParameters;
use crate::types::{imag, real, TransferMatrix};

use super::{cylinder_loss_factor, lossy_wave_number};

/// Radiation end correction of an open chimney, as a fraction of the hole radius.
const HOLE_END_CORRECTION: f64 = 0.61;

pub fn calc_hole_matrix(hole: &Hole, wave_number: f64, params: &PhysicalParameters) -> TransferMatrix {
    let bore_radius = 0.5 * hole.bore_diameter;
    let radius = 0.5 * hole.diameter;
    let delta = radius / bore_radius;
    let delta2 = delta * delta;

    let z0_hole = params.calc_z0(radius);

    let tm = 0.125 * radius * delta * (1.0 + 0.207 * delta * delta2);
    let te = hole.height + tm;

    let ti = radius
        * (0.822
            + delta
                * (-0.095 + delta * (-1.566 + delta * (2.138 + delta * (-1.640 + delta * 0.502)))));
    let ta = (-0.35 + 0.06 * (2.7 * hole.height / radius).tanh()) * radius * delta2;

    let k_hole = lossy_wave_number(wave_number, cylinder_loss_factor(wave_number, radius, params));
    let tan_kte = (k_hole * te).tan();

    let zs = if hole.is_open {
        let kb = wave_number * radius;
        let radiation = Complex64::new(0.25 * kb * kb, wave_number * HOLE_END_CORRECTION * radius);
        let chimney = (radiation + Complex64::i() * tan_kte)
            / (Complex64::new(1.0, 0.0) + Complex64::i() * radiation * tan_kte);
        real(z0_hole) * (imag(wave_number * ti) + chimney)
    } else {
        real(z0_hole) * (imag(wave_number * ti) - Complex64::i() / tan_kte)
    };
    let ys = zs.inv();
    let za = imag(params.calc_z0(bore_radius) * wave_number * ta);
    let za_ys = za * ys;

    let diagonal = Complex64::new(1.0, 0.0) + za_ys * 0.5;
    TransferMatrix::new(
        diagonal,
        za * (Complex64::new(1.0, 0.0) + za_ys * 0.25),
        ys,
        diagonal,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::test_support::{assert_close, determinant};

    fn hole(open: bool) -> Hole {
        let mut hole = Hole::new(0.2, 0.007, 0.004);
        hole.bore_diameter = 0.016;
        hole.is_open = open;
        hole
    }

    #[test]
    fn hole_matrix_is_reciprocal() {
        let params = PhysicalParameters::default();
        for &open in &[true, false] {
            let k = params.calc_wave_number(610.0);
            let tm = calc_hole_matrix(&hole(open), k, &params);
            assert_close(determinant(&tm), real(1.0), 1e-9);
        }
    }

    #[test]
    fn open_hole_shunts_more_flow_than_closed() {
        let params = PhysicalParameters::default();
        let k = params.calc_wave_number(400.0);
        let open = calc_hole_matrix(&hole(true), k, &params);
        let closed = calc_hole_matrix(&hole(false), k, &params);
        assert!(open[(1, 0)].norm() > 10.0 * closed[(1, 0)].norm());
    }

    #[test]
    fn closed_hole_admittance_is_compliant() {
        // At low frequency a closed chimney behaves as a small volume: positive
        // imaginary admittance.
        let params = PhysicalParameters::default();
        let k = params.calc_wave_number(200.0);
        let tm = calc_hole_matrix(&hole(false), k, &params);
        assert!(tm[(1, 0)].im > 0.0);
    }
}
