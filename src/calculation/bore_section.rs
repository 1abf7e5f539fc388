//! Conical and cylindrical bore sections.

use num_complex::Complex64;

use crate::geometry::BoreSection;
use crate::physical::PhysicalParameters;
use crate::types::{imag, real, TransferMatrix, CONE_RADIUS_REL_TOL};

use super::{cylinder_loss_factor, lossy_wave_number};

/// Transfer matrix of a bore section, upstream (left) face from downstream (right) face.
pub fn calc_bore_section_matrix(
    section: &BoreSection,
    wave_number: f64,
    params: &PhysicalParameters,
) -> TransferMatrix {
    let length = section.length;
    let r1 = section.left_radius;
    let r2 = section.right_radius;

    if (r2 - r1).abs() < CONE_RADIUS_REL_TOL * r1 {
        return cylinder_matrix(length, 0.5 * (r1 + r2), wave_number, params);
    }
    cone_matrix(length, r1, r2, wave_number, params)
}

fn cylinder_matrix(
    length: f64,
    radius: f64,
    wave_number: f64,
    params: &PhysicalParameters,
) -> TransferMatrix {
    let k = lossy_wave_number(wave_number, cylinder_loss_factor(wave_number, radius, params));
    let z0 = params.calc_z0(radius);
    let kl = k * length;
    let (cos_kl, sin_kl) = (kl.cos(), kl.sin());

    TransferMatrix::new(
        cos_kl,
        imag(z0) * sin_kl,
        imag(1.0 / z0) * sin_kl,
        cos_kl,
    )
}

/// Spherical-wave cone matrix. `x1`, `x2` are the distances of the two faces
/// from the (virtual) apex.
fn cone_matrix(
    length: f64,
    r1: f64,
    r2: f64,
    wave_number: f64,
    params: &PhysicalParameters,
) -> TransferMatrix {
    // Log-mean radius gives the average boundary-layer loss along the taper.
    let mean_radius = (r2 - r1) / (r2 / r1).ln();
    let k = lossy_wave_number(wave_number, cylinder_loss_factor(wave_number, mean_radius, params));

    let x1 = r1 * length / (r2 - r1);
    let x2 = r2 * length / (r2 - r1);
    let kl = k * length;
    let (cos_kl, sin_kl) = (kl.cos(), kl.sin());

    let rho_c = params.rho() * params.speed_of_sound();
    let area_scale = std::f64::consts::PI * r1 * r2 / rho_c;

    let a = real(r2 / r1) * cos_kl - sin_kl / (k * x1);
    let b = imag(1.0 / area_scale) * sin_kl;
    let c = imag(area_scale)
        * ((Complex64::new(1.0, 0.0) + 1.0 / (k * k * x1 * x2)) * sin_kl
            - cos_kl * length / (k * x1 * x2));
    let d = real(r1 / r2) * cos_kl + sin_kl / (k * x2);

    TransferMatrix::new(a, b, c, d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::test_support::{assert_close, determinant};

    fn section(length: f64, r1: f64, r2: f64) -> BoreSection {
        BoreSection {
            length,
            left_radius: r1,
            right_radius: r2,
            right_position: length,
        }
    }

    #[test]
    fn cylinder_is_reciprocal() {
        let params = PhysicalParameters::default();
        let k = params.calc_wave_number(523.0);
        let tm = calc_bore_section_matrix(&section(0.12, 0.008, 0.008), k, &params);
        assert_close(determinant(&tm), real(1.0), 1e-10);
        assert_close(tm[(0, 0)], tm[(1, 1)], 1e-12);
    }

    #[test]
    fn cone_is_reciprocal() {
        let params = PhysicalParameters::default();
        for &freq in &[150.0, 700.0, 2400.0] {
            let k = params.calc_wave_number(freq);
            let expanding = calc_bore_section_matrix(&section(0.2, 0.006, 0.011), k, &params);
            let contracting = calc_bore_section_matrix(&section(0.2, 0.011, 0.006), k, &params);
            assert_close(determinant(&expanding), real(1.0), 1e-9);
            assert_close(determinant(&contracting), real(1.0), 1e-9);
        }
    }

    #[test]
    fn shallow_cone_approaches_cylinder() {
        let params = PhysicalParameters::default();
        let k = params.calc_wave_number(440.0);
        let cylinder = calc_bore_section_matrix(&section(0.15, 0.009, 0.009), k, &params);
        let cone = calc_bore_section_matrix(&section(0.15, 0.009, 0.009 * (1.0 + 1e-5)), k, &params);
        for i in 0..2 {
            for j in 0..2 {
                assert_close(cone[(i, j)], cylinder[(i, j)], 1e-3);
            }
        }
    }

    #[test]
    fn lossless_half_wave_cylinder_is_inverting() {
        // With a vanishingly small loss the half-wave section maps (p, U) to (-p, -U).
        let params = PhysicalParameters::default();
        let length = 0.25;
        let k = std::f64::consts::PI / length;
        let tm = calc_bore_section_matrix(&section(length, 0.5, 0.5), k, &params);
        assert!((tm[(0, 0)].re + 1.0).abs() < 1e-3);
        assert!(tm[(0, 1)].norm() < 1e-3 * params.calc_z0(0.5));
    }
}
