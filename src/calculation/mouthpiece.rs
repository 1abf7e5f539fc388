//! Mouthpiece as a series impedance at the excitation plane, with the bore
//! above it (headspace) as a closed side branch.

use num_complex::Complex64;

use crate::geometry::{BoreSection, Mouthpiece, MouthpieceKind};
use crate::physical::PhysicalParameters;
use crate::types::{StateVector, TransferMatrix, TWO_PI};

use super::bore_section::calc_bore_section_matrix;

/// Two-sided flanged end correction of a thin orifice, in equivalent radii.
const ORIFICE_END_CORRECTION: f64 = 1.7;

/// Series window impedance after a headspace shunt:
/// `[[1, Zm], [0, 1]] × [[1, 0], [Yh, 1]]`. Folding it turns a bore
/// impedance `Z` into `1 / (1/Z + Yh) + Zm`; without headspace it adds
/// exactly `calc_z`.
pub fn calc_mouthpiece_matrix(
    mouthpiece: &Mouthpiece,
    wave_number: f64,
    params: &PhysicalParameters,
) -> TransferMatrix {
    let zm = calc_z(mouthpiece, params.calc_frequency(wave_number), params);
    let yh = calc_headspace_admittance(mouthpiece, wave_number, params);
    let one = Complex64::new(1.0, 0.0);
    TransferMatrix::new(one + zm * yh, zm, yh, one)
}

/// Admittance looking up into the headspace from the mouthpiece plane.
/// Zero when the mouthpiece sits at the top of the bore.
pub fn calc_headspace_admittance(
    mouthpiece: &Mouthpiece,
    wave_number: f64,
    params: &PhysicalParameters,
) -> Complex64 {
    // Rigid top: no flow.
    let mut state = StateVector::new(Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0));
    for section in &mouthpiece.headspace {
        // Walk each section from its top face down, flow positive upward.
        let reversed = BoreSection {
            length: section.length,
            left_radius: section.right_radius,
            right_radius: section.left_radius,
            right_position: section.right_position - section.length,
        };
        state = calc_bore_section_matrix(&reversed, wave_number, params) * state;
    }
    state[1] / state[0]
}

/// Impedance of the window, embouchure, or reed volume at `frequency`.
pub fn calc_z(mouthpiece: &Mouthpiece, frequency: f64, params: &PhysicalParameters) -> Complex64 {
    let omega = TWO_PI * frequency;
    let rho = params.rho();
    match &mouthpiece.kind {
        MouthpieceKind::Fipple {
            window_length,
            window_width,
            window_height,
            fipple_factor,
        } => {
            let area = window_length * window_width;
            let effective_length =
                fipple_factor * (window_height + ORIFICE_END_CORRECTION * equivalent_radius(area));
            orifice_impedance(area, effective_length, frequency, params)
        }
        MouthpieceKind::EmbouchureHole {
            length,
            width,
            height,
        } => {
            let area = 0.25 * std::f64::consts::PI * length * width;
            let effective_length = height + ORIFICE_END_CORRECTION * equivalent_radius(area);
            orifice_impedance(area, effective_length, frequency, params)
        }
        MouthpieceKind::Reed { length_correction } => {
            let radius = 0.5 * mouthpiece.bore_diameter;
            let area = std::f64::consts::PI * radius * radius;
            if area <= 0.0 {
                return Complex64::new(0.0, 0.0);
            }
            Complex64::new(0.0, omega * rho * length_correction / area)
        }
    }
}

/// −1 for flute-type mouthpieces (sound at impedance minima), +1 for reeds.
pub fn reflectance_multiplier(mouthpiece: &Mouthpiece) -> f64 {
    if mouthpiece.is_pressure_node() {
        -1.0
    } else {
        1.0
    }
}

fn equivalent_radius(area: f64) -> f64 {
    (area / std::f64::consts::PI).sqrt()
}

/// Inertance of an orifice plus its free-field radiation resistance.
fn orifice_impedance(
    area: f64,
    effective_length: f64,
    frequency: f64,
    params: &PhysicalParameters,
) -> Complex64 {
    if area <= 0.0 {
        return Complex64::new(0.0, 0.0);
    }
    let omega = TWO_PI * frequency;
    let k = params.calc_wave_number(frequency);
    let rho = params.rho();
    let resistance = rho * params.speed_of_sound() * k * k / (4.0 * std::f64::consts::PI);
    Complex64::new(resistance, omega * rho * effective_length / area)
}
