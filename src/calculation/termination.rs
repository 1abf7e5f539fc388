//! Boundary state at the far end of the bore.

use num_complex::Complex64;

use crate::geometry::Termination;
use crate::physical::PhysicalParameters;
use crate::types::{StateVector, FLANGED_END_CORRECTION, UNFLANGED_END_CORRECTION};

/// Initial (pressure, flow) state: `[Zrad, 1]` for an open end, `[1, 0]` for a closed one.
pub fn calc_state_vector(
    termination: &Termination,
    wave_number: f64,
    params: &PhysicalParameters,
) -> StateVector {
    if termination.closed {
        return StateVector::new(Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0));
    }
    StateVector::new(
        radiation_impedance(termination, wave_number, params),
        Complex64::new(1.0, 0.0),
    )
}

/// Low-frequency radiation impedance of an open pipe end.
pub fn radiation_impedance(
    termination: &Termination,
    wave_number: f64,
    params: &PhysicalParameters,
) -> Complex64 {
    let radius = 0.5 * termination.bore_diameter;
    let ka = wave_number * radius;
    let z0 = params.calc_z0(radius);
    let flanged = termination.flange_diameter > termination.bore_diameter;
    let (resistance, correction) = if flanged {
        (0.5, FLANGED_END_CORRECTION)
    } else {
        (0.25, UNFLANGED_END_CORRECTION)
    };
    Complex64::new(z0 * resistance * ka * ka, z0 * correction * ka)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn termination(flange_diameter: f64) -> Termination {
        let mut t = Termination::open(flange_diameter);
        t.bore_diameter = 0.02;
        t
    }

    #[test]
    fn closed_end_has_no_flow() {
        let params = PhysicalParameters::default();
        let mut t = Termination::closed();
        t.bore_diameter = 0.02;
        let state = calc_state_vector(&t, 5.0, &params);
        assert_eq!(state[1], Complex64::new(0.0, 0.0));
        assert_eq!(state[0], Complex64::new(1.0, 0.0));
    }

    #[test]
    fn flange_lengthens_end_correction() {
        let params = PhysicalParameters::default();
        let k = params.calc_wave_number(500.0);
        let bare = radiation_impedance(&termination(0.0), k, &params);
        let flanged = radiation_impedance(&termination(0.1), k, &params);
        assert!(flanged.im > bare.im);
        assert!(flanged.re > bare.re);
    }

    #[test]
    fn open_end_correction_matches_levine_schwinger() {
        let params = PhysicalParameters::default();
        let k = params.calc_wave_number(300.0);
        let z = radiation_impedance(&termination(0.0), k, &params);
        let z0 = params.calc_z0(0.01);
        // Reactance of an end correction δ is Z0·k·δ.
        let delta = z.im / (z0 * k);
        assert!((delta / 0.01 - UNFLANGED_END_CORRECTION).abs() < 1e-12);
    }
}
