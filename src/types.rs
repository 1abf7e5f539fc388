//! Type aliases, constants, and core enums for the bore model.

use nalgebra::{Matrix2, Vector2};
use num_complex::Complex64;

// Type aliases for the acoustic two-port algebra
pub type TransferMatrix = Matrix2<Complex64>;
/// Acoustic state at a plane: (pressure, volume flow).
pub type StateVector = Vector2<Complex64>;

// Core constants
pub const TWO_PI: f64 = 2.0 * std::f64::consts::PI;
pub const GAS_CONSTANT: f64 = 8.314_462_618;
pub const KELVIN_OFFSET: f64 = 273.15;

/// Radii closer than this (relative) are treated as a cylinder.
pub const CONE_RADIUS_REL_TOL: f64 = 1e-6;

/// Unflanged open-end length correction, as a fraction of the radius (Levine & Schwinger).
pub const UNFLANGED_END_CORRECTION: f64 = 0.6133;
/// Flanged open-end length correction, as a fraction of the radius.
pub const FLANGED_END_CORRECTION: f64 = 0.8216;

/// Default ratio between the target frequency and the edges of the resonance search band.
pub const DEFAULT_FREQ_RANGE: f64 = 2.0;
/// Default number of spectrum samples across the search band.
pub const DEFAULT_NUMBER_OF_FREQUENCIES: usize = 2000;

/// Minimum clearance (m) kept between the lowest tone hole and the bottom bore point.
pub const MIN_BOTTOM_HOLE_CLEARANCE: f64 = 0.012;

/// Smallest hole diameter (m) an optimizer may propose.
pub const MIN_HOLE_DIAMETER: f64 = 0.0005;

/// Error (cents) charged for a fingering whose search band holds no resonance.
pub const NO_RESONANCE_PENALTY_CENTS: f64 = 1200.0;

/// Default cap on objective-function evaluations per optimization run.
pub const DEFAULT_MAX_EVALUATIONS: usize = 10_000;

/// Constraint category used by the bore-position objective.
pub const BORE_POSITION_CATEGORY: &str = "Bore point positions";
/// Constraint category used by the hole-size objective.
pub const HOLE_SIZE_CATEGORY: &str = "Hole size";

/// Shorthand for a purely real complex number.
#[inline]
pub fn real(value: f64) -> Complex64 {
    Complex64::new(value, 0.0)
}

/// Shorthand for a purely imaginary complex number.
#[inline]
pub fn imag(value: f64) -> Complex64 {
    Complex64::new(0.0, value)
}

/// Pitch difference in cents between `frequency` and `reference`.
pub fn cents(reference: f64, frequency: f64) -> f64 {
    if reference <= 0.0 || frequency <= 0.0 {
        return 0.0;
    }
    1200.0 * (frequency / reference).log2()
}
