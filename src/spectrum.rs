//! Resonance search around a target pitch.
//!
//! The band `[target / r, target * r]` is sampled at log-spaced frequencies
//! (endpoints included). At each sample the phase-corrected reflectance Γ is
//! computed and the curve `|1 − Γ|` recorded; resonances are its strict local
//! minima, and the one nearest the target is the played frequency.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::solver::InstrumentCalculator;
use crate::types::{DEFAULT_FREQ_RANGE, DEFAULT_NUMBER_OF_FREQUENCIES};

/// Width and resolution of the resonance search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchBand {
    freq_range: f64,
    number_of_frequencies: usize,
}

impl SearchBand {
    pub fn new(freq_range: f64, number_of_frequencies: usize) -> Result<Self> {
        if !(freq_range > 1.0) || !freq_range.is_finite() {
            return Err(Error::InvalidSearchBand(format!(
                "frequency range ratio must exceed 1, got {freq_range}"
            )));
        }
        if number_of_frequencies < 3 {
            return Err(Error::InvalidSearchBand(format!(
                "need at least 3 frequencies, got {number_of_frequencies}"
            )));
        }
        Ok(Self {
            freq_range,
            number_of_frequencies,
        })
    }

    pub fn freq_range(&self) -> f64 {
        self.freq_range
    }

    pub fn number_of_frequencies(&self) -> usize {
        self.number_of_frequencies
    }

    /// Log-spaced sample frequencies around `target`.
    pub fn frequencies(&self, target: f64) -> Vec<f64> {
        let lowest = target / self.freq_range;
        let ratio = self.freq_range * self.freq_range;
        let steps = (self.number_of_frequencies - 1) as f64;
        (0..self.number_of_frequencies)
            .map(|i| lowest * ratio.powf(i as f64 / steps))
            .collect()
    }
}

impl Default for SearchBand {
    fn default() -> Self {
        Self {
            freq_range: DEFAULT_FREQ_RANGE,
            number_of_frequencies: DEFAULT_NUMBER_OF_FREQUENCIES,
        }
    }
}

/// Sampled resonance curve: (frequency, |1 − Γ|) pairs in ascending frequency.
///
/// Plain `|Γ|` stays close to 1 across the band in a low-loss bore and its
/// dips mark loss peaks rather than tuning. `|1 − Γ|` also uses the phase: it
/// is smallest where the returning wave arrives in phase with the
/// mouthpiece's excitation, which is the sounding condition.
#[derive(Debug, Clone, PartialEq)]
pub struct ReflectanceSpectrum {
    points: Vec<(f64, f64)>,
}

impl ReflectanceSpectrum {
    /// Sample the calculator's current fingering across the band.
    pub fn sample(calculator: &InstrumentCalculator, target: f64, band: &SearchBand) -> Self {
        let frequencies = band.frequencies(target);
        let curve = |frequency: f64| {
            let gamma = calculator.calc_reflection_coefficient(frequency);
            (frequency, (1.0 - gamma).norm())
        };

        #[cfg(feature = "parallel")]
        let points = frequencies.into_par_iter().map(curve).collect();
        #[cfg(not(feature = "parallel"))]
        let points = frequencies.into_iter().map(curve).collect();

        Self { points }
    }

    /// Wrap an existing curve; points are sorted by frequency.
    pub fn from_curve(mut points: Vec<(f64, f64)>) -> Self {
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self { points }
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Indices of samples strictly lower than both neighbours.
    fn minimum_indices(&self) -> Vec<usize> {
        self.points
            .windows(3)
            .enumerate()
            .filter(|(_, w)| w[1].1 < w[0].1 && w[1].1 < w[2].1)
            .map(|(i, _)| i + 1)
            .collect()
    }

    /// Refined frequencies of every resonance in the band.
    pub fn minima(&self) -> Vec<f64> {
        self.minimum_indices()
            .into_iter()
            .map(|i| self.refine(i))
            .collect()
    }

    /// Resonance closest to `target`, if any.
    pub fn nearest_minimum(&self, target: f64) -> Option<f64> {
        let index = self
            .minimum_indices()
            .into_iter()
            .min_by(|&a, &b| {
                let da = (self.points[a].0 - target).abs();
                let db = (self.points[b].0 - target).abs();
                da.total_cmp(&db)
            })?;
        Some(self.refine(index))
    }

    /// Vertex of the parabola through a minimum and its neighbours, kept
    /// inside the bracketing samples.
    fn refine(&self, index: usize) -> f64 {
        let (x0, y0) = self.points[index - 1];
        let (x1, y1) = self.points[index];
        let (x2, y2) = self.points[index + 1];

        let a = (x1 - x0) * (y1 - y2);
        let b = (x1 - x2) * (y1 - y0);
        let vertex = x1 - 0.5 * ((x1 - x0) * a - (x1 - x2) * b) / (a - b);
        if !vertex.is_finite() {
            return x1;
        }
        vertex.clamp(x0, x2)
    }
}

/// Played frequency for the calculator's current hole state.
pub fn find_played_frequency(
    calculator: &InstrumentCalculator,
    target: f64,
    band: &SearchBand,
) -> Option<f64> {
    let spectrum = ReflectanceSpectrum::sample(calculator, target, band);
    let played = spectrum.nearest_minimum(target);
    match played {
        Some(frequency) => debug!(target, frequency, "resonance found"),
        None => debug!(target, "no resonance in search band"),
    }
    played
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v_curve(minima: &[f64]) -> ReflectanceSpectrum {
        let points = (10..=150)
            .map(|i| {
                let f = 10.0 * i as f64;
                let depth = minima
                    .iter()
                    .map(|m| (f - m).abs() / m)
                    .fold(f64::INFINITY, f64::min);
                (f, depth)
            })
            .collect();
        ReflectanceSpectrum::from_curve(points)
    }

    #[test]
    fn selects_minimum_nearest_target() {
        let spectrum = v_curve(&[300.0, 600.0, 1200.0]);
        let played = spectrum.nearest_minimum(620.0).unwrap();
        assert!((played - 600.0).abs() < 1e-9, "played = {}", played);
        assert_eq!(spectrum.minima().len(), 3);
    }

    #[test]
    fn nearest_minimum_follows_target() {
        let spectrum = v_curve(&[300.0, 600.0, 1200.0]);
        assert!((spectrum.nearest_minimum(350.0).unwrap() - 300.0).abs() < 1e-9);
        assert!((spectrum.nearest_minimum(1000.0).unwrap() - 1200.0).abs() < 1e-9);
    }

    #[test]
    fn monotonic_curve_has_no_resonance() {
        let points = (1..100).map(|i| (i as f64, 1.0 / i as f64)).collect();
        let spectrum = ReflectanceSpectrum::from_curve(points);
        assert_eq!(spectrum.nearest_minimum(50.0), None);
    }

    #[test]
    fn plateau_is_not_a_minimum() {
        let spectrum =
            ReflectanceSpectrum::from_curve(vec![(1.0, 2.0), (2.0, 1.0), (3.0, 1.0), (4.0, 2.0)]);
        assert!(spectrum.minima().is_empty());
    }

    #[test]
    fn refinement_stays_in_bracket() {
        let spectrum = ReflectanceSpectrum::from_curve(vec![(100.0, 1.0), (110.0, 0.2), (111.0, 0.25)]);
        let played = spectrum.nearest_minimum(105.0).unwrap();
        assert!(played >= 100.0 && played <= 111.0);
    }

    #[test]
    fn band_is_log_spaced() {
        let band = SearchBand::new(2.0, 5).unwrap();
        let f = band.frequencies(400.0);
        assert_eq!(f.len(), 5);
        assert!((f[0] - 200.0).abs() < 1e-9);
        assert!((f[2] - 400.0).abs() < 1e-9);
        assert!((f[4] - 800.0).abs() < 1e-9);
        assert!((f[1] / f[0] - f[4] / f[3]).abs() < 1e-12);
    }

    #[test]
    fn invalid_bands_are_rejected() {
        assert!(SearchBand::new(1.0, 100).is_err());
        assert!(SearchBand::new(2.0, 2).is_err());
    }
}
