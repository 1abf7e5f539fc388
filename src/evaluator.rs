//! Tuning evaluators: one error value per fingering, lower is better.
//!
//! With the `parallel` feature each fingering is played on its own clone of
//! the calculator, so nothing mutable is shared between workers.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::solver::InstrumentCalculator;
use crate::spectrum::SearchBand;
use crate::tuning::{Fingering, Tuning};
use crate::types::{cents, NO_RESONANCE_PENALTY_CENTS};

/// Scores an instrument against a tuning.
pub trait Evaluator {
    /// One error per fingering, in tuning order. Deterministic for a fixed
    /// instrument state.
    fn calculate_error_vector(&self, calculator: &mut InstrumentCalculator, tuning: &Tuning) -> Vec<f64>;
}

/// Played frequency of every fingering, `None` where the band holds no resonance.
pub fn played_frequencies(
    calculator: &mut InstrumentCalculator,
    tuning: &Tuning,
    band: &SearchBand,
) -> Vec<Option<f64>> {
    #[cfg(feature = "parallel")]
    let played = {
        let shared = &*calculator;
        tuning
            .fingerings
            .par_iter()
            .map(|fingering| shared.clone().played_frequency(fingering, band))
            .collect()
    };

    #[cfg(not(feature = "parallel"))]
    let played = tuning
        .fingerings
        .iter()
        .map(|fingering| calculator.played_frequency(fingering, band))
        .collect();

    played
}

fn error_vector<F>(
    calculator: &mut InstrumentCalculator,
    tuning: &Tuning,
    band: &SearchBand,
    penalty: f64,
    deviation: F,
) -> Vec<f64>
where
    F: Fn(&Fingering, f64) -> f64,
{
    played_frequencies(calculator, tuning, band)
        .into_iter()
        .zip(tuning.fingerings.iter())
        .map(|(played, fingering)| match played {
            Some(frequency) => deviation(fingering, frequency),
            None => penalty,
        })
        .collect()
}

/// Pitch error in cents.
#[derive(Debug, Clone, PartialEq)]
pub struct CentDeviationEvaluator {
    pub band: SearchBand,
    /// Error charged when no resonance is found.
    pub penalty: f64,
}

impl CentDeviationEvaluator {
    pub fn new(band: SearchBand) -> Self {
        Self {
            band,
            penalty: NO_RESONANCE_PENALTY_CENTS,
        }
    }

    pub fn with_penalty(mut self, penalty: f64) -> Self {
        self.penalty = penalty;
        self
    }
}

impl Default for CentDeviationEvaluator {
    fn default() -> Self {
        Self::new(SearchBand::default())
    }
}

impl Evaluator for CentDeviationEvaluator {
    fn calculate_error_vector(&self, calculator: &mut InstrumentCalculator, tuning: &Tuning) -> Vec<f64> {
        error_vector(calculator, tuning, &self.band, self.penalty, |fingering, played| {
            cents(fingering.target_frequency(), played)
        })
    }
}

/// Relative frequency error in percent.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyDeviationEvaluator {
    pub band: SearchBand,
    pub penalty: f64,
}

impl FrequencyDeviationEvaluator {
    pub fn new(band: SearchBand) -> Self {
        // A 1200 cent miss is a factor of two.
        Self { band, penalty: 100.0 }
    }

    pub fn with_penalty(mut self, penalty: f64) -> Self {
        self.penalty = penalty;
        self
    }
}

impl Default for FrequencyDeviationEvaluator {
    fn default() -> Self {
        Self::new(SearchBand::default())
    }
}

impl Evaluator for FrequencyDeviationEvaluator {
    fn calculate_error_vector(&self, calculator: &mut InstrumentCalculator, tuning: &Tuning) -> Vec<f64> {
        error_vector(calculator, tuning, &self.band, self.penalty, |fingering, played| {
            let target = fingering.target_frequency();
            if target > 0.0 {
                100.0 * (played - target) / target
            } else {
                0.0
            }
        })
    }
}
