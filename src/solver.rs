//! Transfer-matrix solver for a complete instrument.
//!
//! The solver folds component matrices from the termination up to the
//! mouthpiece and reads the result either as a reflectance against the
//! mouthpiece bore or as an input impedance.

use num_complex::Complex64;
use tracing::warn;

use crate::calculation::{
    calc_headspace_admittance, calc_mouthpiece_z, calc_state_vector, calc_transfer_matrix,
    reflectance_multiplier,
};
use crate::error::Result;
use crate::geometry::{Component, Instrument};
use crate::physical::PhysicalParameters;
use crate::spectrum::{find_played_frequency, SearchBand};
use crate::tuning::Fingering;
use crate::types::StateVector;

/// Instrument plus the environment it is played in.
#[derive(Debug, Clone)]
pub struct InstrumentCalculator {
    instrument: Instrument,
    params: PhysicalParameters,
}

impl InstrumentCalculator {
    pub fn new(instrument: Instrument, params: PhysicalParameters) -> Self {
        Self { instrument, params }
    }

    pub fn instrument(&self) -> &Instrument {
        &self.instrument
    }

    /// Mutable access for objective functions writing geometry.
    pub fn instrument_mut(&mut self) -> &mut Instrument {
        &mut self.instrument
    }

    pub fn into_instrument(self) -> Instrument {
        self.instrument
    }

    pub fn params(&self) -> &PhysicalParameters {
        &self.params
    }

    pub fn set_params(&mut self, params: PhysicalParameters) {
        self.params = params;
    }

    /// Set hole open states for a fingering.
    pub fn apply_fingering(&mut self, fingering: &Fingering) -> Result<()> {
        self.instrument.set_open_holes(fingering)
    }

    // ========================================================================
    // Chain evaluation
    // ========================================================================

    /// Fold every component after `skip` leading ones onto the termination state.
    fn fold_chain(&self, wave_number: f64, skip: usize) -> StateVector {
        let mut state = calc_state_vector(self.instrument.termination(), wave_number, &self.params);
        for component in self.instrument.components().iter().skip(skip).rev() {
            state = calc_transfer_matrix(component, wave_number, &self.params) * state;
        }
        state
    }

    /// Complex reflectance at the mouthpiece, phase-corrected for the
    /// mouthpiece type so that resonances sit near `1 + 0j`.
    pub fn calc_reflection_coefficient(&self, frequency: f64) -> Complex64 {
        let wave_number = self.params.calc_wave_number(frequency);
        let state = self.fold_chain(wave_number, 0);

        let mouthpiece = self.instrument.mouthpiece();
        let z0 = self.params.calc_z0(0.5 * mouthpiece.bore_diameter);
        let (p, u) = (state[0], state[1]);
        let reflectance = (p - u * z0) / (p + u * z0);
        reflectance * reflectance_multiplier(mouthpiece)
    }

    /// Input impedance at the excitation plane: bore impedance below the
    /// mouthpiece in parallel with the headspace, plus the mouthpiece's own
    /// impedance.
    pub fn calc_z(&self, frequency: f64) -> Complex64 {
        let wave_number = self.params.calc_wave_number(frequency);
        let skip = match self.instrument.components().first() {
            Some(Component::Mouthpiece(_)) => 1,
            _ => 0,
        };
        let state = self.fold_chain(wave_number, skip);
        let mouthpiece = self.instrument.mouthpiece();
        let yh = calc_headspace_admittance(mouthpiece, wave_number, &self.params);
        state[0] / (state[1] + yh * state[0]) + calc_mouthpiece_z(mouthpiece, frequency, &self.params)
    }

    /// Predicted sounding frequency for a fingering, or `None` when no
    /// resonance lies in the search band.
    pub fn played_frequency(&mut self, fingering: &Fingering, band: &SearchBand) -> Option<f64> {
        if let Err(err) = self.apply_fingering(fingering) {
            warn!(note = %fingering.note.name, error = %err, "fingering does not fit instrument");
            return None;
        }
        find_played_frequency(self, fingering.target_frequency(), band)
    }
}
