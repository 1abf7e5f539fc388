//! Study configuration: playing environment, resonance search, and optimizer
//! preferences, loadable from JSON.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::optimization::{ErrorNorm, OptimizerType};
use crate::physical::PhysicalParameters;
use crate::spectrum::SearchBand;
use crate::types::{DEFAULT_FREQ_RANGE, DEFAULT_NUMBER_OF_FREQUENCIES, NO_RESONANCE_PENALTY_CENTS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyConfig {
    /// Air temperature (°C).
    pub temperature: f64,
    /// Air pressure (kPa).
    pub pressure: f64,
    /// Relative humidity (%).
    pub humidity: f64,
    /// CO2 concentration (ppm).
    pub co2_ppm: f64,
    /// Overrides the objective's own choice for multivariate problems.
    pub optimizer: Option<OptimizerType>,
    pub freq_range: f64,
    pub number_of_frequencies: usize,
    pub error_norm: ErrorNorm,
    /// Overrides the objective's evaluation budget.
    pub max_evaluations: Option<usize>,
    pub no_resonance_penalty_cents: f64,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            temperature: 20.0,
            pressure: 101.325,
            humidity: 45.0,
            co2_ppm: 390.0,
            optimizer: None,
            freq_range: DEFAULT_FREQ_RANGE,
            number_of_frequencies: DEFAULT_NUMBER_OF_FREQUENCIES,
            error_norm: ErrorNorm::default(),
            max_evaluations: None,
            no_resonance_penalty_cents: NO_RESONANCE_PENALTY_CENTS,
        }
    }
}

impl StudyConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_humidity(mut self, humidity: f64) -> Self {
        self.humidity = humidity;
        self
    }

    pub fn with_optimizer(mut self, optimizer: OptimizerType) -> Self {
        self.optimizer = Some(optimizer);
        self
    }

    pub fn with_search_band(mut self, freq_range: f64, number_of_frequencies: usize) -> Self {
        self.freq_range = freq_range;
        self.number_of_frequencies = number_of_frequencies;
        self
    }

    pub fn with_error_norm(mut self, error_norm: ErrorNorm) -> Self {
        self.error_norm = error_norm;
        self
    }

    pub fn with_max_evaluations(mut self, max_evaluations: usize) -> Self {
        self.max_evaluations = Some(max_evaluations);
        self
    }

    pub fn physical_parameters(&self) -> Result<PhysicalParameters> {
        PhysicalParameters::new(self.temperature, self.pressure, self.humidity, self.co2_ppm)
    }

    pub fn search_band(&self) -> Result<SearchBand> {
        SearchBand::new(self.freq_range, self.number_of_frequencies)
    }
}
