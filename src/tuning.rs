//! Target notes, fingerings, and tunings.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::Instrument;

/// A target pitch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub name: String,
    /// Nominal frequency (Hz).
    pub frequency: f64,
    #[serde(default)]
    pub frequency_min: Option<f64>,
    #[serde(default)]
    pub frequency_max: Option<f64>,
}

impl Note {
    pub fn new(name: impl Into<String>, frequency: f64) -> Self {
        Self {
            name: name.into(),
            frequency,
            frequency_min: None,
            frequency_max: None,
        }
    }

    pub fn with_range(mut self, frequency_min: f64, frequency_max: f64) -> Self {
        self.frequency_min = Some(frequency_min);
        self.frequency_max = Some(frequency_max);
        self
    }
}

/// Hole states (top to bottom, `true` = open) that sound a note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fingering {
    pub note: Note,
    pub open_holes: Vec<bool>,
}

impl Fingering {
    pub fn new(note: Note, open_holes: Vec<bool>) -> Self {
        Self { note, open_holes }
    }

    pub fn target_frequency(&self) -> f64 {
        self.note.frequency
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    pub name: String,
    pub fingerings: Vec<Fingering>,
}

impl Tuning {
    pub fn new(name: impl Into<String>, fingerings: Vec<Fingering>) -> Self {
        Self {
            name: name.into(),
            fingerings,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Every fingering must describe exactly one state per instrument hole.
    pub fn check_holes(&self, instrument: &Instrument) -> Result<()> {
        let expected = instrument.holes().len();
        for fingering in &self.fingerings {
            if fingering.open_holes.len() != expected {
                return Err(Error::FingeringMismatch {
                    name: fingering.note.name.clone(),
                    expected,
                    actual: fingering.open_holes.len(),
                });
            }
        }
        Ok(())
    }

    pub fn target_frequencies(&self) -> Vec<f64> {
        self.fingerings.iter().map(|f| f.target_frequency()).collect()
    }
}
