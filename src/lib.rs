//! Acoustic model and geometry optimizer for woodwind bores.
//!
//! An [`Instrument`] is a mouthpiece, a bore profile given by bore points, a
//! set of tone holes, and a termination. The [`InstrumentCalculator`] folds
//! two-port transfer matrices along that chain to get the input impedance or
//! the reflectance seen from the mouthpiece, and the resonance finder turns a
//! reflectance sweep into the frequency a fingering plays.
//!
//! The [`optimization`] module adjusts geometry (bore point positions, hole
//! sizes) so the played frequencies match a [`Tuning`].
//!
//! # Features
//!
//! - `parallel` (default): sample spectra and evaluate fingerings with rayon.

pub mod calculation;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod geometry;
pub mod optimization;
pub mod physical;
pub mod solver;
pub mod spectrum;
pub mod tuning;
pub mod types;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use config::StudyConfig;
pub use error::{Error, Result};
pub use evaluator::{played_frequencies, CentDeviationEvaluator, Evaluator, FrequencyDeviationEvaluator};
pub use geometry::{BorePoint, BoreSection, Component, Hole, Instrument, Mouthpiece, MouthpieceKind, Termination};
pub use physical::PhysicalParameters;
pub use solver::InstrumentCalculator;
pub use spectrum::{find_played_frequency, ReflectanceSpectrum, SearchBand};
pub use tuning::{Fingering, Note, Tuning};
