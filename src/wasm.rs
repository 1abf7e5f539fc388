//! WASM bindings for browser integration.
//!
//! Instruments, tunings, and study configurations cross the boundary as JSON.
//! Build without the `parallel` feature for wasm32.

#![cfg(target_arch = "wasm32")]

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::config::StudyConfig;
use crate::evaluator::{played_frequencies, CentDeviationEvaluator};
use crate::geometry::Instrument;
use crate::optimization::{optimize, BorePositionObjectiveFunction, ObjectiveFunction, OptimizationOptions};
use crate::solver::InstrumentCalculator;
use crate::tuning::Tuning;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// An empty string means the default configuration.
fn parse_config(config_json: &str) -> Result<StudyConfig, JsValue> {
    if config_json.trim().is_empty() {
        return Ok(StudyConfig::default());
    }
    StudyConfig::from_json(config_json).map_err(js_error)
}

fn calculator(instrument_json: &str, config: &StudyConfig) -> Result<InstrumentCalculator, JsValue> {
    let instrument = Instrument::from_json(instrument_json).map_err(js_error)?;
    let params = config.physical_parameters().map_err(js_error)?;
    Ok(InstrumentCalculator::new(instrument, params))
}

/// Played frequency of every fingering in a tuning.
///
/// # Returns
/// JSON array with one entry per fingering: a frequency in Hz, or `null`
/// when no resonance lies in the search band.
#[wasm_bindgen]
pub fn compute_played_frequencies(
    instrument_json: &str,
    tuning_json: &str,
    config_json: &str,
) -> Result<String, JsValue> {
    let config = parse_config(config_json)?;
    let mut calc = calculator(instrument_json, &config)?;
    let tuning = Tuning::from_json(tuning_json).map_err(js_error)?;
    tuning.check_holes(calc.instrument()).map_err(js_error)?;
    let band = config.search_band().map_err(js_error)?;

    let played = played_frequencies(&mut calc, &tuning, &band);
    serde_json::to_string(&played).map_err(js_error)
}

/// Input impedance at each frequency, with all holes as given in the instrument.
///
/// # Returns
/// JSON array of `[re, im]` pairs.
#[wasm_bindgen]
pub fn compute_impedance(
    instrument_json: &str,
    frequencies_json: &str,
    config_json: &str,
) -> Result<String, JsValue> {
    let config = parse_config(config_json)?;
    let calc = calculator(instrument_json, &config)?;
    let frequencies: Vec<f64> = serde_json::from_str(frequencies_json).map_err(js_error)?;

    let impedance: Vec<[f64; 2]> = frequencies
        .iter()
        .map(|&f| {
            let z = calc.calc_z(f);
            [z.re, z.im]
        })
        .collect();
    serde_json::to_string(&impedance).map_err(js_error)
}

#[derive(Serialize)]
struct BoreOptimization {
    instrument: Instrument,
    initial_error: f64,
    final_error: f64,
    evaluations: usize,
    played_frequencies: Vec<Option<f64>>,
}

/// Optimize bore point positions below the first `unchanged_bore_points`.
///
/// # Returns
/// JSON object with the optimized instrument, errors, and played frequencies.
#[wasm_bindgen]
pub fn optimize_bore_positions(
    instrument_json: &str,
    tuning_json: &str,
    config_json: &str,
    unchanged_bore_points: usize,
    lower_bounds_json: &str,
    upper_bounds_json: &str,
) -> Result<String, JsValue> {
    let config = parse_config(config_json)?;
    let mut calc = calculator(instrument_json, &config)?;
    let tuning = Tuning::from_json(tuning_json).map_err(js_error)?;
    let lower: Vec<f64> = serde_json::from_str(lower_bounds_json).map_err(js_error)?;
    let upper: Vec<f64> = serde_json::from_str(upper_bounds_json).map_err(js_error)?;

    let mut objective =
        BorePositionObjectiveFunction::new(calc.instrument(), unchanged_bore_points, false).map_err(js_error)?;
    objective.base_mut().error_norm = config.error_norm;
    objective.set_lower_bounds(calc.instrument(), lower).map_err(js_error)?;
    objective.set_upper_bounds(calc.instrument(), upper).map_err(js_error)?;

    let band = config.search_band().map_err(js_error)?;
    let evaluator = CentDeviationEvaluator::new(band).with_penalty(config.no_resonance_penalty_cents);
    let options = OptimizationOptions::from_config(&config).map_err(js_error)?;
    let result = optimize(&mut calc, &tuning, &evaluator, &objective, &options).map_err(js_error)?;

    let report = BoreOptimization {
        instrument: calc.into_instrument(),
        initial_error: result.initial_error,
        final_error: result.final_error,
        evaluations: result.evaluations,
        played_frequencies: result.played_frequencies,
    };
    serde_json::to_string(&report).map_err(js_error)
}
