//! WASM Browser Tests
//!
//! These tests run in a real browser environment using wasm-pack test.
//! Build without default features so spectrum sampling stays single-threaded.
//!
//! Run with:
//!   wasm-pack test --headless --chrome -- --no-default-features
//!   wasm-pack test --node -- --no-default-features

#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

use woodwind_bore::wasm::{compute_impedance, compute_played_frequencies};

const INSTRUMENT_JSON: &str = r#"{
    "name": "pipe",
    "mouthpiece": {"position": 0.0, "kind": {"type": "reed", "length_correction": 0.0}},
    "bore_points": [
        {"position": 0.0, "diameter": 0.02},
        {"position": 0.3, "diameter": 0.02}
    ],
    "holes": [{"position": 0.2, "diameter": 0.006, "height": 0.003}],
    "termination": {"flange_diameter": 0.0, "closed": false}
}"#;

const TUNING_JSON: &str = r#"{
    "name": "two notes",
    "fingerings": [
        {"note": {"name": "low", "frequency": 280.0}, "open_holes": [false]},
        {"note": {"name": "high", "frequency": 330.0}, "open_holes": [true]}
    ]
}"#;

/// Played frequencies with a small search band for browser memory constraints.
#[wasm_bindgen_test]
fn test_played_frequencies_json() {
    let config = r#"{"number_of_frequencies": 300}"#;
    let json = compute_played_frequencies(INSTRUMENT_JSON, TUNING_JSON, config).expect("valid input");
    let played: Vec<Option<f64>> = serde_json::from_str(&json).unwrap();

    assert_eq!(played.len(), 2);
    let low = played[0].expect("closed fingering resonates");
    let high = played[1].expect("open fingering resonates");
    assert!(low > 250.0 && low < 310.0);
    assert!(high > low);
}

/// Malformed input comes back as a JS error, not a panic.
#[wasm_bindgen_test]
fn test_invalid_json_is_an_error() {
    assert!(compute_played_frequencies("{", TUNING_JSON, "").is_err());
    assert!(compute_impedance(INSTRUMENT_JSON, "[100.0", "").is_err());
}

#[wasm_bindgen_test]
fn test_impedance_pairs() {
    let json = compute_impedance(INSTRUMENT_JSON, "[100.0, 280.0, 500.0]", "").unwrap();
    let impedance: Vec<[f64; 2]> = serde_json::from_str(&json).unwrap();
    assert_eq!(impedance.len(), 3);
    assert!(impedance.iter().all(|[re, im]| re.is_finite() && im.is_finite()));
}
