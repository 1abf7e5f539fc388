use woodwind_bore::{
    BorePoint, Fingering, Hole, Instrument, InstrumentCalculator, Mouthpiece, MouthpieceKind, Note,
    PhysicalParameters, SearchBand, Termination,
};

const BORE_LENGTH_M: f64 = 0.3;
const BORE_DIAMETER_M: f64 = 0.02;
const TOLERANCE: f64 = 0.02;

fn standard_air() -> PhysicalParameters {
    PhysicalParameters::new(20.0, 101.325, 45.0, 390.0).unwrap()
}

/// Reed-driven cylinder with two tone holes: three bore sections in the chain.
fn two_hole_pipe() -> InstrumentCalculator {
    let instrument = Instrument::new(
        "two-hole pipe",
        Mouthpiece::new(0.0, MouthpieceKind::Reed { length_correction: 0.0 }),
        vec![
            BorePoint::new(0.0, BORE_DIAMETER_M),
            BorePoint::new(BORE_LENGTH_M, BORE_DIAMETER_M),
        ],
        vec![Hole::new(0.15, 0.006, 0.003), Hole::new(0.22, 0.006, 0.003)],
        Termination::open(0.0),
    )
    .unwrap();
    InstrumentCalculator::new(instrument, standard_air())
}

fn quarter_wave_frequency(params: &PhysicalParameters) -> f64 {
    let radius = 0.5 * BORE_DIAMETER_M;
    let effective_length = BORE_LENGTH_M + 0.6133 * radius;
    params.speed_of_sound() / (4.0 * effective_length)
}

#[test]
fn all_closed_fingering_plays_quarter_wave_resonance() {
    let mut calc = two_hole_pipe();
    let bore_sections = calc
        .instrument()
        .components()
        .iter()
        .filter(|c| matches!(c, woodwind_bore::Component::BoreSection(_)))
        .count();
    assert_eq!(bore_sections, 3);

    let expected = quarter_wave_frequency(calc.params());
    let fingering = Fingering::new(Note::new("fundamental", expected), vec![false, false]);
    let played = calc
        .played_frequency(&fingering, &SearchBand::default())
        .expect("closed pipe should resonate near its quarter-wave frequency");

    let relative = (played - expected).abs() / expected;
    assert!(
        relative < TOLERANCE,
        "played {played:.2} Hz, expected {expected:.2} Hz ({:.2}%)",
        relative * 100.0
    );
}

#[test]
fn opening_a_hole_raises_pitch() {
    let mut calc = two_hole_pipe();
    let target = quarter_wave_frequency(calc.params());
    let band = SearchBand::default();

    let closed = Fingering::new(Note::new("closed", target), vec![false, false]);
    let open = Fingering::new(Note::new("open", target), vec![false, true]);
    let closed_freq = calc.played_frequency(&closed, &band).unwrap();
    let open_freq = calc.played_frequency(&open, &band).unwrap();
    assert!(open_freq > closed_freq * 1.02, "{open_freq} vs {closed_freq}");
}

#[test]
fn impedance_and_reflectance_agree() {
    let calc = two_hole_pipe();
    let params = *calc.params();
    let z0 = params.calc_z0(0.5 * BORE_DIAMETER_M);
    for frequency in [150.0, 280.0, 433.0, 900.0] {
        let z = calc.calc_z(frequency);
        let gamma = calc.calc_reflection_coefficient(frequency);
        // Reed mouthpieces reflect with a positive multiplier.
        let expected = (z - z0) / (z + z0);
        assert!(
            (gamma - expected).norm() < 1e-9,
            "{frequency} Hz: {gamma} vs {expected}"
        );
        assert!(gamma.norm() <= 1.0 + 1e-9);
    }
}

#[test]
fn warmer_air_plays_sharper() {
    let mut calc = two_hole_pipe();
    let fingering = Fingering::new(Note::new("fundamental", 280.0), vec![false, false]);
    let band = SearchBand::default();
    let cool = calc.played_frequency(&fingering, &band).unwrap();
    calc.set_params(PhysicalParameters::new(30.0, 101.325, 45.0, 390.0).unwrap());
    let warm = calc.played_frequency(&fingering, &band).unwrap();
    assert!(warm > cool);
}

const WINDOW_LENGTH_M: f64 = 0.006;
const WINDOW_WIDTH_M: f64 = 0.01;
const WINDOW_HEIGHT_M: f64 = 0.003;
const WHISTLE_DIAMETER_M: f64 = 0.016;

/// Plain fipple pipe, open at the far end, with the window `window_position` down the bore.
fn fipple_pipe(window_position: f64, length: f64) -> InstrumentCalculator {
    let instrument = Instrument::new(
        "fipple pipe",
        Mouthpiece::new(
            window_position,
            MouthpieceKind::Fipple {
                window_length: WINDOW_LENGTH_M,
                window_width: WINDOW_WIDTH_M,
                window_height: WINDOW_HEIGHT_M,
                fipple_factor: 1.0,
            },
        ),
        vec![
            BorePoint::new(0.0, WHISTLE_DIAMETER_M),
            BorePoint::new(length, WHISTLE_DIAMETER_M),
        ],
        vec![],
        Termination::open(0.0),
    )
    .unwrap();
    InstrumentCalculator::new(instrument, standard_air())
}

/// Half-wave resonance of an open pipe whose top is loaded by the window inertance.
///
/// The window acts as an extra length `Δ = Le · A_bore / A_window`, with
/// `Le` the window height plus a 1.7-radius orifice correction. The sounding
/// condition `tan(kL') = −kΔ` is solved exactly on `(π/2L', π/L')`, where `L'`
/// is the bore plus its unflanged open-end correction.
fn windowed_half_wave_frequency(params: &PhysicalParameters, length: f64) -> f64 {
    let bore_radius = 0.5 * WHISTLE_DIAMETER_M;
    let window_area = WINDOW_LENGTH_M * WINDOW_WIDTH_M;
    let window_length = WINDOW_HEIGHT_M + 1.7 * (window_area / std::f64::consts::PI).sqrt();
    let delta = window_length * std::f64::consts::PI * bore_radius * bore_radius / window_area;
    let effective_length = length + 0.6133 * bore_radius;

    let condition = |k: f64| (k * effective_length).tan() + k * delta;
    let (mut lo, mut hi) = (
        0.5 * std::f64::consts::PI / effective_length * (1.0 + 1e-9),
        std::f64::consts::PI / effective_length,
    );
    for _ in 0..200 {
        let mid = 0.5 * (lo + hi);
        if condition(mid) < 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi) * params.speed_of_sound() / (2.0 * std::f64::consts::PI)
}

/// The flute-type path sounds at the half-wave resonance, lowered by the window.
/// Boundary-layer losses pull the model about 1% flat of the lossless estimate,
/// so the reed tolerance of 2% applies here too.
#[test]
fn fipple_pipe_plays_windowed_half_wave_resonance() {
    let mut calc = fipple_pipe(0.0, BORE_LENGTH_M);
    let expected = windowed_half_wave_frequency(calc.params(), BORE_LENGTH_M);
    let naive = calc.params().speed_of_sound() / (2.0 * BORE_LENGTH_M);
    assert!(expected < 0.92 * naive, "window correction should be substantial");

    let fingering = Fingering::new(Note::new("fundamental", expected), vec![]);
    let played = calc
        .played_frequency(&fingering, &SearchBand::default())
        .expect("open pipe should resonate near its half-wave frequency");

    let relative = (played - expected).abs() / expected;
    assert!(
        relative < TOLERANCE,
        "played {played:.2} Hz, expected {expected:.2} Hz ({:.2}%)",
        relative * 100.0
    );
}

#[test]
fn recessed_window_plays_higher_than_top_window() {
    let band = SearchBand::default();
    let play = |mut calc: InstrumentCalculator, length: f64| {
        let target = windowed_half_wave_frequency(calc.params(), length);
        let fingering = Fingering::new(Note::new("fundamental", target), vec![]);
        calc.played_frequency(&fingering, &band).unwrap()
    };

    let at_top = play(fipple_pipe(0.0, BORE_LENGTH_M), BORE_LENGTH_M);
    let recessed = play(fipple_pipe(0.05, BORE_LENGTH_M), BORE_LENGTH_M - 0.05);
    let short_pipe = play(fipple_pipe(0.0, BORE_LENGTH_M - 0.05), BORE_LENGTH_M - 0.05);

    // Moving the window shortens the resonator; the closed headspace above it
    // adds compliance and pulls the pitch back down a little.
    assert!(recessed > at_top * 1.05, "{recessed} vs {at_top}");
    assert!(recessed < short_pipe, "{recessed} vs {short_pipe}");
}
