//! Tune the hole sizes and then the bore length of a six-hole whistle.
//!
//! Run with:
//!   RUST_LOG=woodwind_bore=debug cargo run --release --example optimize_whistle

use std::time::Instant;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use woodwind_bore::optimization::{
    optimize, BorePositionObjectiveFunction, HoleSizeObjectiveFunction, ObjectiveFunction,
    OptimizationOptions,
};
use woodwind_bore::{
    BorePoint, CentDeviationEvaluator, Fingering, Hole, Instrument, InstrumentCalculator,
    Mouthpiece, MouthpieceKind, Note, StudyConfig, Termination, Tuning,
};

const BORE_DIAMETER_M: f64 = 0.0127;
const HOLE_POSITIONS_M: [f64; 6] = [0.125, 0.145, 0.165, 0.195, 0.215, 0.235];

fn whistle() -> woodwind_bore::Result<Instrument> {
    let holes = HOLE_POSITIONS_M
        .iter()
        .enumerate()
        .map(|(i, &position)| Hole::new(position, 0.006, 0.0025).with_name(format!("hole {}", i + 1)))
        .collect();
    Instrument::new(
        "D whistle",
        Mouthpiece::new(
            0.0,
            MouthpieceKind::Fipple {
                window_length: 0.006,
                window_width: 0.01,
                window_height: 0.003,
                fipple_factor: 1.0,
            },
        ),
        vec![
            BorePoint::named("head", 0.0, BORE_DIAMETER_M),
            BorePoint::named("body", 0.1, BORE_DIAMETER_M),
            BorePoint::named("foot", 0.28, BORE_DIAMETER_M),
        ],
        holes,
        Termination::open(0.0),
    )
}

fn d_major() -> Tuning {
    // Holes listed top to bottom, true = open.
    let notes = [
        ("D5", 587.33, [false, false, false, false, false, false]),
        ("E5", 659.26, [false, false, false, false, false, true]),
        ("F#5", 739.99, [false, false, false, false, true, true]),
        ("G5", 783.99, [false, false, false, true, true, true]),
        ("A5", 880.00, [false, false, true, true, true, true]),
        ("B5", 987.77, [false, true, true, true, true, true]),
        ("C#6", 1108.73, [true, true, true, true, true, true]),
    ];
    Tuning::new(
        "D major",
        notes
            .iter()
            .map(|(name, frequency, holes)| Fingering::new(Note::new(*name, *frequency), holes.to_vec()))
            .collect(),
    )
}

fn print_tuning(label: &str, calc: &mut InstrumentCalculator, tuning: &Tuning, config: &StudyConfig) {
    let band = match config.search_band() {
        Ok(band) => band,
        Err(e) => {
            eprintln!("{}", e);
            return;
        }
    };
    println!("{}:", label);
    let played = woodwind_bore::played_frequencies(calc, tuning, &band);
    for (fingering, played) in tuning.fingerings.iter().zip(played) {
        match played {
            Some(f) => println!(
                "  {:>4}: {:8.2} Hz (target {:8.2} Hz, {:+6.1} cents)",
                fingering.note.name,
                f,
                fingering.target_frequency(),
                woodwind_bore::types::cents(fingering.target_frequency(), f)
            ),
            None => println!("  {:>4}: no resonance", fingering.note.name),
        }
    }
}

fn run() -> woodwind_bore::Result<()> {
    let config = StudyConfig::default()
        .with_temperature(25.0)
        .with_search_band(1.3, 600)
        .with_max_evaluations(2000);
    let tuning = d_major();
    let instrument = whistle()?;
    let mut calc = InstrumentCalculator::new(instrument, config.physical_parameters()?);
    let evaluator = CentDeviationEvaluator::new(config.search_band()?)
        .with_penalty(config.no_resonance_penalty_cents);
    let options = OptimizationOptions::from_config(&config)?;

    print_tuning("Initial tuning", &mut calc, &tuning, &config);

    // Stage 1: hole diameters
    let start = Instant::now();
    let mut holes = HoleSizeObjectiveFunction::new(calc.instrument())?;
    holes.base_mut().error_norm = config.error_norm;
    holes.set_lower_bounds(calc.instrument(), vec![0.002; HOLE_POSITIONS_M.len()])?;
    holes.set_upper_bounds(calc.instrument(), vec![0.011; HOLE_POSITIONS_M.len()])?;
    let result = optimize(&mut calc, &tuning, &evaluator, &holes, &options)?;
    println!("\n{}", result);
    println!("Hole stage took {:.2} s", start.elapsed().as_secs_f64());

    // Stage 2: foot length and body joint position, head fixed
    let start = Instant::now();
    let mut bore = BorePositionObjectiveFunction::new(calc.instrument(), 1, false)?;
    bore.base_mut().error_norm = config.error_norm;
    bore.set_lower_bounds(calc.instrument(), vec![0.0, 0.05])?;
    bore.set_upper_bounds(calc.instrument(), vec![0.34, 0.95])?;
    for constraint in bore.constraints().iter() {
        println!(
            "  {}: {:?} .. {:?}",
            constraint.name, constraint.lower_bound, constraint.upper_bound
        );
    }
    let result = optimize(&mut calc, &tuning, &evaluator, &bore, &options)?;
    println!("\n{}", result);
    println!("Bore stage took {:.2} s", start.elapsed().as_secs_f64());

    print_tuning("\nFinal tuning", &mut calc, &tuning, &config);
    println!("\n{}", calc.instrument().to_json()?);
    Ok(())
}

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(EnvFilter::from_default_env())
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
