//! Time spectrum sweeps for instruments with a growing number of tone holes.
//!
//! Run with:
//!   cargo run --release --example solver_benchmark
//!   cargo run --release --example solver_benchmark --no-default-features

use std::time::Instant;

use woodwind_bore::{
    BorePoint, Fingering, Hole, Instrument, InstrumentCalculator, Mouthpiece, MouthpieceKind, Note,
    PhysicalParameters, SearchBand, Termination,
};

const LENGTH_M: f64 = 0.6;
const SWEEPS: usize = 20;

struct BenchResult {
    holes: usize,
    components: usize,
    time_ms: f64,
    played: Option<f64>,
}

fn instrument(num_holes: usize) -> woodwind_bore::Result<Instrument> {
    let holes = (0..num_holes)
        .map(|i| Hole::new(0.25 + 0.3 * (i as f64 + 0.5) / num_holes as f64, 0.007, 0.004))
        .collect();
    Instrument::new(
        "bench",
        Mouthpiece::new(0.0, MouthpieceKind::Reed { length_correction: 0.01 }),
        vec![
            BorePoint::new(0.0, 0.015),
            BorePoint::new(0.2, 0.016),
            BorePoint::new(0.45, 0.022),
            BorePoint::new(LENGTH_M, 0.03),
        ],
        holes,
        Termination::open(0.035),
    )
}

fn benchmark(num_holes: usize, band: &SearchBand) -> woodwind_bore::Result<BenchResult> {
    let inst = instrument(num_holes)?;
    let components = inst.components().len();
    let mut calc = InstrumentCalculator::new(inst, PhysicalParameters::default());
    let fingering = Fingering::new(Note::new("low", 140.0), vec![false; num_holes]);

    let start = Instant::now();
    let mut played = None;
    for _ in 0..SWEEPS {
        played = calc.played_frequency(&fingering, band);
    }
    let elapsed = start.elapsed();

    Ok(BenchResult {
        holes: num_holes,
        components,
        time_ms: elapsed.as_secs_f64() * 1000.0 / SWEEPS as f64,
        played,
    })
}

fn main() {
    let band = SearchBand::default();
    println!(
        "Spectrum sweep: {} frequencies, {} sweeps per instrument{}",
        band.number_of_frequencies(),
        SWEEPS,
        if cfg!(feature = "parallel") { " (parallel)" } else { "" }
    );
    println!("{:>6} {:>11} {:>10} {:>12}", "holes", "components", "ms/sweep", "played Hz");

    for num_holes in [0, 2, 6, 10, 16] {
        match benchmark(num_holes, &band) {
            Ok(r) => println!(
                "{:>6} {:>11} {:>10.3} {:>12}",
                r.holes,
                r.components,
                r.time_ms,
                r.played.map_or_else(|| "-".to_string(), |f| format!("{:.2}", f))
            ),
            Err(e) => eprintln!("{} holes: {}", num_holes, e),
        }
    }
}
