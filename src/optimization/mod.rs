//! Geometry optimization for woodwind bores.
//!
//! An objective function picks which geometry values may change and maps
//! them to a flat vector; an evaluator scores the instrument against a
//! tuning; a minimizer backend searches the bounded vector space.
//!
//! # Example
//!
//! ```
//! use woodwind_bore::optimization::{
//!     optimize, BorePositionObjectiveFunction, ObjectiveFunction, OptimizationOptions,
//! };
//! use woodwind_bore::{
//!     BorePoint, CentDeviationEvaluator, Fingering, Instrument, InstrumentCalculator, Mouthpiece,
//!     MouthpieceKind, Note, PhysicalParameters, SearchBand, Termination, Tuning,
//! };
//!
//! // A plain reed pipe that plays a little flat of D4
//! let instrument = Instrument::new(
//!     "pipe",
//!     Mouthpiece::new(0.0, MouthpieceKind::Reed { length_correction: 0.0 }),
//!     vec![BorePoint::new(0.0, 0.02), BorePoint::new(0.3, 0.02)],
//!     vec![],
//!     Termination::open(0.0),
//! )
//! .unwrap();
//! let tuning = Tuning::new("D", vec![Fingering::new(Note::new("D4", 293.66), vec![])]);
//!
//! // Let the bottom bore point move between 0.2 m and 0.4 m
//! let mut objective = BorePositionObjectiveFunction::new(&instrument, 1, false).unwrap();
//! objective.set_lower_bounds(&instrument, vec![0.2]).unwrap();
//! objective.set_upper_bounds(&instrument, vec![0.4]).unwrap();
//!
//! let band = SearchBand::new(1.5, 400).unwrap();
//! let evaluator = CentDeviationEvaluator::new(band);
//! let options = OptimizationOptions::new().with_band(band);
//! let mut calculator = InstrumentCalculator::new(instrument, PhysicalParameters::default());
//!
//! let result = optimize(&mut calculator, &tuning, &evaluator, &objective, &options).unwrap();
//! println!("{}", result);
//! assert!(result.final_error <= result.initial_error);
//! ```

pub mod algorithm;
pub mod bore_position;
pub mod brent;
pub mod constraints;
pub mod crossover;
pub mod hole_size;
pub mod minimizer;
pub mod multistart;
pub mod mutation;
pub mod objective;
pub mod pattern;
pub mod population;
pub mod powell;
pub mod run;
pub mod sampling;
pub mod selection;
pub mod simplex;
pub mod types;

// Re-export commonly used items
pub use algorithm::EvolutionaryMinimizer;
pub use bore_position::BorePositionObjectiveFunction;
pub use brent::BrentMinimizer;
pub use constraints::{Constraint, ConstraintType, Constraints};
pub use hole_size::HoleSizeObjectiveFunction;
pub use minimizer::{minimizer_for, BoundedProblem, Minimizer};
pub use multistart::MultiStartMinimizer;
pub use objective::{ObjectiveBase, ObjectiveFunction};
pub use pattern::PatternSearchMinimizer;
pub use powell::PowellMinimizer;
pub use run::{optimize, run_optimization, OptimizationOptions};
pub use sampling::latin_hypercube_sample;
pub use simplex::SimplexMinimizer;
pub use types::{
    EAParameters, ErrorNorm, Individual, MutationMethod, OptimizationResult, OptimizerType,
    PopulationStats, ProgressUpdate, SelectionMethod, StopReason, VariableBounds,
};
