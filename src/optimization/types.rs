//! Type definitions for geometry optimization.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Minimizer backend used for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OptimizerType {
    /// Bounded pattern search (default for multivariate problems).
    #[default]
    DerivativeFree,
    /// Elitist genetic algorithm.
    Evolutionary,
    /// Latin-hypercube starts, each refined by Nelder-Mead.
    MultiStart,
    /// Bounded Nelder-Mead simplex.
    Simplex,
    /// Conjugate directions with bounded line searches.
    Powell,
    /// Univariate bracketing search.
    Brent,
}

impl OptimizerType {
    /// Default backend for a problem of the given dimension.
    pub fn for_dimensions(nr_dimensions: usize) -> Self {
        if nr_dimensions > 1 {
            OptimizerType::DerivativeFree
        } else {
            OptimizerType::Brent
        }
    }

    pub fn is_univariate(&self) -> bool {
        matches!(self, OptimizerType::Brent)
    }
}

impl fmt::Display for OptimizerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OptimizerType::DerivativeFree => "pattern search",
            OptimizerType::Evolutionary => "evolutionary",
            OptimizerType::MultiStart => "multi-start simplex",
            OptimizerType::Simplex => "simplex",
            OptimizerType::Powell => "Powell",
            OptimizerType::Brent => "Brent",
        };
        f.write_str(name)
    }
}

/// Why a minimizer returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Converged,
    BudgetExhausted,
    Cancelled,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StopReason::Converged => "converged",
            StopReason::BudgetExhausted => "evaluation budget exhausted",
            StopReason::Cancelled => "cancelled",
        };
        f.write_str(text)
    }
}

/// How an error vector collapses to one score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ErrorNorm {
    #[default]
    SumOfSquares,
    SumOfAbsolute,
}

impl ErrorNorm {
    pub fn apply(&self, errors: &[f64]) -> f64 {
        match self {
            ErrorNorm::SumOfSquares => errors.iter().map(|e| e * e).sum(),
            ErrorNorm::SumOfAbsolute => errors.iter().map(|e| e.abs()).sum(),
        }
    }
}

/// Box bounds for a geometry vector.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableBounds {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

impl VariableBounds {
    /// Validate lengths and ordering.
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> Result<Self> {
        if lower.len() != upper.len() {
            return Err(Error::DimensionMismatch {
                expected: lower.len(),
                actual: upper.len(),
            });
        }
        for (dimension, (&lo, &hi)) in lower.iter().zip(upper.iter()).enumerate() {
            if !(lo <= hi) {
                return Err(Error::InvertedBounds {
                    dimension,
                    lower: lo,
                    upper: hi,
                });
            }
        }
        Ok(Self { lower, upper })
    }

    pub fn len(&self) -> usize {
        self.lower.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lower.is_empty()
    }

    pub fn range(&self, dimension: usize) -> f64 {
        self.upper[dimension] - self.lower[dimension]
    }

    /// Pairs of (lower, upper) per dimension.
    pub fn pairs(&self) -> Vec<(f64, f64)> {
        self.lower.iter().copied().zip(self.upper.iter().copied()).collect()
    }

    pub fn clamp(&self, point: &[f64]) -> Vec<f64> {
        point
            .iter()
            .zip(self.lower.iter().zip(self.upper.iter()))
            .map(|(&x, (&lo, &hi))| x.clamp(lo, hi))
            .collect()
    }
}

/// Individual in the evolutionary population.
#[derive(Debug, Clone)]
pub struct Individual {
    /// Genes: one geometry value per dimension.
    pub genes: Vec<f64>,
    /// Fitness value (lower is better)
    pub fitness: f64,
}

impl Individual {
    pub fn new(genes: Vec<f64>) -> Self {
        Self {
            genes,
            fitness: f64::INFINITY,
        }
    }

    pub fn with_fitness(genes: Vec<f64>, fitness: f64) -> Self {
        Self { genes, fitness }
    }
}

/// Parent selection for the evolutionary backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMethod {
    /// Roulette wheel selection (inverse-error proportional)
    #[default]
    Roulette,
    Tournament,
}

/// Mutation operator for the evolutionary backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MutationMethod {
    /// Uniform random step scaled to the bound range
    #[default]
    Uniform,
    /// Gaussian step scaled to the bound range
    Gaussian,
}

/// Evolutionary algorithm parameters.
#[derive(Debug, Clone)]
pub struct EAParameters {
    /// Population size (Npop)
    pub population_size: usize,
    /// Elitism percentage (Pe, 0-100)
    pub elitism_percent: f64,
    /// Crossover percentage (Pc, 0-100); the remainder is filled by mutation
    pub crossover_percent: f64,
    /// Mutation strength as a fraction of each bound range (0.05-0.2)
    pub mutation_strength: f64,
    /// Maximum number of generations
    pub max_generations: usize,
    /// Stop once the best error drops to this value
    pub target_error: f64,
    pub selection_method: SelectionMethod,
    pub tournament_size: usize,
    pub mutation_method: MutationMethod,
    /// Fixed RNG seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for EAParameters {
    fn default() -> Self {
        Self {
            population_size: 40,
            elitism_percent: 10.0,
            crossover_percent: 30.0,
            mutation_strength: 0.1,
            max_generations: 200,
            target_error: 0.0,
            selection_method: SelectionMethod::Roulette,
            tournament_size: 3,
            mutation_method: MutationMethod::Uniform,
            seed: None,
        }
    }
}

impl EAParameters {
    /// Default parameters scaled to the number of dimensions.
    pub fn for_dimensions(nr_dimensions: usize) -> Self {
        Self {
            population_size: 20.max(nr_dimensions * 10),
            ..Default::default()
        }
    }
}

/// Population statistics.
#[derive(Debug, Clone)]
pub struct PopulationStats {
    pub best_fitness: f64,
    pub worst_fitness: f64,
    pub average_fitness: f64,
    pub standard_deviation: f64,
}

/// Progress update during optimization.
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    pub evaluations: usize,
    pub best_error: f64,
    pub best_point: Vec<f64>,
}

/// Outcome of an optimization run.
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    pub optimizer: OptimizerType,
    pub objective_name: String,
    pub initial_point: Vec<f64>,
    pub point: Vec<f64>,
    pub initial_error: f64,
    pub final_error: f64,
    pub evaluations: usize,
    pub stop_reason: StopReason,
    /// Played frequencies after optimization, `None` where no resonance was found.
    pub played_frequencies: Vec<Option<f64>>,
    pub target_frequencies: Vec<f64>,
}

impl OptimizationResult {
    pub fn improved(&self) -> bool {
        self.final_error < self.initial_error
    }
}

impl fmt::Display for OptimizationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Optimization Result ({}):", self.objective_name)?;
        writeln!(f, "  Optimizer: {}", self.optimizer)?;
        writeln!(f, "  Evaluations: {} ({})", self.evaluations, self.stop_reason)?;
        writeln!(f, "  Initial error: {:.4}", self.initial_error)?;
        writeln!(f, "  Final error: {:.4}", self.final_error)?;
        writeln!(f, "  Geometry:")?;
        for (i, (start, end)) in self.initial_point.iter().zip(self.point.iter()).enumerate() {
            writeln!(f, "    x{}: {:.5} -> {:.5}", i + 1, start, end)?;
        }
        if !self.target_frequencies.is_empty() {
            writeln!(f, "  Frequencies (Hz):")?;
        }
        for (i, (played, target)) in self
            .played_frequencies
            .iter()
            .zip(self.target_frequencies.iter())
            .enumerate()
        {
            match played {
                Some(played) => writeln!(
                    f,
                    "    f{}: {:.1} Hz (target: {:.1} Hz, error: {:.1} cents)",
                    i + 1,
                    played,
                    target,
                    crate::types::cents(*target, *played)
                )?,
                None => writeln!(f, "    f{}: no resonance (target: {:.1} Hz)", i + 1, target)?,
            }
        }
        Ok(())
    }
}
