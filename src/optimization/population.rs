//! Population management for the evolutionary backend.

use rand::Rng;

use super::types::{Individual, PopulationStats, VariableBounds};

/// Create a random individual within bounds.
pub fn create_random_individual<R: Rng>(bounds: &VariableBounds, rng: &mut R) -> Individual {
    let genes = bounds
        .lower
        .iter()
        .zip(bounds.upper.iter())
        .map(|(&lo, &hi)| lo + rng.r#gen::<f64>() * (hi - lo))
        .collect();
    Individual::new(genes)
}

/// Initialize a population of random individuals.
///
/// When `seed_genes` is given, the population starts with the seed and a few
/// jittered copies of it so the current geometry is never lost.
pub fn initialize_population<R: Rng>(
    population_size: usize,
    bounds: &VariableBounds,
    seed_genes: Option<&[f64]>,
    rng: &mut R,
) -> Vec<Individual> {
    let mut population = Vec::with_capacity(population_size);

    if let Some(seed) = seed_genes {
        if !seed.is_empty() && population_size > 0 {
            population.push(Individual::new(clamp_to_bounds(seed, bounds)));

            let num_variants = (population_size as f64 * 0.2).min(10.0) as usize;
            for _ in 0..num_variants {
                if population.len() >= population_size {
                    break;
                }
                let variant_genes: Vec<f64> = seed
                    .iter()
                    .enumerate()
                    .map(|(i, &g)| g + (rng.r#gen::<f64>() - 0.5) * 0.1 * bounds.range(i))
                    .collect();
                population.push(Individual::new(clamp_to_bounds(&variant_genes, bounds)));
            }
        }
    }

    // Fill remaining slots with random individuals
    while population.len() < population_size {
        population.push(create_random_individual(bounds, rng));
    }

    population
}

/// Get the best individual from a population (lowest fitness).
pub fn get_best_individual(population: &[Individual]) -> Option<&Individual> {
    population.iter().min_by(|a, b| a.fitness.total_cmp(&b.fitness))
}

/// Calculate population statistics.
pub fn calculate_population_stats(population: &[Individual]) -> PopulationStats {
    let fitnesses: Vec<f64> = population
        .iter()
        .filter(|ind| ind.fitness.is_finite())
        .map(|ind| ind.fitness)
        .collect();

    if fitnesses.is_empty() {
        return PopulationStats {
            best_fitness: f64::INFINITY,
            worst_fitness: f64::INFINITY,
            average_fitness: f64::INFINITY,
            standard_deviation: 0.0,
        };
    }

    let count = fitnesses.len() as f64;
    let average = fitnesses.iter().sum::<f64>() / count;
    let variance = fitnesses.iter().map(|f| (f - average).powi(2)).sum::<f64>() / count;

    PopulationStats {
        best_fitness: fitnesses.iter().copied().fold(f64::INFINITY, f64::min),
        worst_fitness: fitnesses.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        average_fitness: average,
        standard_deviation: variance.sqrt(),
    }
}

/// Clamp genes to bounds.
pub fn clamp_to_bounds(genes: &[f64], bounds: &VariableBounds) -> Vec<f64> {
    bounds.clamp(genes)
}
