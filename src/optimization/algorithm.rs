//! Evolutionary minimizer.
//!
//! Each generation keeps an elite, fills a share of the next generation by
//! heuristic crossover of selected parents, and the rest by mutating members
//! drawn from the better half of the sorted population.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::crossover::heuristic_crossover;
use super::minimizer::{BoundedProblem, Minimizer};
use super::mutation::perform_mutation;
use super::population::{calculate_population_stats, get_best_individual, initialize_population};
use super::selection::{select_elite, select_mating_pairs};
use super::types::{EAParameters, Individual, StopReason};

#[derive(Debug, Clone, Default)]
pub struct EvolutionaryMinimizer {
    /// `None` picks parameters scaled to the problem dimension.
    pub params: Option<EAParameters>,
}

impl EvolutionaryMinimizer {
    pub fn new(params: EAParameters) -> Self {
        Self {
            params: Some(params),
        }
    }
}

/// Evaluate every individual, stopping early if the problem refuses.
fn evaluate_population(
    problem: &mut BoundedProblem<'_>,
    population: Vec<Individual>,
) -> Result<Vec<Individual>, StopReason> {
    population
        .into_iter()
        .map(|ind| match problem.evaluate(&ind.genes) {
            Some(fitness) => Ok(Individual::with_fitness(ind.genes, fitness)),
            None => Err(problem.stop_reason()),
        })
        .collect()
}

impl Minimizer for EvolutionaryMinimizer {
    fn minimize(&mut self, problem: &mut BoundedProblem<'_>, start: &[f64]) -> StopReason {
        let params = self
            .params
            .clone()
            .unwrap_or_else(|| EAParameters::for_dimensions(problem.dimensions()));
        let bounds = problem.bounds().clone();
        let mut rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let population_size = params.population_size.max(2);

        let population = initialize_population(population_size, &bounds, Some(start), &mut rng);
        let mut population = match evaluate_population(problem, population) {
            Ok(evaluated) => evaluated,
            Err(reason) => return reason,
        };

        let num_elite = (population_size as f64 * params.elitism_percent / 100.0).max(1.0) as usize;
        let num_crossover = (population_size as f64 * params.crossover_percent / 100.0) as usize;
        let num_crossover_pairs = (num_crossover + 1) / 2;

        for generation in 0..params.max_generations {
            if problem.best_value() <= params.target_error {
                break;
            }

            let mut next_generation: Vec<Individual> = Vec::with_capacity(population_size);

            // 1. Elitism: Keep best individuals unchanged
            next_generation.extend(select_elite(&population, num_elite));

            // 2. Crossover: Select parents and create children
            let mut new_offspring: Vec<Individual> = Vec::new();
            if num_crossover > 0 {
                let mating_pairs = select_mating_pairs(
                    &population,
                    num_crossover_pairs,
                    params.selection_method,
                    params.tournament_size,
                    &mut rng,
                );
                for (parent1, parent2) in mating_pairs {
                    let (child1, child2) = heuristic_crossover(&parent1, &parent2, &bounds, &mut rng);
                    new_offspring.push(child1);
                    if next_generation.len() + new_offspring.len() < population_size {
                        new_offspring.push(child2);
                    }
                }
            }

            // 3. Mutation: favour parents from the better part of the population
            let mut sorted_pop = population.clone();
            sorted_pop.sort_by(|a, b| a.fitness.total_cmp(&b.fitness));

            while next_generation.len() + new_offspring.len() < population_size {
                let filled = next_generation.len() + new_offspring.len();
                let idx = ((sorted_pop.len() as f64
                    * (num_elite + num_crossover) as f64
                    / population_size as f64
                    * 0.5)
                    * (1.0 + 0.5 * (1.0 - filled as f64 / population_size as f64))
                    * rng.r#gen::<f64>())
                .min(sorted_pop.len() as f64 - 1.0) as usize;

                new_offspring.push(perform_mutation(
                    &sorted_pop[idx],
                    params.mutation_method,
                    params.mutation_strength,
                    &bounds,
                    &mut rng,
                ));
            }

            match evaluate_population(problem, new_offspring) {
                Ok(evaluated) => next_generation.extend(evaluated),
                Err(reason) => return reason,
            }
            population = next_generation;

            if generation % 25 == 0 {
                let stats = calculate_population_stats(&population);
                debug!(
                    generation,
                    best = stats.best_fitness,
                    average = stats.average_fitness,
                    spread = stats.standard_deviation,
                    "evolutionary generation"
                );
            }
        }

        if let Some(best) = get_best_individual(&population) {
            debug!(fitness = best.fitness, "evolutionary search finished");
        }
        StopReason::Converged
    }
}
