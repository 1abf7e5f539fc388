//! Selection operators for the evolutionary backend.

use rand::Rng;

use super::types::{Individual, SelectionMethod};

/// Roulette wheel selection, probability proportional to 1/error.
///
/// Lower fitness = higher probability of selection. A zero error is a perfect
/// match and is always picked.
pub fn roulette_selection<R: Rng>(
    population: &[Individual],
    num_selections: usize,
    rng: &mut R,
) -> Vec<Individual> {
    if population.is_empty() {
        return Vec::new();
    }

    if let Some(perfect) = population.iter().find(|ind| ind.fitness == 0.0) {
        return vec![perfect.clone(); num_selections];
    }

    let valid_population: Vec<&Individual> = population
        .iter()
        .filter(|ind| ind.fitness.is_finite() && ind.fitness > 0.0)
        .collect();

    if valid_population.is_empty() {
        // Fallback: uniform random selection from the whole population
        return (0..num_selections)
            .map(|_| population[rng.gen_range(0..population.len())].clone())
            .collect();
    }

    let inverse_fitnesses: Vec<f64> = valid_population.iter().map(|ind| 1.0 / ind.fitness).collect();
    let sum_inverse: f64 = inverse_fitnesses.iter().sum();

    let mut cumulative = Vec::with_capacity(inverse_fitnesses.len());
    let mut cum_sum = 0.0;
    for inverse in &inverse_fitnesses {
        cum_sum += inverse / sum_inverse;
        cumulative.push(cum_sum);
    }

    (0..num_selections)
        .map(|_| {
            let r: f64 = rng.r#gen();
            let index = cumulative
                .iter()
                .position(|&cum| r <= cum)
                .unwrap_or(valid_population.len() - 1);
            valid_population[index].clone()
        })
        .collect()
}

/// Tournament selection.
pub fn tournament_selection<R: Rng>(
    population: &[Individual],
    num_selections: usize,
    tournament_size: usize,
    rng: &mut R,
) -> Vec<Individual> {
    if population.is_empty() {
        return Vec::new();
    }
    let rounds = tournament_size.max(1);

    (0..num_selections)
        .map(|_| {
            let mut winner = &population[rng.gen_range(0..population.len())];
            for _ in 1..rounds {
                let challenger = &population[rng.gen_range(0..population.len())];
                if challenger.fitness < winner.fitness {
                    winner = challenger;
                }
            }
            winner.clone()
        })
        .collect()
}

/// Select parents using the specified method.
pub fn select_parents<R: Rng>(
    population: &[Individual],
    num_selections: usize,
    method: SelectionMethod,
    tournament_size: usize,
    rng: &mut R,
) -> Vec<Individual> {
    match method {
        SelectionMethod::Roulette => roulette_selection(population, num_selections, rng),
        SelectionMethod::Tournament => {
            tournament_selection(population, num_selections, tournament_size, rng)
        }
    }
}

/// Select mating pairs for crossover, preferring distinct parents.
pub fn select_mating_pairs<R: Rng>(
    population: &[Individual],
    num_pairs: usize,
    method: SelectionMethod,
    tournament_size: usize,
    rng: &mut R,
) -> Vec<(Individual, Individual)> {
    let mut pairs = Vec::with_capacity(num_pairs);
    if population.is_empty() {
        return pairs;
    }

    for _ in 0..num_pairs {
        let mut parents = select_parents(population, 2, method, tournament_size, rng).into_iter();
        let (Some(parent1), Some(mut parent2)) = (parents.next(), parents.next()) else {
            break;
        };

        let mut attempts = 0;
        while parent2.genes == parent1.genes && attempts < 10 {
            if let Some(candidate) = select_parents(population, 1, method, tournament_size, rng).pop() {
                parent2 = candidate;
            }
            attempts += 1;
        }

        // Still identical: fall back to a random member
        if parent2.genes == parent1.genes {
            parent2 = population[rng.gen_range(0..population.len())].clone();
        }

        pairs.push((parent1, parent2));
    }

    pairs
}

/// Elitism: select the best individuals to pass unchanged to next generation.
pub fn select_elite(population: &[Individual], num_elite: usize) -> Vec<Individual> {
    let mut sorted: Vec<&Individual> = population.iter().collect();
    sorted.sort_by(|a, b| a.fitness.total_cmp(&b.fitness));
    sorted.into_iter().take(num_elite).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn test_population() -> Vec<Individual> {
        vec![
            Individual::with_fitness(vec![0.1, 0.02], 1.0),
            Individual::with_fitness(vec![0.15, 0.018], 2.0),
            Individual::with_fitness(vec![0.2, 0.015], 3.0),
            Individual::with_fitness(vec![0.12, 0.019], 1.5),
            Individual::with_fitness(vec![0.18, 0.016], 2.5),
        ]
    }

    #[test]
    fn roulette_selection_returns_correct_count() {
        let mut rng = StdRng::seed_from_u64(1);
        let selected = roulette_selection(&test_population(), 3, &mut rng);
        assert_eq!(selected.len(), 3);
    }

    #[test]
    fn roulette_prefers_low_error() {
        let mut rng = StdRng::seed_from_u64(2);
        let pop = vec![
            Individual::with_fitness(vec![0.0], 0.01),
            Individual::with_fitness(vec![1.0], 100.0),
        ];
        let selected = roulette_selection(&pop, 200, &mut rng);
        let good = selected.iter().filter(|i| i.genes[0] == 0.0).count();
        assert!(good > 190);
    }

    #[test]
    fn tournament_selection_returns_correct_count() {
        let mut rng = StdRng::seed_from_u64(3);
        let selected = tournament_selection(&test_population(), 3, 2, &mut rng);
        assert_eq!(selected.len(), 3);
    }

    #[test]
    fn elite_selection_returns_best() {
        let elite = select_elite(&test_population(), 2);
        assert_eq!(elite.len(), 2);
        assert_eq!(elite[0].fitness, 1.0);
        assert_eq!(elite[1].fitness, 1.5);
    }

    #[test]
    fn mating_pairs_returns_correct_count() {
        let mut rng = StdRng::seed_from_u64(4);
        let pairs = select_mating_pairs(&test_population(), 3, SelectionMethod::Roulette, 3, &mut rng);
        assert_eq!(pairs.len(), 3);
        for (p1, p2) in &pairs {
            assert_ne!(p1.genes, p2.genes);
        }
    }
}
