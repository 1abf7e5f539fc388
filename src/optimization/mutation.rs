//! Mutation operators for the evolutionary backend.

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use super::population::clamp_to_bounds;
use super::types::{Individual, MutationMethod, VariableBounds};

/// Pick a random subset (at least one) of gene indices.
fn genes_to_mutate<R: Rng>(num_genes: usize, rng: &mut R) -> Vec<usize> {
    let num_mutate = rng.gen_range(1..=num_genes);
    let mut indices: Vec<usize> = (0..num_genes).collect();
    for i in (1..indices.len()).rev() {
        let j = rng.gen_range(0..=i);
        indices.swap(i, j);
    }
    indices.truncate(num_mutate);
    indices
}

/// Uniform random mutation.
///
/// 1. Randomly select number of genes to mutate (1 to N)
/// 2. Randomly select which genes to mutate
/// 3. Mutate with: c = p + sigma * range * r, where r is uniform [-1, 1]
pub fn uniform_mutation<R: Rng>(
    individual: &Individual,
    sigma: f64,
    bounds: &VariableBounds,
    rng: &mut R,
) -> Individual {
    let mut genes = individual.genes.clone();
    if genes.is_empty() {
        return Individual::new(genes);
    }

    for idx in genes_to_mutate(genes.len(), rng) {
        let r: f64 = rng.r#gen::<f64>() * 2.0 - 1.0;
        genes[idx] += sigma * bounds.range(idx) * r;
    }

    Individual::new(clamp_to_bounds(&genes, bounds))
}

/// Gaussian mutation: c = p + sigma * range * N(0, 1) on a random subset of genes.
pub fn gaussian_mutation<R: Rng>(
    individual: &Individual,
    sigma: f64,
    bounds: &VariableBounds,
    rng: &mut R,
) -> Individual {
    let mut genes = individual.genes.clone();
    if genes.is_empty() {
        return Individual::new(genes);
    }

    for idx in genes_to_mutate(genes.len(), rng) {
        let n: f64 = StandardNormal.sample(rng);
        genes[idx] += sigma * bounds.range(idx) * n;
    }

    Individual::new(clamp_to_bounds(&genes, bounds))
}

/// Mutate using the specified method.
pub fn perform_mutation<R: Rng>(
    individual: &Individual,
    method: MutationMethod,
    sigma: f64,
    bounds: &VariableBounds,
    rng: &mut R,
) -> Individual {
    match method {
        MutationMethod::Uniform => uniform_mutation(individual, sigma, bounds, rng),
        MutationMethod::Gaussian => gaussian_mutation(individual, sigma, bounds, rng),
    }
}
