//! Crossover operators for the evolutionary backend.

use rand::Rng;

use super::population::clamp_to_bounds;
use super::types::{Individual, VariableBounds};

/// Heuristic crossover.
///
/// c1 = p1 + r * (p2 - p1)
/// c2 = p2 + r * (p1 - p2)
///
/// where r is uniform random [0, 1]
pub fn heuristic_crossover<R: Rng>(
    parent1: &Individual,
    parent2: &Individual,
    bounds: &VariableBounds,
    rng: &mut R,
) -> (Individual, Individual) {
    let r: f64 = rng.r#gen();

    let child1_genes: Vec<f64> = parent1
        .genes
        .iter()
        .zip(parent2.genes.iter())
        .map(|(p1, p2)| p1 + r * (p2 - p1))
        .collect();

    let child2_genes: Vec<f64> = parent1
        .genes
        .iter()
        .zip(parent2.genes.iter())
        .map(|(p1, p2)| p2 + r * (p1 - p2))
        .collect();

    (
        Individual::new(clamp_to_bounds(&child1_genes, bounds)),
        Individual::new(clamp_to_bounds(&child2_genes, bounds)),
    )
}
