//! Space-filling start points for multi-start searches.

use rand::seq::SliceRandom;
use rand::Rng;

/// Generate Latin Hypercube samples within the given bounds.
///
/// Each dimension is cut into `n_samples` equal intervals and every interval
/// holds exactly one sample, so the starts cover every range evenly.
pub fn latin_hypercube_sample<R: Rng>(bounds: &[(f64, f64)], n_samples: usize, rng: &mut R) -> Vec<Vec<f64>> {
    if n_samples == 0 || bounds.is_empty() {
        return Vec::new();
    }

    // For each dimension, create a permutation of interval indices
    let permutations: Vec<Vec<usize>> = bounds
        .iter()
        .map(|_| {
            let mut perm: Vec<usize> = (0..n_samples).collect();
            perm.shuffle(rng);
            perm
        })
        .collect();

    (0..n_samples)
        .map(|i| {
            bounds
                .iter()
                .zip(permutations.iter())
                .map(|(&(lo, hi), perm)| {
                    let interval_size = (hi - lo) / n_samples as f64;
                    lo + (perm[i] as f64 + rng.r#gen::<f64>()) * interval_size
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn one_sample_per_interval() {
        let bounds = [(0.0, 1.0), (10.0, 30.0)];
        let mut rng = StdRng::seed_from_u64(7);
        let samples = latin_hypercube_sample(&bounds, 8, &mut rng);
        assert_eq!(samples.len(), 8);

        for (dim, &(lo, hi)) in bounds.iter().enumerate() {
            let mut occupied = vec![false; 8];
            for sample in &samples {
                let value = sample[dim];
                assert!(value >= lo && value <= hi);
                let interval = (((value - lo) / (hi - lo)) * 8.0).floor().min(7.0) as usize;
                assert!(!occupied[interval], "interval {interval} used twice");
                occupied[interval] = true;
            }
        }
    }

    #[test]
    fn empty_inputs() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(latin_hypercube_sample(&[], 5, &mut rng).is_empty());
        assert!(latin_hypercube_sample(&[(0.0, 1.0)], 0, &mut rng).is_empty());
    }
}
