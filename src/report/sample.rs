use rand::seq::index;
use rand::Rng;

/// Samples `amount` distinct indices from `0..population` without
/// replacement, using the caller's rng.
///
/// The rng is injected so the seed lives with the evaluation run rather
/// than in process-global state; the same seed and population always yield
/// the same indices. Asking for more samples than exist degrades to the
/// whole population.
pub fn sample_indices<R: Rng + ?Sized>(
    rng: &mut R,
    population: usize,
    amount: usize,
) -> Vec<usize> {
    let amount = amount.min(population);
    index::sample(rng, population, amount).into_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_same_seed_same_indices() {
        let mut first = StdRng::seed_from_u64(42);
        let mut second = StdRng::seed_from_u64(42);
        assert_eq!(
            sample_indices(&mut first, 100, 25),
            sample_indices(&mut second, 100, 25)
        );
    }

    #[test]
    fn test_indices_are_distinct_and_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let indices = sample_indices(&mut rng, 50, 25);
        assert_eq!(indices.len(), 25);
        let mut sorted = indices.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 25);
        assert!(indices.iter().all(|&i| i < 50));
    }

    #[test]
    fn test_small_population_degrades_gracefully() {
        let mut rng = StdRng::seed_from_u64(1);
        let indices = sample_indices(&mut rng, 4, 25);
        assert_eq!(indices.len(), 4);
    }
}
