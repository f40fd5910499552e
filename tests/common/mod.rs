#![allow(dead_code)]

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use parallel_sorting::{SortConfig, Strategy, ThreadCount};

pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

pub fn random_u64(len: usize, seed: u64) -> Vec<u64> {
    let mut rng = seeded_rng(seed);
    (0..len).map(|_| rng.gen::<u64>()).collect()
}

/// Verify that `sorted` holds the same multiset of values as `original`.
pub fn verify_permutation<T: Ord + Clone>(original: &[T], sorted: &[T]) -> bool {
    if original.len() != sorted.len() {
        return false;
    }
    let mut a = original.to_vec();
    let mut b = sorted.to_vec();
    a.sort();
    b.sort();
    a == b
}

/// Verify that no adjacent pair is out of order under `is_less`.
pub fn verify_sorted_by<T>(data: &[T], is_less: impl Fn(&T, &T) -> bool) -> bool {
    data.windows(2).all(|w| !is_less(&w[1], &w[0]))
}

/// Every strategy at 1, 6, 100 and the hardware number of threads.
pub fn all_configs() -> Vec<SortConfig> {
    let mut configs = Vec::new();
    for strategy in Strategy::ALL {
        for threads in [ThreadCount::ONE, ThreadCount::new(6), ThreadCount::new(100), ThreadCount::default()] {
            configs.push(SortConfig::new().with_strategy(strategy).with_threads(threads));
        }
    }
    configs
}
