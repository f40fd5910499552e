//! Parallel Comparison Sorting
//!
//! In-place unstable sorting of slices on a bounded pool of scoped worker
//! threads. Two parallel strategies share the same worker pool:
//! - **Parallel introsort**: quicksort partitions distributed over a shared
//!   work stack, with heap sort as the worst-case fallback.
//! - **Sample sort**: sampled splitters bucket the input in one pass, then
//!   the buckets are sorted in parallel.
//!
//! Small inputs and single-thread requests are sorted on the calling thread
//! with a sequential introsort.
//!
//! ```
//! use parallel_sorting::{sort_with_config, SortConfig, Strategy};
//!
//! let mut data: Vec<u64> = (0..100_000).rev().collect();
//! let config = SortConfig::new().with_strategy(Strategy::SampleSort).with_threads(4u32);
//! sort_with_config(&mut data, |a, b| a < b, &config);
//! assert!(data.windows(2).all(|w| w[0] <= w[1]));
//! ```

pub mod config;
pub mod cpu_parallel_sort;
pub mod cpu_sample_sort;
pub mod cpu_sort;
pub mod error;
pub mod indirect;
pub mod spinlock;
pub mod thread_count;
pub mod util;
pub mod work_stack;

use std::cmp::Ordering;

pub use config::{SortConfig, Strategy};
pub use cpu_parallel_sort::{parallel_introsort, parallel_introsort_with_threads};
pub use cpu_sample_sort::{sample_sort, sample_sort_with_threads};
pub use error::ConfigError;
pub use indirect::indirect_sort_by;
pub use spinlock::{SpinLock, SpinLockGuard};
pub use thread_count::ThreadCount;
pub use work_stack::WorkStack;

/// Sort in ascending order with the default configuration.
pub fn sort<T>(data: &mut [T])
where
    T: Ord + Send + Sync,
{
    sort_with_config(data, T::lt, &SortConfig::default());
}

/// Sort with an `Ordering` comparator and the default configuration.
pub fn sort_by<T, F>(data: &mut [T], compare: F)
where
    T: Send + Sync,
    F: Fn(&T, &T) -> Ordering + Sync,
{
    sort_with_config(
        data,
        |a, b| compare(a, b) == Ordering::Less,
        &SortConfig::default(),
    );
}

/// Sort by an extracted key with the default configuration.
///
/// The key is recomputed on every comparison.
pub fn sort_by_key<T, K, F>(data: &mut [T], key: F)
where
    T: Send + Sync,
    K: Ord,
    F: Fn(&T) -> K + Sync,
{
    sort_with_config(data, |a, b| key(a) < key(b), &SortConfig::default());
}

/// Sort with `is_less` using the strategy, worker count and sequential
/// threshold in `config`.
pub fn sort_with_config<T, F>(data: &mut [T], is_less: F, config: &SortConfig)
where
    T: Send + Sync,
    F: Fn(&T, &T) -> bool + Sync,
{
    match config.strategy {
        Strategy::Introsort => cpu_parallel_sort::introsort_in_pool(
            data,
            &is_less,
            config.threads,
            config.sequential_threshold,
        ),
        Strategy::SampleSort => cpu_sample_sort::sample_sort_in_pool(
            data,
            &is_less,
            config.threads,
            config.sequential_threshold,
        ),
    }
}
