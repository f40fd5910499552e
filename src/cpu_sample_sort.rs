//! Parallel CPU Sample Sort
//!
//! Distributes elements into buckets bounded by sampled splitter keys, so that
//! every key in bucket `i` sorts before every key in bucket `i + 1`. Sorting
//! each bucket independently then sorts the whole slice: no merge step.
//!
//! The algorithm:
//! 1. Draw a random sample, sort it, and keep evenly spaced distinct keys as
//!    splitters (`8 * next_power_of_two(threads)` buckets).
//! 2. Classify every element in parallel: one chunk per worker, binary search
//!    over the splitters, keys equal to a splitter go right.
//! 3. Move elements into their buckets in place by following swap cycles.
//! 4. Push every bucket as a task onto a [`WorkStack`] and let the same worker
//!    pool as the parallel introsort finish them, splitting large buckets
//!    further.
//!
//! The bucket count follows the requested thread count rather than the core
//! count, so a request for far more threads than cores still yields enough
//! independent tasks to keep every worker busy.
//!
//! Classification and bucket sorting each spawn their own scoped workers, so
//! one call starts two short-lived sets of threads rather than one.

use std::ops::Range;
use std::thread;

use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::DEFAULT_SEQUENTIAL_THRESHOLD;
use crate::cpu_parallel_sort::{join_all, leaf_len, run_pool, worker_count, Task};
use crate::cpu_sort::{intro_sort_internal, is_sorted_by};
use crate::thread_count::ThreadCount;
use crate::util::{bit_length, depth_limit};
use crate::work_stack::WorkStack;

/// Sample elements drawn per bucket.
const OVERSAMPLING: usize = 16;
/// log2 of the number of buckets per worker.
const BUCKETS_PER_THREAD_SHIFT: u32 = 3;
const SAMPLE_SEED: u64 = 0x5A3B_1E50_27C0_FFEE;

/// Parallel unstable sort using the hardware thread count.
///
/// # Example
///
/// ```
/// use parallel_sorting::cpu_sample_sort::sample_sort;
///
/// let mut data = vec![5, 1, 4, 2, 3];
/// sample_sort(&mut data, |a, b| a < b);
/// assert_eq!(data, vec![1, 2, 3, 4, 5]);
/// ```
pub fn sample_sort<T, F>(data: &mut [T], is_less: F)
where
    T: Send + Sync,
    F: Fn(&T, &T) -> bool + Sync,
{
    sample_sort_with_threads(data, is_less, ThreadCount::default());
}

/// Parallel unstable sort on at most `threads` workers.
pub fn sample_sort_with_threads<T, F>(data: &mut [T], is_less: F, threads: impl Into<ThreadCount>)
where
    T: Send + Sync,
    F: Fn(&T, &T) -> bool + Sync,
{
    sample_sort_in_pool(data, &is_less, threads.into(), DEFAULT_SEQUENTIAL_THRESHOLD);
}

pub(crate) fn sample_sort_in_pool<T, F>(
    data: &mut [T],
    is_less: &F,
    threads: ThreadCount,
    sequential_threshold: usize,
) where
    T: Send + Sync,
    F: Fn(&T, &T) -> bool + Sync,
{
    let len = data.len();
    if len <= 1 {
        return;
    }

    let threads = sample_threads(threads, len);
    if threads < 2 || len < sequential_threshold {
        intro_sort_internal(data, depth_limit(len), is_less);
        return;
    }
    if is_sorted_by(data, is_less) {
        return;
    }

    let splitters = select_splitters(data, is_less, bucket_count(threads));
    let buckets = splitters.len() + 1;
    let mut bucket_ids = vec![0u32; len];
    let counts = classify(data, &splitters, &mut bucket_ids, is_less, threads);
    let bounds = permute_into_buckets(data, &mut bucket_ids, &counts);
    drop(bucket_ids);

    let workers = worker_count(ThreadCount::from(threads), len);
    let leaf_len = leaf_len(len, workers);
    debug!(
        "sample sort: {} elements, {} workers, {} buckets, largest bucket {}",
        len,
        workers,
        buckets,
        counts.iter().copied().max().unwrap_or(0)
    );

    let stack = WorkStack::with_capacity(buckets);
    for range in bounds.into_iter().rev() {
        if range.len() > 1 {
            stack.push(Task {
                depth: depth_limit(range.len()),
                range,
            });
        }
    }
    run_pool(data, &stack, is_less, workers, leaf_len);
}

/// Halve the thread count while there would be too few elements per thread
/// to amortise sampling and classification.
fn sample_threads(threads: ThreadCount, len: usize) -> usize {
    let mut threads = threads.get() as usize;
    while threads > 1 && threads.saturating_mul(threads) > len >> 3 {
        threads /= 2;
    }
    threads
}

/// Eight buckets per thread, rounded up to a power of two.
fn bucket_count(threads: usize) -> usize {
    let threads = threads.max(1);
    (1usize << bit_length((threads - 1) as u64)) << BUCKETS_PER_THREAD_SHIFT
}

/// Indices of the splitter keys, in ascending key order with no two equal.
fn select_splitters<T, F>(data: &[T], is_less: &F, buckets: usize) -> Vec<usize>
where
    F: Fn(&T, &T) -> bool,
{
    let len = data.len();
    let sample_len = (buckets * OVERSAMPLING).min(len);
    let mut rng = ChaCha8Rng::seed_from_u64(SAMPLE_SEED ^ len as u64);
    let mut sample: Vec<usize> = (0..sample_len).map(|_| rng.gen_range(0..len)).collect();

    let by_key = |a: &usize, b: &usize| is_less(&data[*a], &data[*b]);
    intro_sort_internal(&mut sample, depth_limit(sample_len), &by_key);

    let mut splitters: Vec<usize> = Vec::with_capacity(buckets - 1);
    for i in 1..buckets {
        let candidate = sample[i * sample_len / buckets];
        match splitters.last() {
            Some(&last) if !is_less(&data[last], &data[candidate]) => {}
            _ => splitters.push(candidate),
        }
    }
    splitters
}

/// Fill `bucket_ids` in parallel and return the size of every bucket.
fn classify<T, F>(
    data: &[T],
    splitters: &[usize],
    bucket_ids: &mut [u32],
    is_less: &F,
    threads: usize,
) -> Vec<usize>
where
    T: Sync,
    F: Fn(&T, &T) -> bool + Sync,
{
    let buckets = splitters.len() + 1;
    let chunk = (data.len() + threads - 1) / threads;

    let histograms = thread::scope(|s| {
        let handles: Vec<_> = data
            .chunks(chunk)
            .zip(bucket_ids.chunks_mut(chunk))
            .map(|(values, ids)| {
                s.spawn(move || {
                    let mut histogram = vec![0usize; buckets];
                    for (value, id) in values.iter().zip(ids.iter_mut()) {
                        let bucket =
                            splitters.partition_point(|&splitter| !is_less(value, &data[splitter]));
                        *id = bucket as u32;
                        histogram[bucket] += 1;
                    }
                    histogram
                })
            })
            .collect();
        join_all(handles)
    });

    let mut counts = vec![0usize; buckets];
    for histogram in histograms {
        for (total, count) in counts.iter_mut().zip(histogram) {
            *total += count;
        }
    }
    counts
}

/// Reorder `data` so bucket `b` occupies the `b`-th range of `counts`.
///
/// Each swap puts one element into its final bucket, so this runs in linear
/// time with no scratch buffer.
fn permute_into_buckets<T>(
    data: &mut [T],
    bucket_ids: &mut [u32],
    counts: &[usize],
) -> Vec<Range<usize>> {
    let mut bounds = Vec::with_capacity(counts.len());
    let mut start = 0;
    for &count in counts {
        bounds.push(start..start + count);
        start += count;
    }

    let mut next: Vec<usize> = bounds.iter().map(|r| r.start).collect();
    for (bucket, range) in bounds.iter().enumerate() {
        while next[bucket] < range.end {
            let i = next[bucket];
            let target = bucket_ids[i] as usize;
            if target == bucket {
                next[bucket] += 1;
            } else {
                let j = next[target];
                data.swap(i, j);
                bucket_ids.swap(i, j);
                next[target] += 1;
            }
        }
    }
    bounds
}
