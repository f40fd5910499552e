//! Parallel CPU Introsort
//!
//! Splits the slice with quicksort partitions and hands the pieces to a fixed
//! pool of scoped worker threads through a shared [`WorkStack`].
//!
//! ## Algorithm
//!
//! 1. Push one task covering the whole slice with a depth budget of
//!    `2 * bit_length(len)`.
//! 2. Each worker loops: pop a task, then
//!    - sort it sequentially if it is short enough or its budget is spent,
//!    - drop it if it is already in order,
//!    - otherwise partition it and push both halves with `depth - 1`.
//! 3. Workers retire once the stack's pending count reaches zero.
//!
//! ## Why an explicit stack?
//!
//! Recursive fan-out (one thread or closure per split) grows the call stack
//! and the number of live threads with the input. Here every unit of work is a
//! plain `Range` plus a budget, the pool size is fixed up front, and idle
//! workers pick up whatever was split most recently.

use std::ops::Range;
use std::panic;
use std::sync::atomic::AtomicBool;
use std::thread;

use crossbeam_utils::Backoff;
use log::{debug, trace};

use crate::config::DEFAULT_SEQUENTIAL_THRESHOLD;
use crate::cpu_sort::{intro_sort_internal, is_sorted_by, partition, INSERTION_CUTOFF};
use crate::thread_count::ThreadCount;
use crate::util::{depth_limit, flag_read, flag_write};
use crate::work_stack::WorkStack;

/// Parallel unstable sort using the hardware thread count.
///
/// # Example
///
/// ```
/// use parallel_sorting::cpu_parallel_sort::parallel_introsort;
///
/// let mut data = vec![4, 2, 3, 1];
/// parallel_introsort(&mut data, |a, b| a < b);
/// assert_eq!(data, vec![1, 2, 3, 4]);
/// ```
pub fn parallel_introsort<T, F>(data: &mut [T], is_less: F)
where
    T: Send,
    F: Fn(&T, &T) -> bool + Sync,
{
    parallel_introsort_with_threads(data, is_less, ThreadCount::default());
}

/// Parallel unstable sort on at most `threads` workers.
///
/// A request of 0 or 1 threads sorts on the calling thread.
pub fn parallel_introsort_with_threads<T, F>(
    data: &mut [T],
    is_less: F,
    threads: impl Into<ThreadCount>,
) where
    T: Send,
    F: Fn(&T, &T) -> bool + Sync,
{
    introsort_in_pool(data, &is_less, threads.into(), DEFAULT_SEQUENTIAL_THRESHOLD);
}

pub(crate) fn introsort_in_pool<T, F>(
    data: &mut [T],
    is_less: &F,
    threads: ThreadCount,
    sequential_threshold: usize,
) where
    T: Send,
    F: Fn(&T, &T) -> bool + Sync,
{
    let len = data.len();
    if len <= 1 {
        return;
    }

    let depth = depth_limit(len);
    if threads.is_single() || len < sequential_threshold {
        intro_sort_internal(data, depth, is_less);
        return;
    }
    if is_sorted_by(data, is_less) {
        return;
    }

    let workers = worker_count(threads, len);
    let leaf_len = leaf_len(len, workers);
    debug!(
        "parallel introsort: {} elements, {} workers, depth budget {}, leaf size {}",
        len, workers, depth, leaf_len
    );

    let stack = WorkStack::with_capacity((depth as usize * workers).min(len));
    stack.push(Task {
        range: 0..len,
        depth,
    });
    run_pool(data, &stack, is_less, workers, leaf_len);
}

/// No more workers than there could ever be leaf tasks.
pub(crate) fn worker_count(threads: ThreadCount, len: usize) -> usize {
    (threads.get() as usize).min(len / INSERTION_CUTOFF).max(1)
}

/// Partitions at or below this length are sorted by a single worker.
pub(crate) fn leaf_len(len: usize, workers: usize) -> usize {
    (len / (workers << 5)).max(INSERTION_CUTOFF)
}

/// A contiguous piece of the caller's slice plus its remaining split budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Task {
    pub(crate) range: Range<usize>,
    pub(crate) depth: u32,
}

/// The caller's slice, shared by all workers of one sort call.
///
/// Workers only ever materialise the sub-slice of the task they popped, and
/// live tasks never overlap, so each element has at most one writer.
struct SharedSlice<'a, T> {
    ptr: *mut T,
    len: usize,
    _marker: std::marker::PhantomData<&'a mut [T]>,
}

// SAFETY: handing out disjoint `&mut [T]` to other threads moves access to
// the elements across threads, which `T: Send` permits.
unsafe impl<T: Send> Send for SharedSlice<'_, T> {}
unsafe impl<T: Send> Sync for SharedSlice<'_, T> {}

impl<'a, T> SharedSlice<'a, T> {
    fn new(data: &'a mut [T]) -> Self {
        SharedSlice {
            ptr: data.as_mut_ptr(),
            len: data.len(),
            _marker: std::marker::PhantomData,
        }
    }

    /// # Safety
    ///
    /// No other live reference may overlap `range`.
    unsafe fn slice_mut(&self, range: Range<usize>) -> &'a mut [T] {
        assert!(range.start <= range.end && range.end <= self.len);
        std::slice::from_raw_parts_mut(self.ptr.add(range.start), range.end - range.start)
    }
}

/// Marks a popped task complete when dropped, and flags the pool for
/// shutdown if the worker is unwinding.
struct Completion<'a> {
    stack: &'a WorkStack<Task>,
    abort: &'a AtomicBool,
}

impl Drop for Completion<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            flag_write(self.abort, true);
        }
        self.stack.complete();
    }
}

/// Run `workers` threads over the tasks already pushed to `stack` until all
/// of them, and everything they split into, are sorted.
///
/// Every task in `stack` must cover a range of `data`, and no two may overlap.
/// A panic raised by `is_less` on any worker stops the pool and is resumed
/// on the calling thread.
pub(crate) fn run_pool<T, F>(
    data: &mut [T],
    stack: &WorkStack<Task>,
    is_less: &F,
    workers: usize,
    leaf_len: usize,
) where
    T: Send,
    F: Fn(&T, &T) -> bool + Sync,
{
    let shared = SharedSlice::new(data);
    let abort = AtomicBool::new(false);

    thread::scope(|s| {
        let handles: Vec<_> = (0..workers)
            .map(|id| {
                let shared = &shared;
                let abort = &abort;
                s.spawn(move || worker_loop(id, shared, stack, abort, is_less, leaf_len))
            })
            .collect();
        join_all(handles);
    });
}

/// Join every scoped worker, then resume the first panic among them, if any.
///
/// Joining all handles before unwinding keeps the original panic payload
/// instead of the generic "a scoped thread panicked" raised by the scope.
pub(crate) fn join_all<R>(handles: Vec<thread::ScopedJoinHandle<'_, R>>) -> Vec<R> {
    let mut results = Vec::with_capacity(handles.len());
    let mut first_panic = None;
    for handle in handles {
        match handle.join() {
            Ok(value) => results.push(value),
            Err(payload) => {
                first_panic.get_or_insert(payload);
            }
        }
    }
    if let Some(payload) = first_panic {
        panic::resume_unwind(payload);
    }
    results
}

fn worker_loop<T, F>(
    id: usize,
    shared: &SharedSlice<'_, T>,
    stack: &WorkStack<Task>,
    abort: &AtomicBool,
    is_less: &F,
    leaf_len: usize,
) where
    F: Fn(&T, &T) -> bool,
{
    let backoff = Backoff::new();
    let mut processed = 0usize;

    while stack.pending() != 0 && !flag_read(abort) {
        let Some(task) = stack.pop() else {
            backoff.snooze();
            continue;
        };
        backoff.reset();

        let _completion = Completion { stack, abort };
        // SAFETY: a popped task is owned by this worker alone, and the ranges
        // of live tasks are pairwise disjoint.
        let part = unsafe { shared.slice_mut(task.range.clone()) };
        process(task, part, stack, is_less, leaf_len);
        processed += 1;
    }

    trace!("worker {} retired after {} tasks", id, processed);
}

fn process<T, F>(task: Task, part: &mut [T], stack: &WorkStack<Task>, is_less: &F, leaf_len: usize)
where
    F: Fn(&T, &T) -> bool,
{
    if part.len() <= leaf_len || task.depth == 0 {
        intro_sort_internal(part, task.depth, is_less);
        return;
    }
    if is_sorted_by(part, is_less) {
        return;
    }

    let mid = partition(part, is_less);
    let start = task.range.start;
    let depth = task.depth - 1;
    let left = Task {
        range: start..start + mid,
        depth,
    };
    let right = Task {
        range: start + mid + 1..task.range.end,
        depth,
    };

    // The smaller half goes on top, so this worker likely takes it next.
    let (larger, smaller) = if left.range.len() > right.range.len() {
        (left, right)
    } else {
        (right, left)
    };
    for child in [larger, smaller] {
        if child.range.len() > 1 {
            stack.push(child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu_sort::is_sorted;
    use rand::Rng;

    fn lt(a: &u32, b: &u32) -> bool {
        a < b
    }

    #[test]
    fn test_parallel_introsort_small() {
        let mut data = vec![4u32, 2, 1, 3, 8, 6, 5, 7];
        parallel_introsort(&mut data, lt);
        assert_eq!(data, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_parallel_introsort_random() {
        let mut rng = rand::thread_rng();
        let size = 200_000;
        let mut data: Vec<u32> = (0..size).map(|_| rng.gen()).collect();
        let mut expected = data.clone();
        expected.sort_unstable();

        parallel_introsort_with_threads(&mut data, lt, 4u32);
        assert!(is_sorted(&data));
        assert_eq!(data, expected);
    }

    #[test]
    fn test_pool_path_on_small_input() {
        let mut rng = rand::thread_rng();
        let mut data: Vec<u32> = (0..5_000).map(|_| rng.gen_range(0..100)).collect();
        let mut expected = data.clone();
        expected.sort_unstable();

        introsort_in_pool(&mut data, &lt, ThreadCount::new(3), 0);
        assert_eq!(data, expected);
    }

    #[test]
    fn test_parallel_introsort_empty() {
        let mut data: Vec<u32> = vec![];
        parallel_introsort(&mut data, lt);
        assert!(data.is_empty());
    }

    #[test]
    fn test_parallel_introsort_single() {
        let mut data = vec![42u32];
        parallel_introsort_with_threads(&mut data, lt, 100u32);
        assert_eq!(data, vec![42]);
    }

    #[test]
    fn test_parallel_introsort_already_sorted() {
        let mut data: Vec<u32> = (0..100_000).collect();
        let expected = data.clone();
        parallel_introsort_with_threads(&mut data, lt, 8u32);
        assert_eq!(data, expected);
    }

    #[test]
    fn test_parallel_introsort_reverse_sorted() {
        let mut data: Vec<u32> = (0..100_000).rev().collect();
        let mut expected = data.clone();
        expected.sort_unstable();
        parallel_introsort_with_threads(&mut data, lt, 8u32);
        assert_eq!(data, expected);
    }

    #[test]
    fn test_parallel_introsort_all_equal() {
        let mut data = vec![9u32; 100_000];
        parallel_introsort_with_threads(&mut data, lt, 8u32);
        assert!(data.iter().all(|&x| x == 9));
    }

    #[test]
    fn test_parallel_introsort_zero_threads_is_sequential() {
        let mut data: Vec<u32> = (0..70_000).rev().collect();
        parallel_introsort_with_threads(&mut data, lt, 0u32);
        assert!(is_sorted(&data));
    }

    #[test]
    fn test_worker_count_and_leaf_len() {
        assert_eq!(worker_count(ThreadCount::new(100), 1 << 20), 100);
        assert_eq!(worker_count(ThreadCount::new(100), 64), 2);
        assert_eq!(worker_count(ThreadCount::new(8), 10), 1);
        assert_eq!(leaf_len(1 << 20, 8), (1 << 20) / 256);
        assert_eq!(leaf_len(100, 8), INSERTION_CUTOFF);
    }

    /// Musser's median-of-3 killer: a permutation of `1..=n` that drives
    /// first/middle/last pivot selection to its worst case.
    fn median_of_three_killer(n: u32) -> Vec<u32> {
        let k = n / 2;
        let mut data = vec![0u32; (2 * k) as usize];
        for i in 1..=k {
            if i % 2 == 1 {
                data[(i - 1) as usize] = i;
                data[i as usize] = k + i;
            }
            data[(k + i - 1) as usize] = 2 * i;
        }
        data
    }

    fn pool_sort_with_budget(data: &mut [u32], depth: u32, workers: usize) {
        let stack = WorkStack::new();
        stack.push(Task {
            range: 0..data.len(),
            depth,
        });
        run_pool(data, &stack, &lt, workers, INSERTION_CUTOFF);
        assert_eq!(stack.pending(), 0);
    }

    #[test]
    fn test_pool_exhausted_budget_falls_back_to_heap_sort() {
        let mut rng = rand::thread_rng();
        let mut data: Vec<u32> = (0..50_000).map(|_| rng.gen()).collect();
        let mut expected = data.clone();
        expected.sort_unstable();

        pool_sort_with_budget(&mut data, 0, 4);
        assert_eq!(data, expected);
    }

    #[test]
    fn test_pool_budget_runs_out_after_splits() {
        let mut rng = rand::thread_rng();
        for depth in [1u32, 2, 3] {
            let mut data: Vec<u32> = (0..40_000).map(|_| rng.gen_range(0..1000)).collect();
            let mut expected = data.clone();
            expected.sort_unstable();

            pool_sort_with_budget(&mut data, depth, 3);
            assert_eq!(data, expected, "depth budget {}", depth);
        }
    }

    #[test]
    fn test_median_of_three_killer_on_pool() {
        let input = median_of_three_killer(100_000);
        let expected: Vec<u32> = (1..=100_000).collect();

        let mut sorted = input.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, expected);

        let mut data = input.clone();
        pool_sort_with_budget(&mut data, 2, 4);
        assert_eq!(data, expected);

        let mut data = input;
        introsort_in_pool(&mut data, &lt, ThreadCount::new(6), 0);
        assert_eq!(data, expected);
    }

    #[test]
    fn test_comparator_panic_propagates() {
        let mut data: Vec<u32> = (0..100_000).rev().collect();
        let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
            parallel_introsort_with_threads(
                &mut data,
                |a: &u32, b: &u32| {
                    if *a == 12_345 || *b == 12_345 {
                        panic!("comparator failure");
                    }
                    a < b
                },
                4u32,
            );
        }));
        assert!(result.is_err());

        let mut check = data.clone();
        check.sort_unstable();
        assert_eq!(check, (0..100_000).collect::<Vec<u32>>());
    }
}
