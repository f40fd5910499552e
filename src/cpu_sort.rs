//! Sequential CPU Sorting
//!
//! Single-threaded building blocks used by the parallel engines for leaf
//! partitions and as their worst-case safety net:
//!
//! - **Insertion sort**: O(n²) but the cheapest option for a few dozen elements.
//!   Stable.
//! - **Heap sort**: guaranteed O(n log n), used once a partition has used up
//!   its depth budget.
//! - **Introsort**: quicksort with a median-of-3 / median-of-9 pivot, insertion
//!   sort for small slices and heap sort once the depth budget is exhausted.

use crate::util::depth_limit;

/// Slices at or below this length are insertion sorted.
pub const INSERTION_CUTOFF: usize = 32;

/// From this length on the pivot is a median of nine samples.
const NINTHER_THRESHOLD: usize = 1024;

/// Sort a slice in place with insertion sort.
///
/// Each element is taken out and re-inserted at the first position, scanning
/// backward, where `is_less` no longer asks for it to move. Elements that
/// compare equal keep their relative order.
pub fn insertion_sort_by<T, F>(data: &mut [T], is_less: F)
where
    F: Fn(&T, &T) -> bool,
{
    insertion_sort(data, &is_less);
}

/// Sort a slice in place with heap sort.
pub fn heap_sort_by<T, F>(data: &mut [T], is_less: F)
where
    F: Fn(&T, &T) -> bool,
{
    heap_sort(data, &is_less);
}

/// Sort a slice in place with a single-threaded introsort.
///
/// Already sorted input returns after one linear scan.
pub fn intro_sort_by<T, F>(data: &mut [T], is_less: F)
where
    F: Fn(&T, &T) -> bool,
{
    if data.len() <= 1 || is_sorted_by(data, &is_less) {
        return;
    }
    intro_sort_internal(data, depth_limit(data.len()), &is_less);
}

/// Check that no adjacent pair is out of order under `is_less`.
#[inline]
pub fn is_sorted_by<T, F>(data: &[T], is_less: F) -> bool
where
    F: Fn(&T, &T) -> bool,
{
    data.windows(2).all(|w| !is_less(&w[1], &w[0]))
}

/// Check if a slice is sorted in ascending order.
#[inline]
pub fn is_sorted<T: Ord>(data: &[T]) -> bool {
    data.windows(2).all(|w| w[0] <= w[1])
}

pub(crate) fn insertion_sort<T, F>(data: &mut [T], is_less: &F)
where
    F: Fn(&T, &T) -> bool,
{
    for i in 1..data.len() {
        let mut pos = i;
        while pos > 0 && is_less(&data[i], &data[pos - 1]) {
            pos -= 1;
        }
        if pos < i {
            data[pos..=i].rotate_right(1);
        }
    }
}

pub(crate) fn heap_sort<T, F>(data: &mut [T], is_less: &F)
where
    F: Fn(&T, &T) -> bool,
{
    let len = data.len();
    for node in (0..len / 2).rev() {
        sift_down(data, node, is_less);
    }
    for end in (1..len).rev() {
        data.swap(0, end);
        sift_down(&mut data[..end], 0, is_less);
    }
}

fn sift_down<T, F>(heap: &mut [T], mut node: usize, is_less: &F)
where
    F: Fn(&T, &T) -> bool,
{
    loop {
        let mut child = 2 * node + 1;
        if child >= heap.len() {
            return;
        }
        if child + 1 < heap.len() && is_less(&heap[child], &heap[child + 1]) {
            child += 1;
        }
        if !is_less(&heap[node], &heap[child]) {
            return;
        }
        heap.swap(node, child);
        node = child;
    }
}

/// Introsort body: `depth` is the remaining split budget.
pub(crate) fn intro_sort_internal<T, F>(mut data: &mut [T], mut depth: u32, is_less: &F)
where
    F: Fn(&T, &T) -> bool,
{
    loop {
        if data.len() <= INSERTION_CUTOFF {
            insertion_sort(data, is_less);
            return;
        }
        if depth == 0 {
            heap_sort(data, is_less);
            return;
        }
        depth -= 1;

        let mid = partition(data, is_less);
        let (left, right) = std::mem::take(&mut data).split_at_mut(mid);
        let right = &mut right[1..];

        // Recurse into the smaller side so the stack stays O(log n).
        if left.len() < right.len() {
            intro_sort_internal(left, depth, is_less);
            data = right;
        } else {
            intro_sort_internal(right, depth, is_less);
            data = left;
        }
    }
}

fn median3<T, F>(data: &[T], a: usize, b: usize, c: usize, is_less: &F) -> usize
where
    F: Fn(&T, &T) -> bool,
{
    if is_less(&data[a], &data[b]) {
        if is_less(&data[b], &data[c]) {
            b
        } else if is_less(&data[a], &data[c]) {
            c
        } else {
            a
        }
    } else if is_less(&data[c], &data[b]) {
        b
    } else if is_less(&data[c], &data[a]) {
        c
    } else {
        a
    }
}

/// Move the chosen pivot to `data[0]`.
fn choose_pivot<T, F>(data: &mut [T], is_less: &F)
where
    F: Fn(&T, &T) -> bool,
{
    let len = data.len();
    let pivot = if len >= NINTHER_THRESHOLD {
        let step = len / 8;
        let a = median3(data, 1, step, 2 * step, is_less);
        let b = median3(data, 3 * step, 4 * step, 5 * step, is_less);
        let c = median3(data, 6 * step, 7 * step, len - 1, is_less);
        median3(data, a, b, c, is_less)
    } else {
        median3(data, 1, len / 2, len - 1, is_less)
    };
    data.swap(0, pivot);
}

/// Partition around a pivot and return its final index `p`.
///
/// Afterwards nothing in `data[..p]` is greater than `data[p]` and nothing
/// in `data[p + 1..]` is less. Both scans stop on keys equal to the pivot,
/// so runs of duplicates are split evenly instead of piling up on one side.
/// Requires `data.len() >= 3`.
pub(crate) fn partition<T, F>(data: &mut [T], is_less: &F) -> usize
where
    F: Fn(&T, &T) -> bool,
{
    debug_assert!(data.len() >= 3);
    choose_pivot(data, is_less);

    let (head, rest) = data.split_at_mut(1);
    let pivot = &head[0];
    let mut left = 0;
    let mut right = rest.len();
    loop {
        while left < right && is_less(&rest[left], pivot) {
            left += 1;
        }
        while left < right && is_less(pivot, &rest[right - 1]) {
            right -= 1;
        }
        if left >= right {
            break;
        }
        right -= 1;
        rest.swap(left, right);
        left += 1;
    }

    data.swap(0, right);
    right
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn lt(a: &u32, b: &u32) -> bool {
        a < b
    }

    fn organ_pipe(n: u32) -> Vec<u32> {
        (0..n / 2).chain((0..n / 2).rev()).collect()
    }

    #[test]
    fn test_insertion_sort_small() {
        let mut data = vec![4u32, 2, 1, 3, 8, 6, 5, 7];
        insertion_sort_by(&mut data, lt);
        assert_eq!(data, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_insertion_sort_is_stable() {
        let mut data: Vec<(u8, usize)> = vec![(3, 0), (1, 1), (3, 2), (2, 3), (1, 4), (3, 5)];
        insertion_sort_by(&mut data, |a, b| a.0 < b.0);
        assert_eq!(data, vec![(1, 1), (1, 4), (2, 3), (3, 0), (3, 2), (3, 5)]);
    }

    #[test]
    fn test_insertion_sort_empty_and_single() {
        let mut empty: Vec<u32> = vec![];
        insertion_sort_by(&mut empty, lt);
        assert!(empty.is_empty());

        let mut single = vec![42u32];
        insertion_sort_by(&mut single, lt);
        assert_eq!(single, vec![42]);
    }

    #[test]
    fn test_heap_sort_random() {
        let mut rng = rand::thread_rng();
        let mut data: Vec<u32> = (0..5000).map(|_| rng.gen_range(0..1000)).collect();
        let mut expected = data.clone();
        expected.sort_unstable();

        heap_sort_by(&mut data, lt);
        assert_eq!(data, expected);
    }

    #[test]
    fn test_heap_sort_descending_predicate() {
        let mut data: Vec<u32> = (0..100).collect();
        heap_sort_by(&mut data, |a, b| a > b);
        assert_eq!(data, (0..100).rev().collect::<Vec<u32>>());
    }

    #[test]
    fn test_intro_sort_patterns() {
        let mut rng = rand::thread_rng();
        let inputs: Vec<Vec<u32>> = vec![
            (0..10_000).collect(),
            (0..10_000).rev().collect(),
            organ_pipe(10_000),
            vec![7; 10_000],
            (0..10_000).map(|_| rng.gen_range(0..4)).collect(),
            (0..10_000).map(|_| rng.gen()).collect(),
        ];

        for input in inputs {
            let mut data = input.clone();
            let mut expected = input;
            expected.sort_unstable();
            intro_sort_by(&mut data, lt);
            assert_eq!(data, expected);
        }
    }

    #[test]
    fn test_intro_sort_zero_depth_uses_heap_sort() {
        let mut rng = rand::thread_rng();
        let mut data: Vec<u32> = (0..2000).map(|_| rng.gen()).collect();
        let mut expected = data.clone();
        expected.sort_unstable();

        intro_sort_internal(&mut data, 0, &lt);
        assert_eq!(data, expected);
    }

    #[test]
    fn test_intro_sort_strings() {
        let mut data: Vec<String> = ["pear", "apple", "fig", "kiwi", "banana"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        intro_sort_by(&mut data, |a, b| a < b);
        assert_eq!(data, vec!["apple", "banana", "fig", "kiwi", "pear"]);
    }

    #[test]
    fn test_partition_invariant() {
        let mut rng = rand::thread_rng();
        for len in [3usize, 4, 33, 100, 1500] {
            let mut data: Vec<u32> = (0..len).map(|_| rng.gen_range(0..50)).collect();
            let p = partition(&mut data, &lt);
            let pivot = data[p];
            assert!(data[..p].iter().all(|x| *x <= pivot));
            assert!(data[p + 1..].iter().all(|x| *x >= pivot));
        }
    }

    #[test]
    fn test_partition_splits_equal_keys_evenly() {
        let mut data = vec![5u32; 1001];
        let p = partition(&mut data, &lt);
        assert!(p > 400 && p < 600, "pivot landed at {}", p);
    }

    #[test]
    fn test_is_sorted() {
        assert!(is_sorted(&[1, 2, 3, 4, 5]));
        assert!(is_sorted(&[1, 1, 1, 1]));
        assert!(is_sorted(&[1]));
        assert!(is_sorted::<u32>(&[]));
        assert!(!is_sorted(&[5, 4, 3, 2, 1]));
        assert!(!is_sorted(&[1, 3, 2]));
        assert!(is_sorted_by(&[3, 2, 1], |a: &i32, b: &i32| a > b));
    }
}
