//! Indirect sorting for large elements.
//!
//! Sorting moves elements once per swap. When elements are large it is
//! cheaper to sort a vector of indices in parallel and then move every
//! element exactly once into its final slot.

use crate::config::SortConfig;
use crate::sort_with_config;

/// Sort `data` by sorting its indices, then permuting `data` in place.
pub fn indirect_sort_by<T, F>(data: &mut [T], is_less: F, config: &SortConfig)
where
    T: Sync,
    F: Fn(&T, &T) -> bool + Sync,
{
    if data.len() <= 1 {
        return;
    }

    let mut order: Vec<usize> = (0..data.len()).collect();
    {
        let data = &*data;
        sort_with_config(
            &mut order,
            |&a: &usize, &b: &usize| is_less(&data[a], &data[b]),
            config,
        );
    }
    apply_permutation(data, &mut order);
}

/// Rearrange `data` so that `data[i]` becomes the old `data[order[i]]`.
///
/// `order` is consumed as scratch: every visited slot is reset to its own
/// index.
fn apply_permutation<T>(data: &mut [T], order: &mut [usize]) {
    debug_assert_eq!(data.len(), order.len());
    for start in 0..order.len() {
        if order[start] == start {
            continue;
        }
        let mut current = start;
        loop {
            let source = order[current];
            order[current] = current;
            if source == start {
                break;
            }
            data.swap(current, source);
            current = source;
        }
    }
}
