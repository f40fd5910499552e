//! Low-level helpers shared by the sorting engines.
//!
//! - [`bit_length`]: minimal number of bits for an unsigned value, used to size
//!   depth budgets and sample-sort bucket counts.
//! - `atomic_*`: loads and read-modify-writes with fixed, documented memory
//!   orderings, so every lock-free poll of a shared counter reads the same way.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicUsize, Ordering};

/// Number of bits needed to represent `x` (0 for 0).
///
/// Equivalent to `floor(log2(x)) + 1` for `x > 0`.
#[inline]
pub const fn bit_length(x: u64) -> u32 {
    u64::BITS - x.leading_zeros()
}

/// 32-bit flavour of [`bit_length`].
#[inline]
pub const fn bit_length32(x: u32) -> u32 {
    u32::BITS - x.leading_zeros()
}

/// Recursion depth budget for a partition of `len` elements.
///
/// Once a task exhausts it the engine switches to heap sort, bounding the
/// total work to O(n log n) whatever the pivots look like.
#[inline]
pub fn depth_limit(len: usize) -> u32 {
    2 * bit_length(len as u64)
}

/// Integer atomics the engine polls and updates.
pub trait AtomicCounter {
    type Value: Copy;

    fn load_with(&self, order: Ordering) -> Self::Value;
    fn store_with(&self, value: Self::Value, order: Ordering);
    fn fetch_add_with(&self, value: Self::Value, order: Ordering) -> Self::Value;
    fn fetch_sub_with(&self, value: Self::Value, order: Ordering) -> Self::Value;
}

macro_rules! impl_atomic_counter {
    ($($atomic:ty => $value:ty),* $(,)?) => {
        $(
            impl AtomicCounter for $atomic {
                type Value = $value;

                #[inline]
                fn load_with(&self, order: Ordering) -> $value {
                    self.load(order)
                }

                #[inline]
                fn store_with(&self, value: $value, order: Ordering) {
                    self.store(value, order)
                }

                #[inline]
                fn fetch_add_with(&self, value: $value, order: Ordering) -> $value {
                    self.fetch_add(value, order)
                }

                #[inline]
                fn fetch_sub_with(&self, value: $value, order: Ordering) -> $value {
                    self.fetch_sub(value, order)
                }
            }
        )*
    };
}

impl_atomic_counter!(AtomicUsize => usize, AtomicU32 => u32, AtomicU64 => u64);

/// Read a shared counter with `Acquire` ordering.
///
/// A thread that observes a value published with [`atomic_write`],
/// [`atomic_add`] or [`atomic_sub`] also observes every write the publishing
/// thread made before it.
#[inline]
pub fn atomic_read<A: AtomicCounter>(counter: &A) -> A::Value {
    counter.load_with(Ordering::Acquire)
}

/// Add to a shared counter (`AcqRel`); returns the previous value.
#[inline]
pub fn atomic_add<A: AtomicCounter>(counter: &A, value: A::Value) -> A::Value {
    counter.fetch_add_with(value, Ordering::AcqRel)
}

/// Subtract from a shared counter (`AcqRel`); returns the previous value.
#[inline]
pub fn atomic_sub<A: AtomicCounter>(counter: &A, value: A::Value) -> A::Value {
    counter.fetch_sub_with(value, Ordering::AcqRel)
}

/// Publish a new counter value (`Release`).
#[inline]
pub fn atomic_write<A: AtomicCounter>(counter: &A, value: A::Value) {
    counter.store_with(value, Ordering::Release)
}

/// `Acquire` load of a shared flag.
#[inline]
pub fn flag_read(flag: &AtomicBool) -> bool {
    flag.load(Ordering::Acquire)
}

/// `Release` store of a shared flag.
#[inline]
pub fn flag_write(flag: &AtomicBool, value: bool) {
    flag.store(value, Ordering::Release)
}
