//! Busy-Wait Mutual Exclusion
//!
//! The work stack holds its lock for a handful of instructions (one `Vec`
//! push or pop), so parking a thread would cost far more than the critical
//! section itself. [`RawSpinLock`] spins on an atomic flag instead.
//!
//! ## Contract
//!
//! - `try_acquire` never blocks.
//! - `acquire` retries until it wins; it is not reentrant, so acquiring a lock
//!   the current thread already holds never returns.
//! - `release` must only be called by the holder.
//!
//! [`SpinLock`] wraps data behind the raw lock and hands out a RAII guard, so
//! the lock is released on every exit path, unwinding included.

use std::cell::UnsafeCell;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_utils::Backoff;

/// Two-state lock word: unlocked or locked.
pub struct RawSpinLock {
    locked: AtomicBool,
}

impl RawSpinLock {
    pub const fn new() -> Self {
        RawSpinLock {
            locked: AtomicBool::new(false),
        }
    }

    /// Take the lock if it is free. Returns whether it was obtained.
    #[inline]
    pub fn try_acquire(&self) -> bool {
        self.locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    /// Spin until the lock is obtained.
    ///
    /// Contended waiters read the flag before retrying the exchange so the
    /// cache line stays shared while the holder works, and back off
    /// exponentially to avoid burning the core under heavy contention.
    #[inline]
    pub fn acquire(&self) {
        if self.try_acquire() {
            return;
        }

        let backoff = Backoff::new();
        loop {
            while self.locked.load(Ordering::Relaxed) {
                backoff.snooze();
            }
            if self.try_acquire() {
                return;
            }
        }
    }

    /// Release the lock.
    ///
    /// # Safety
    ///
    /// The calling thread must currently hold the lock.
    #[inline]
    pub unsafe fn release(&self) {
        debug_assert!(self.is_locked(), "release of an unlocked spinlock");
        self.locked.store(false, Ordering::Release);
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }
}

impl Default for RawSpinLock {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RawSpinLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawSpinLock")
            .field("locked", &self.is_locked())
            .finish()
    }
}

/// Data protected by a [`RawSpinLock`].
pub struct SpinLock<T: ?Sized> {
    raw: RawSpinLock,
    data: UnsafeCell<T>,
}

// SAFETY: the raw lock serialises every access to `data`.
unsafe impl<T: ?Sized + Send> Send for SpinLock<T> {}
unsafe impl<T: ?Sized + Send> Sync for SpinLock<T> {}

impl<T> SpinLock<T> {
    pub const fn new(value: T) -> Self {
        SpinLock {
            raw: RawSpinLock::new(),
            data: UnsafeCell::new(value),
        }
    }

    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

impl<T: ?Sized> SpinLock<T> {
    /// Spin until the lock is held and return a guard releasing it on drop.
    #[inline]
    pub fn lock(&self) -> SpinLockGuard<'_, T> {
        self.raw.acquire();
        SpinLockGuard { lock: self }
    }

    #[inline]
    pub fn try_lock(&self) -> Option<SpinLockGuard<'_, T>> {
        if self.raw.try_acquire() {
            Some(SpinLockGuard { lock: self })
        } else {
            None
        }
    }

    /// Exclusive access without locking; the borrow checker proves no guard exists.
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }

    pub fn is_locked(&self) -> bool {
        self.raw.is_locked()
    }
}

impl<T: Default> Default for SpinLock<T> {
    fn default() -> Self {
        SpinLock::new(T::default())
    }
}

impl<T: ?Sized> fmt::Debug for SpinLock<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpinLock")
            .field("locked", &self.is_locked())
            .finish_non_exhaustive()
    }
}

/// Scoped ownership of a [`SpinLock`]; the lock is released when dropped.
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct SpinLockGuard<'a, T: ?Sized> {
    lock: &'a SpinLock<T>,
}

impl<T: ?Sized> Deref for SpinLockGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: the guard proves the lock is held.
        unsafe { &*self.lock.data.get() }
    }
}

impl<T: ?Sized> DerefMut for SpinLockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: the guard proves the lock is held, and `&mut self` makes it unique.
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T: ?Sized> Drop for SpinLockGuard<'_, T> {
    fn drop(&mut self) {
        // SAFETY: a guard only exists while its lock is held.
        unsafe { self.lock.raw.release() }
    }
}
