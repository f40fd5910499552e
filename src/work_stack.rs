//! Concurrent LIFO Task Stack
//!
//! Feeds the worker pool. A `Vec` behind a [`SpinLock`] is enough: each
//! operation holds the lock for a single push or pop.
//!
//! ## Termination accounting
//!
//! The stack also owns the pool's pending-task counter:
//!
//! - [`WorkStack::push`] increments it *before* the task becomes poppable.
//! - [`WorkStack::complete`] decrements it once a popped task is fully
//!   handled, which for a split task means after its children were pushed.
//!
//! A parent therefore keeps the counter above zero until its children are
//! counted, and `pending() == 0` proves no task exists or can still appear.
//!
//! LIFO order keeps the pool depth-first: a worker usually pops the child it
//! just produced, which is still in its cache, and the live task set stays small.

use std::sync::atomic::AtomicUsize;

use crossbeam_utils::CachePadded;

use crate::spinlock::SpinLock;
use crate::util::{atomic_add, atomic_read, atomic_sub};

pub struct WorkStack<T> {
    tasks: SpinLock<Vec<T>>,
    pending: CachePadded<AtomicUsize>,
}

impl<T> WorkStack<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        WorkStack {
            tasks: SpinLock::new(Vec::with_capacity(capacity)),
            pending: CachePadded::new(AtomicUsize::new(0)),
        }
    }

    /// Insert a task and count it as pending.
    #[inline]
    pub fn push(&self, task: T) {
        atomic_add(&*self.pending, 1);
        self.tasks.lock().push(task);
    }

    /// Remove the most recently pushed task, if any.
    ///
    /// The caller owns the task and must call [`complete`](Self::complete)
    /// once it has been processed.
    #[inline]
    pub fn pop(&self) -> Option<T> {
        self.tasks.lock().pop()
    }

    /// Mark one popped task as fully processed.
    #[inline]
    pub fn complete(&self) {
        let previous = atomic_sub(&*self.pending, 1);
        debug_assert!(previous > 0, "complete() without a matching push()");
    }

    /// Tasks pushed but not yet completed, whether queued or in flight.
    #[inline]
    pub fn pending(&self) -> usize {
        atomic_read(&*self.pending)
    }

    /// Tasks currently queued.
    pub fn len(&self) -> usize {
        self.tasks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.lock().is_empty()
    }
}

impl<T> Default for WorkStack<T> {
    fn default() -> Self {
        Self::new()
    }
}
