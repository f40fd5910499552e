//! Worker Count Policy
//!
//! Every parallel entry point takes a [`ThreadCount`] instead of a bare integer.
//! The wrapper guarantees the count is never zero, so the orchestrators can
//! always spawn at least one worker and never deadlock waiting for nobody.

use std::fmt;
use std::sync::OnceLock;

static HARDWARE_CONCURRENCY: OnceLock<u32> = OnceLock::new();

/// Number of hardware threads reported by the platform.
///
/// Queried once on first use and cached for the life of the process.
/// Falls back to 1 when the platform cannot answer.
pub fn hardware_concurrency() -> u32 {
    *HARDWARE_CONCURRENCY.get_or_init(|| {
        std::thread::available_parallelism()
            .map(|n| u32::try_from(n.get()).unwrap_or(u32::MAX))
            .unwrap_or(1)
    })
}

/// A strictly positive number of worker threads.
///
/// Requests below 2 are treated as a single thread. The default value is
/// the cached [`hardware_concurrency`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThreadCount(u32);

impl ThreadCount {
    /// Single-threaded execution.
    pub const ONE: ThreadCount = ThreadCount(1);

    /// Clamp a raw request into a valid count.
    #[inline]
    pub const fn new(requested: u32) -> Self {
        if requested < 2 {
            ThreadCount(1)
        } else {
            ThreadCount(requested)
        }
    }

    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn is_single(self) -> bool {
        self.0 == 1
    }
}

impl Default for ThreadCount {
    fn default() -> Self {
        ThreadCount::new(hardware_concurrency())
    }
}

impl From<u32> for ThreadCount {
    fn from(requested: u32) -> Self {
        ThreadCount::new(requested)
    }
}

impl From<usize> for ThreadCount {
    fn from(requested: usize) -> Self {
        ThreadCount::new(u32::try_from(requested).unwrap_or(u32::MAX))
    }
}

impl fmt::Display for ThreadCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
