//! Sort configuration: which strategy, how many workers, and when to stay
//! sequential.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::thread_count::ThreadCount;

/// Slices shorter than this are sorted on the calling thread.
pub const DEFAULT_SEQUENTIAL_THRESHOLD: usize = 1 << 16;

/// Environment variable naming the strategy.
pub const STRATEGY_ENV: &str = "PARALLEL_SORT_STRATEGY";
/// Environment variable holding the worker count.
pub const THREADS_ENV: &str = "PARALLEL_SORT_THREADS";

/// Parallel sorting algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strategy {
    /// Quicksort partitions distributed over a shared work stack.
    #[default]
    Introsort,
    /// Splitter sampling and bucketing, then buckets sorted in parallel.
    /// Scales with explicit thread counts beyond the core count.
    SampleSort,
}

impl Strategy {
    pub const ALL: [Strategy; 2] = [Strategy::Introsort, Strategy::SampleSort];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::Introsort => "introsort",
            Strategy::SampleSort => "sample",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "introsort" | "intro" | "parallel-introsort" => Ok(Strategy::Introsort),
            "sample" | "samplesort" | "sample-sort" | "sample_sort" => Ok(Strategy::SampleSort),
            _ => Err(ConfigError::UnknownStrategy(s.to_string())),
        }
    }
}

/// Everything a parallel sort call needs besides the data and the predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortConfig {
    pub strategy: Strategy,
    pub threads: ThreadCount,
    pub sequential_threshold: usize,
}

impl Default for SortConfig {
    fn default() -> Self {
        SortConfig {
            strategy: Strategy::default(),
            threads: ThreadCount::default(),
            sequential_threshold: DEFAULT_SEQUENTIAL_THRESHOLD,
        }
    }
}

impl SortConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_threads(mut self, threads: impl Into<ThreadCount>) -> Self {
        self.threads = threads.into();
        self
    }

    /// Below `threshold` elements no worker threads are spawned.
    pub fn with_sequential_threshold(mut self, threshold: usize) -> Self {
        self.sequential_threshold = threshold;
        self
    }

    /// Build a config from [`STRATEGY_ENV`] and [`THREADS_ENV`].
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with a caller-supplied variable lookup.
    pub fn from_lookup<L>(lookup: L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let mut config = SortConfig::default();

        if let Some(strategy) = lookup(STRATEGY_ENV) {
            config.strategy = strategy.parse()?;
        }
        if let Some(threads) = lookup(THREADS_ENV) {
            let requested = threads
                .trim()
                .parse::<u32>()
                .map_err(|source| ConfigError::InvalidThreadCount {
                    value: threads.clone(),
                    source,
                })?;
            config.threads = ThreadCount::new(requested);
        }

        Ok(config)
    }
}
