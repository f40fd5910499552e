use std::num::ParseIntError;

/// Errors raised while building a [`SortConfig`](crate::SortConfig) from text.
///
/// Sorting itself never fails; only configuration parsing does.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown sort strategy '{0}' (expected 'introsort' or 'sample')")]
    UnknownStrategy(String),
    #[error("invalid thread count '{value}': {source}")]
    InvalidThreadCount {
        value: String,
        #[source]
        source: ParseIntError,
    },
}
