use thiserror::Error;

/// Errors raised while registering or looking up forks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForkError {
    /// Title is empty or contains the key separator.
    #[error("Invalid fork title {0:?}: must be non-empty and contain no '-'")]
    InvalidTitle(String),

    #[error("Fork name must not be empty")]
    EmptyForkName,

    /// Lookup key is empty or has an empty half.
    #[error("Invalid fork key {0:?}")]
    InvalidKey(String),

    /// Fork configuration could not be parsed.
    #[error("Failed to parse fork config: {0}")]
    Parse(String),
}
