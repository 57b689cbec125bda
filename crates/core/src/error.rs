//! Unified error types for the access layer.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Canonical message for a code that is absent, expired, or inactive.
///
/// One message covers all three cases so callers cannot probe which codes
/// exist.
pub const INVALID_CODE_MESSAGE: &str = "Invalid, expired, or inactive interview code";

/// Canonical message returned when an identifier is rate limited.
pub const RATE_LIMITED_MESSAGE: &str = "Rate limit exceeded. Try again later.";

/// Message recorded when initialization cannot reach the store.
pub const CONNECT_FAILED_MESSAGE: &str = "Failed to connect to authentication service";

/// Unified error type for the access layer.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{}", INVALID_CODE_MESSAGE)]
    InvalidCode,

    #[error("{}", RATE_LIMITED_MESSAGE)]
    RateLimited,

    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Creates a storage error from any message.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }
}
