//! Store error type.
//!
//! Store failures never propagate past the validator/session boundary as
//! panics; the display string is what callers surface.

use thiserror::Error;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("request failed: {0}")]
    Request(String),

    /// Non-2xx response from the REST surface.
    #[error("store returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not match the expected row shape.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        Self::Request(err.to_string())
    }
}
