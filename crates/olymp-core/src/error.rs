//! Error types for the Olymp core.

use thiserror::Error;

/// Errors raised by pure core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("payload too large: {size} bytes exceeds limit of {limit}")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("invalid uid: {0}")]
    InvalidUid(String),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("unknown entry status: {0}")]
    UnknownStatus(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
