//! Error types for the Olymp facade.

use olymp_core::CoreError;
use olymp_store::StoreError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur during Olymp operations.
#[derive(Debug, Error)]
pub enum OlympError {
    /// The serialized write exceeds the payload ceiling. Nothing was written.
    #[error("payload too large: {size} bytes exceeds limit of {limit}")]
    PayloadTooLarge { size: usize, limit: usize },

    /// Resource or entry not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Secret lookup failed, whatever the cause.
    #[error("unauthorized")]
    Unauthorized,

    /// The target entry cannot be revised or deleted.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Input could not be decoded.
    #[error("malformed input: {0}")]
    Malformed(String),

    /// Fresh identifiers kept colliding with stored ones.
    #[error("identifier collision after {0} attempts")]
    IdCollision(usize),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl From<CoreError> for OlympError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::PayloadTooLarge { size, limit } => OlympError::PayloadTooLarge { size, limit },
            other => OlympError::Malformed(other.to_string()),
        }
    }
}

/// Result type for Olymp operations.
pub type Result<T> = std::result::Result<T, OlympError>;
