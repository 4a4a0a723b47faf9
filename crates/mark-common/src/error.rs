//! Error types shared across the mark workspace

use thiserror::Error;

/// Result type alias for shared operations
pub type Result<T> = std::result::Result<T, MarkError>;

/// Main error type for the shared entity layer
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MarkError {
    #[error("Unknown product status code: {0}")]
    InvalidStatus(i16),

    #[error("Unknown product status name: {0}")]
    InvalidStatusName(String),
}
