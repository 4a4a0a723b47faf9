//! Shared validation utilities
//!
//! ```rust,ignore
//! use mark_server::features::shared::validation::validate_text;
//!
//! validate_text("name", &command.name, MAX_TEXT_LENGTH)?;
//! ```

use thiserror::Error;

/// Length limit for free-text ledger columns
pub const MAX_TEXT_LENGTH: usize = 256;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TextValidationError {
    #[error("{field} is required and cannot be empty")]
    Required { field: &'static str },

    #[error("{field} must be between 1 and {max_length} characters")]
    TooLong {
        field: &'static str,
        max_length: usize,
    },
}

/// Validate a required text field
///
/// Blank (whitespace-only) values count as empty. Length is measured in
/// characters, not bytes, since ledger names are mostly Cyrillic.
pub fn validate_text(
    field: &'static str,
    value: &str,
    max_length: usize,
) -> Result<(), TextValidationError> {
    if value.trim().is_empty() {
        return Err(TextValidationError::Required { field });
    }

    if value.chars().count() > max_length {
        return Err(TextValidationError::TooLong { field, max_length });
    }

    Ok(())
}
