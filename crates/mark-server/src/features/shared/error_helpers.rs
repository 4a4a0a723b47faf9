//! Database error handling utilities
//!
//! ```rust,ignore
//! use mark_server::features::shared::error_helpers::unique_violation_constraint;
//!
//! .map_err(|e| match unique_violation_constraint(&e) {
//!     Some(NAME_CONSTRAINT) => CreateProductError::DuplicateName(name.clone()),
//!     _ => CreateProductError::Database(e),
//! })?;
//! ```

use sqlx::Error as SqlxError;

/// Unique constraint on `ledger_products.business_key`
pub const LEDGER_KEY_CONSTRAINT: &str = "ledger_products_business_key_unique";

/// Unique constraint on `ledger_products.name`
pub const LEDGER_NAME_CONSTRAINT: &str = "ledger_products_name_unique";

/// Check if the error is a unique constraint violation
pub fn is_unique_violation(error: &SqlxError) -> bool {
    if let SqlxError::Database(db_err) = error {
        return db_err.is_unique_violation();
    }
    false
}

/// Name of the violated unique constraint, if that is what `error` is
pub fn unique_violation_constraint(error: &SqlxError) -> Option<&str> {
    match error {
        SqlxError::Database(db_err) if db_err.is_unique_violation() => db_err.constraint(),
        _ => None,
    }
}
