//! Create ledger product command
//!
//! Records the first receipt of a marked unit. Both the business key and the
//! product name are unique across the ledger.

use chrono::NaiveDate;
use mark_common::{LedgerProduct, ProductStatus};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::db::rows::{ledger_from_row, LEDGER_COLUMNS};
use crate::features::shared::error_helpers::{
    unique_violation_constraint, LEDGER_KEY_CONSTRAINT, LEDGER_NAME_CONSTRAINT,
};
use crate::features::shared::validation::{validate_text, TextValidationError, MAX_TEXT_LENGTH};

/// Command to create a ledger product
///
/// # Examples
///
/// ```rust,ignore
/// let command = CreateProductCommand {
///     business_key: "010460000000001721ABC".to_string(),
///     name: "Кроссовки беговые, 42".to_string(),
///     received_doc: "УПД-118".to_string(),
///     ..CreateProductCommand::default()
/// };
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateProductCommand {
    pub business_key: String,
    pub name: String,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_code: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_code: Option<i64>,
    #[serde(default)]
    pub mark_code: String,
    pub received_doc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_doc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_date: Option<NaiveDate>,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateProductError {
    #[error("Validation failed: {0}")]
    Validation(#[from] TextValidationError),

    #[error("Product with business key '{0}' already exists")]
    DuplicateKey(String),

    #[error("Product named '{0}' already exists")]
    DuplicateName(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl CreateProductCommand {
    /// Validates the command parameters
    ///
    /// Business key, name and receipt document are required; every text
    /// field is limited to 256 characters.
    pub fn validate(&self) -> Result<(), CreateProductError> {
        validate_text("business_key", &self.business_key, MAX_TEXT_LENGTH)?;
        validate_text("name", &self.name, MAX_TEXT_LENGTH)?;
        validate_text("received_doc", &self.received_doc, MAX_TEXT_LENGTH)?;

        if self.mark_code.chars().count() > MAX_TEXT_LENGTH {
            return Err(TextValidationError::TooLong {
                field: "mark_code",
                max_length: MAX_TEXT_LENGTH,
            }
            .into());
        }
        if let Some(ref issued_doc) = self.issued_doc {
            validate_text("issued_doc", issued_doc, MAX_TEXT_LENGTH)?;
        }

        Ok(())
    }
}

/// Insert the product and return the stored row
///
/// # Errors
///
/// - `Validation` if a field is blank or too long
/// - `DuplicateKey` / `DuplicateName` on a unique constraint violation
/// - `Database` for any other storage failure
#[tracing::instrument(
    skip(pool, command),
    fields(business_key = %command.business_key, status = %command.status)
)]
pub async fn handle(
    pool: PgPool,
    command: CreateProductCommand,
) -> Result<LedgerProduct, CreateProductError> {
    command.validate()?;

    let sql = format!(
        r#"
        INSERT INTO ledger_products (
            business_key, name, status, work_code, external_code, mark_code,
            received_doc, received_date, issued_doc, issued_date
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING {}
        "#,
        LEDGER_COLUMNS.join(", ")
    );

    let row = sqlx::query(&sql)
        .bind(&command.business_key)
        .bind(&command.name)
        .bind(command.status.code())
        .bind(command.work_code)
        .bind(command.external_code)
        .bind(&command.mark_code)
        .bind(&command.received_doc)
        .bind(command.received_date)
        .bind(&command.issued_doc)
        .bind(command.issued_date)
        .fetch_one(&pool)
        .await
        .map_err(|e| {
            let constraint = unique_violation_constraint(&e).map(str::to_owned);
            match constraint.as_deref() {
                Some(LEDGER_KEY_CONSTRAINT) => {
                    CreateProductError::DuplicateKey(command.business_key.clone())
                },
                Some(LEDGER_NAME_CONSTRAINT) => {
                    CreateProductError::DuplicateName(command.name.clone())
                },
                _ => CreateProductError::Database(e),
            }
        })?;

    let product = ledger_from_row(&row, "")?;

    tracing::info!(product_id = %product.id, "Ledger product created");

    Ok(product)
}
