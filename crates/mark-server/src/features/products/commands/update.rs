//! Update ledger product command
//!
//! Partially updates a product. Fields left out of the request keep their
//! stored value; the business key itself cannot change.

use chrono::NaiveDate;
use mark_common::{LedgerProduct, ProductStatus};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::db::rows::{ledger_from_row, LEDGER_COLUMNS};
use crate::features::shared::error_helpers::is_unique_violation;
use crate::features::shared::validation::{validate_text, TextValidationError, MAX_TEXT_LENGTH};

/// Command to update a ledger product
///
/// `business_key` comes from the request path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProductCommand {
    #[serde(default, skip_serializing)]
    pub business_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProductStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_code: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_code: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mark_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_doc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_doc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_date: Option<NaiveDate>,
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateProductError {
    #[error("Business key is required and cannot be empty")]
    BusinessKeyRequired,

    #[error("At least one field must be provided for update")]
    NoFieldsToUpdate,

    #[error("Validation failed: {0}")]
    Validation(#[from] TextValidationError),

    #[error("Product with business key '{0}' not found")]
    NotFound(String),

    #[error("Product named '{0}' already exists")]
    DuplicateName(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl UpdateProductCommand {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.status.is_none()
            && self.work_code.is_none()
            && self.external_code.is_none()
            && self.mark_code.is_none()
            && self.received_doc.is_none()
            && self.received_date.is_none()
            && self.issued_doc.is_none()
            && self.issued_date.is_none()
    }

    /// Validates the command parameters
    ///
    /// # Errors
    ///
    /// - `BusinessKeyRequired` - Path key is blank
    /// - `NoFieldsToUpdate` - Nothing to change
    /// - `Validation` - A provided text field is blank or too long
    pub fn validate(&self) -> Result<(), UpdateProductError> {
        if self.business_key.trim().is_empty() {
            return Err(UpdateProductError::BusinessKeyRequired);
        }
        if self.is_empty() {
            return Err(UpdateProductError::NoFieldsToUpdate);
        }
        if let Some(ref name) = self.name {
            validate_text("name", name, MAX_TEXT_LENGTH)?;
        }
        if let Some(ref received_doc) = self.received_doc {
            validate_text("received_doc", received_doc, MAX_TEXT_LENGTH)?;
        }
        if let Some(ref issued_doc) = self.issued_doc {
            validate_text("issued_doc", issued_doc, MAX_TEXT_LENGTH)?;
        }
        if let Some(ref mark_code) = self.mark_code {
            if mark_code.chars().count() > MAX_TEXT_LENGTH {
                return Err(TextValidationError::TooLong {
                    field: "mark_code",
                    max_length: MAX_TEXT_LENGTH,
                }
                .into());
            }
        }
        Ok(())
    }
}

/// Apply the provided fields and return the updated row
#[tracing::instrument(skip(pool, command), fields(business_key = %command.business_key))]
pub async fn handle(
    pool: PgPool,
    command: UpdateProductCommand,
) -> Result<LedgerProduct, UpdateProductError> {
    command.validate()?;

    let sql = format!(
        r#"
        UPDATE ledger_products
        SET name = COALESCE($2, name),
            status = COALESCE($3, status),
            work_code = COALESCE($4, work_code),
            external_code = COALESCE($5, external_code),
            mark_code = COALESCE($6, mark_code),
            received_doc = COALESCE($7, received_doc),
            received_date = COALESCE($8, received_date),
            issued_doc = COALESCE($9, issued_doc),
            issued_date = COALESCE($10, issued_date),
            updated_at = NOW()
        WHERE business_key = $1
        RETURNING {}
        "#,
        LEDGER_COLUMNS.join(", ")
    );

    let row = sqlx::query(&sql)
        .bind(&command.business_key)
        .bind(&command.name)
        .bind(command.status.map(ProductStatus::code))
        .bind(command.work_code)
        .bind(command.external_code)
        .bind(&command.mark_code)
        .bind(&command.received_doc)
        .bind(command.received_date)
        .bind(&command.issued_doc)
        .bind(command.issued_date)
        .fetch_optional(&pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                UpdateProductError::DuplicateName(command.name.clone().unwrap_or_default())
            } else {
                UpdateProductError::Database(e)
            }
        })?
        .ok_or_else(|| UpdateProductError::NotFound(command.business_key.clone()))?;

    let product = ledger_from_row(&row, "")?;

    tracing::info!(status = %product.status, "Ledger product updated");

    Ok(product)
}
