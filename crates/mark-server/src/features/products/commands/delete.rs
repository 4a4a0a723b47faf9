//! Delete ledger product command

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteProductCommand {
    pub business_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteProductResponse {
    pub business_key: String,
    pub deleted: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteProductError {
    #[error("Business key is required and cannot be empty")]
    BusinessKeyRequired,

    #[error("Product with business key '{0}' not found")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl DeleteProductCommand {
    pub fn validate(&self) -> Result<(), DeleteProductError> {
        if self.business_key.trim().is_empty() {
            return Err(DeleteProductError::BusinessKeyRequired);
        }
        Ok(())
    }
}

#[tracing::instrument(skip(pool), fields(business_key = %command.business_key))]
pub async fn handle(
    pool: PgPool,
    command: DeleteProductCommand,
) -> Result<DeleteProductResponse, DeleteProductError> {
    command.validate()?;

    let result = sqlx::query("DELETE FROM ledger_products WHERE business_key = $1")
        .bind(&command.business_key)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DeleteProductError::NotFound(command.business_key));
    }

    tracing::info!("Ledger product deleted");

    Ok(DeleteProductResponse {
        business_key: command.business_key,
        deleted: true,
    })
}
