//! Get ledger product query

use mark_common::LedgerProduct;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::db::rows::{ledger_from_row, LEDGER_COLUMNS};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetProductQuery {
    pub business_key: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GetProductError {
    #[error("Business key is required and cannot be empty")]
    BusinessKeyRequired,

    #[error("Product with business key '{0}' not found")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl GetProductQuery {
    pub fn validate(&self) -> Result<(), GetProductError> {
        if self.business_key.trim().is_empty() {
            return Err(GetProductError::BusinessKeyRequired);
        }
        Ok(())
    }
}

#[tracing::instrument(skip(pool), fields(business_key = %query.business_key))]
pub async fn handle(pool: PgPool, query: GetProductQuery) -> Result<LedgerProduct, GetProductError> {
    query.validate()?;

    let sql = format!(
        "SELECT {} FROM ledger_products WHERE business_key = $1",
        LEDGER_COLUMNS.join(", ")
    );

    let row = sqlx::query(&sql)
        .bind(&query.business_key)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| GetProductError::NotFound(query.business_key.clone()))?;

    Ok(ledger_from_row(&row, "")?)
}
