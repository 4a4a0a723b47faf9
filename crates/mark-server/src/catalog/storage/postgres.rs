//! PostgreSQL catalog repository
//!
//! Writes go through one transaction per call. A batch larger than the
//! configured chunk size becomes several `INSERT ... VALUES` statements
//! inside that same transaction, so the bind-parameter limit is never hit
//! and the batch still commits or rolls back as a whole.

use async_trait::async_trait;
use mark_common::CatalogEntry;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use tracing::{debug, warn};

use super::CatalogRepository;
use crate::catalog::reconcile::{Discrepancy, ReconcileMode, StatusFilter};
use crate::catalog::taxonomy::StorageFailure;
use crate::config::DEFAULT_INGEST_INSERT_CHUNK_SIZE;
use crate::db::rows::{catalog_from_row, ledger_from_row, select_list, CATALOG_COLUMNS, LEDGER_COLUMNS};

#[derive(Debug, Clone)]
pub struct PgCatalogRepository {
    pool: PgPool,
    chunk_size: usize,
}

impl PgCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            chunk_size: DEFAULT_INGEST_INSERT_CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }
}

async fn rollback(tx: Transaction<'_, Postgres>) {
    if let Err(e) = tx.rollback().await {
        warn!(error = %e, "Rollback failed; connection will be discarded");
    }
}

async fn insert_chunk(
    tx: &mut Transaction<'_, Postgres>,
    chunk: &[CatalogEntry],
) -> Result<u64, sqlx::Error> {
    let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new(
        r#"
        INSERT INTO catalog_entries (
            business_key,
            external_code,
            customs_code,
            supplier_tax_id,
            name,
            brand,
            supplier_name,
            registered_date
        )
        "#,
    );

    query_builder.push_values(chunk, |mut b, entry| {
        b.push_bind(&entry.business_key)
            .push_bind(&entry.external_code)
            .push_bind(&entry.customs_code)
            .push_bind(&entry.supplier_tax_id)
            .push_bind(&entry.name)
            .push_bind(&entry.brand)
            .push_bind(&entry.supplier_name)
            .push_bind(entry.registered_date);
    });

    let result = query_builder.build().execute(&mut **tx).await?;
    Ok(result.rows_affected())
}

fn status_clause(filter: StatusFilter) -> &'static str {
    match filter {
        StatusFilter::Any => "TRUE",
        StatusFilter::Include(_) => "l.status = ANY($1)",
        StatusFilter::Exclude(_) => "NOT (l.status = ANY($1))",
    }
}

fn reconcile_sql(mode: ReconcileMode) -> String {
    let ledger = select_list(&LEDGER_COLUMNS, "l", "l_");
    let catalog = select_list(&CATALOG_COLUMNS, "c", "c_");
    let status = status_clause(mode.status_filter());

    match mode {
        ReconcileMode::LedgerMissingExternal => format!(
            "SELECT {ledger} FROM ledger_products l \
             LEFT JOIN catalog_entries c ON c.business_key = l.business_key \
             WHERE c.business_key IS NULL AND {status}"
        ),
        ReconcileMode::ExternalMissingLedger => format!(
            "SELECT {catalog} FROM catalog_entries c \
             LEFT JOIN ledger_products l ON l.business_key = c.business_key \
             WHERE l.business_key IS NULL"
        ),
        ReconcileMode::LedgerStaleExternalPresent => format!(
            "SELECT {ledger}, {catalog} FROM ledger_products l \
             JOIN catalog_entries c ON c.business_key = l.business_key \
             WHERE {status}"
        ),
    }
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    async fn insert_batch(&self, entries: &[CatalogEntry]) -> Result<u64, StorageFailure> {
        if entries.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let total_chunks = entries.len().div_ceil(self.chunk_size);
        let mut inserted = 0;

        for (chunk_idx, chunk) in entries.chunks(self.chunk_size).enumerate() {
            debug!(
                chunk = chunk_idx + 1,
                total_chunks,
                rows = chunk.len(),
                "Inserting catalog chunk"
            );

            match insert_chunk(&mut tx, chunk).await {
                Ok(rows) => inserted += rows,
                Err(e) => {
                    rollback(tx).await;
                    return Err(e.into());
                },
            }
        }

        tx.commit().await?;
        Ok(inserted)
    }

    async fn clear(&self) -> Result<u64, StorageFailure> {
        let mut tx = self.pool.begin().await?;

        match sqlx::query("DELETE FROM catalog_entries")
            .execute(&mut *tx)
            .await
        {
            Ok(result) => {
                tx.commit().await?;
                Ok(result.rows_affected())
            },
            Err(e) => {
                rollback(tx).await;
                Err(e.into())
            },
        }
    }

    async fn count(&self) -> Result<i64, StorageFailure> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM catalog_entries")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn reconcile(&self, mode: ReconcileMode) -> Result<Vec<Discrepancy>, StorageFailure> {
        let sql = reconcile_sql(mode);
        let mut query = sqlx::query(&sql);
        if mode.status_filter() != StatusFilter::Any {
            query = query.bind(mode.status_filter().codes());
        }

        let rows = query.fetch_all(&self.pool).await?;

        let pairs = rows
            .iter()
            .map(|row| {
                let pair = match mode {
                    ReconcileMode::LedgerMissingExternal => Discrepancy {
                        ledger: Some(ledger_from_row(row, "l_")?),
                        external: None,
                    },
                    ReconcileMode::ExternalMissingLedger => Discrepancy {
                        ledger: None,
                        external: Some(catalog_from_row(row, "c_")?),
                    },
                    ReconcileMode::LedgerStaleExternalPresent => Discrepancy {
                        ledger: Some(ledger_from_row(row, "l_")?),
                        external: Some(catalog_from_row(row, "c_")?),
                    },
                };
                Ok(pair)
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        Ok(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconcile_sql_shapes() {
        let missing = reconcile_sql(ReconcileMode::LedgerMissingExternal);
        assert!(missing.contains("LEFT JOIN catalog_entries c"));
        assert!(missing.contains("NOT (l.status = ANY($1))"));

        let external = reconcile_sql(ReconcileMode::ExternalMissingLedger);
        assert!(external.contains("WHERE l.business_key IS NULL"));
        assert!(!external.contains("$1"));

        let stale = reconcile_sql(ReconcileMode::LedgerStaleExternalPresent);
        assert!(stale.contains("JOIN catalog_entries c"));
        assert!(stale.contains("l.status = ANY($1)"));
        assert!(stale.contains("c.name AS c_name"));
        assert!(!stale.contains("ORDER BY"));
    }
}
