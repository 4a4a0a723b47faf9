//! PostgreSQL repository tests
//!
//! Run with `DATABASE_URL` pointing at a scratch server and `--ignored`.

use mark_common::ProductStatus;
use mark_server::catalog::reconcile::reconcile;
use mark_server::catalog::taxonomy::StorageFailureKind;
use mark_server::catalog::{CatalogRepository, PgCatalogRepository};
use sqlx::PgPool;

mod common;

fn entries(keys: &[&str]) -> Vec<mark_common::CatalogEntry> {
    keys.iter()
        .map(|key| mark_common::CatalogEntry {
            business_key: key.to_string(),
            external_code: "04601234567890".to_string(),
            customs_code: "6404110000".to_string(),
            supplier_tax_id: "7701234567".to_string(),
            name: format!("Товар {}", key),
            brand: "Бренд".to_string(),
            supplier_name: "ООО Фабрика".to_string(),
            registered_date: chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        })
        .collect()
}

async fn seed_ledger(pool: &PgPool, key: &str, status: ProductStatus) -> sqlx::Result<()> {
    let product = common::ledger_product(key, status);
    sqlx::query(
        "INSERT INTO ledger_products (business_key, name, status, mark_code, received_doc) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(&product.business_key)
    .bind(&product.name)
    .bind(product.status.code())
    .bind(&product.mark_code)
    .bind(&product.received_doc)
    .execute(pool)
    .await?;
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a PostgreSQL database (DATABASE_URL)"]
async fn test_chunked_insert_is_atomic(pool: PgPool) -> sqlx::Result<()> {
    let repo = PgCatalogRepository::new(pool).with_chunk_size(2);

    assert_eq!(repo.insert_batch(&entries(&["A", "B", "C"])).await.unwrap(), 3);

    // Duplicate sits in the last chunk; earlier chunks must roll back too
    let err = repo
        .insert_batch(&entries(&["D", "E", "F", "A"]))
        .await
        .unwrap_err();
    assert_eq!(err.kind, StorageFailureKind::IntegrityViolation);
    assert_eq!(repo.count().await.unwrap(), 3);

    assert_eq!(repo.clear().await.unwrap(), 3);
    assert_eq!(repo.count().await.unwrap(), 0);
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a PostgreSQL database (DATABASE_URL)"]
async fn test_reconcile_modes(pool: PgPool) -> sqlx::Result<()> {
    seed_ledger(&pool, "ON", ProductStatus::OnBalance).await?;
    seed_ledger(&pool, "GONE", ProductStatus::Deducted).await?;
    seed_ledger(&pool, "NEW", ProductStatus::NotDefined).await?;
    seed_ledger(&pool, "STALE", ProductStatus::Deducted).await?;

    let repo = PgCatalogRepository::new(pool);
    repo.insert_batch(&entries(&["NEW", "STALE", "ONLY_EXT"]))
        .await
        .unwrap();

    let missing = reconcile(&repo, "ledger_missing_external").await.unwrap();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].ledger.as_ref().unwrap().business_key, "ON");

    let external = reconcile(&repo, "external_missing_ledger").await.unwrap();
    assert_eq!(external.len(), 1);
    assert_eq!(external[0].external.as_ref().unwrap().name, "Товар ONLY_EXT");

    let mut stale: Vec<String> = reconcile(&repo, "ledger_stale_external_present")
        .await
        .unwrap()
        .into_iter()
        .filter_map(|pair| pair.ledger.map(|l| l.business_key))
        .collect();
    stale.sort();
    assert_eq!(stale, ["NEW", "STALE"]);
    Ok(())
}
