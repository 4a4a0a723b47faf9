//! End-to-end ingestion and reconciliation against the in-memory repository

use mark_common::ProductStatus;
use mark_server::catalog::normalizer::CsvLayout;
use mark_server::catalog::reconcile::reconcile;
use mark_server::catalog::taxonomy::StorageFailureKind;
use mark_server::catalog::{CatalogError, CatalogRepository, MemoryCatalogRepository};
use mark_server::features::catalog::commands::{clear, upload};
use mark_server::features::catalog::{ClearCatalogCommand, UploadCatalogCommand};

mod common;
use common::{extract, ledger_product, registry_zip, row, zip_archive};

fn upload_command(data: Vec<u8>) -> UploadCatalogCommand {
    UploadCatalogCommand {
        filename: "registry.zip".to_string(),
        data,
        replace: false,
    }
}

async fn ingest(
    repo: &MemoryCatalogRepository,
    data: Vec<u8>,
) -> Result<upload::UploadCatalogResponse, CatalogError> {
    upload::handle(repo, CsvLayout::default(), upload_command(data)).await
}

fn keys(pairs: &[mark_server::catalog::Discrepancy], external: bool) -> Vec<String> {
    let mut keys: Vec<String> = pairs
        .iter()
        .filter_map(|p| {
            if external {
                p.external.as_ref().map(|e| e.business_key.clone())
            } else {
                p.ledger.as_ref().map(|l| l.business_key.clone())
            }
        })
        .collect();
    keys.sort();
    keys
}

#[tokio::test]
async fn test_upload_loads_every_row() {
    let repo = MemoryCatalogRepository::new();

    let response = ingest(&repo, registry_zip(&["K1", "K2", "K3"])).await.unwrap();
    assert_eq!(response.status, "success");
    assert_eq!(response.processed, 3);

    let staged = repo.catalog();
    assert_eq!(staged.len(), 3);
    assert_eq!(staged[0].name, "Товар K1");
    assert_eq!(staged[0].registered_date.to_string(), "2024-03-01");
}

#[tokio::test]
async fn test_malformed_rows_are_skipped_not_fatal() {
    let repo = MemoryCatalogRepository::new();
    let data = extract(&[row("K1"), "K2,too,few".to_string(), row("K3")]);

    let response = ingest(&repo, zip_archive(&[("registry.csv", data.as_slice())]))
        .await
        .unwrap();
    assert_eq!(response.processed, 2);
}

#[tokio::test]
async fn test_bad_date_rejects_whole_batch() {
    let repo = MemoryCatalogRepository::new();
    let bad = row("K2").replace("2024-03-01T10:15:00Z", "01.03.2024");
    let data = extract(&[row("K1"), bad]);

    let err = ingest(&repo, zip_archive(&[("registry.csv", data.as_slice())]))
        .await
        .unwrap_err();
    match err {
        CatalogError::DateFormat { line, value } => {
            assert_eq!(line, 4);
            assert_eq!(value, "01.03.2024");
        },
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(repo.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_empty_date_fails_validation() {
    let repo = MemoryCatalogRepository::new();
    let blank = row("K1").replace("2024-03-01T10:15:00Z", "");
    let data = extract(&[blank]);

    let err = ingest(&repo, zip_archive(&[("registry.csv", data.as_slice())]))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Validation(ref v) if v.reason == "must be a date"));
    assert_eq!(repo.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_archive_errors() {
    let repo = MemoryCatalogRepository::new();

    let err = upload::handle(
        &repo,
        CsvLayout::default(),
        UploadCatalogCommand {
            filename: "registry.csv".to_string(),
            data: extract(&[row("K1")]),
            replace: false,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CatalogError::InvalidArchive(_)));

    let err = ingest(&repo, zip_archive(&[("readme.txt", &b"nothing here"[..])]))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::NoTabularPayload));

    let err = ingest(&repo, b"PK\x03\x04 definitely not a zip".to_vec())
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::InvalidArchive(_)));
}

#[tokio::test]
async fn test_first_csv_entry_wins() {
    let repo = MemoryCatalogRepository::new();
    let first = common::extract_for(&["A1"]);
    let second = common::extract_for(&["B1", "B2"]);

    let response = ingest(
        &repo,
        zip_archive(&[("notes.txt", &b"-"[..]), ("a.csv", first.as_slice()), ("b.csv", second.as_slice())]),
    )
    .await
    .unwrap();
    assert_eq!(response.processed, 1);
    assert_eq!(repo.catalog()[0].business_key, "A1");
}

#[tokio::test]
async fn test_duplicate_keys_conflict_and_leave_table_unchanged() {
    let repo = MemoryCatalogRepository::new();
    ingest(&repo, registry_zip(&["K1"])).await.unwrap();

    let err = ingest(&repo, registry_zip(&["K2", "K1"])).await.unwrap_err();
    assert!(matches!(err, CatalogError::Conflict(_)));
    assert_eq!(repo.count().await.unwrap(), 1);

    let err = ingest(&repo, registry_zip(&["K5", "K5"])).await.unwrap_err();
    assert!(matches!(err, CatalogError::Conflict(_)));
    assert_eq!(repo.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_replace_and_clear() {
    let repo = MemoryCatalogRepository::new();
    ingest(&repo, registry_zip(&["K1", "K2"])).await.unwrap();

    let response = upload::handle(
        &repo,
        CsvLayout::default(),
        UploadCatalogCommand {
            replace: true,
            ..upload_command(registry_zip(&["K1"]))
        },
    )
    .await
    .unwrap();
    assert_eq!(response.processed, 1);
    assert_eq!(repo.count().await.unwrap(), 1);

    let cleared = clear::handle(&repo, ClearCatalogCommand).await.unwrap();
    assert_eq!(cleared.removed, 1);
    assert_eq!(repo.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_storage_outage_maps_to_unavailable() {
    let repo = MemoryCatalogRepository::new();
    repo.fail_next(StorageFailureKind::ConnectionFailure);

    let err = ingest(&repo, registry_zip(&["K1"])).await.unwrap_err();
    assert!(matches!(err, CatalogError::Unavailable(_)));
    assert_eq!(err.status(), axum::http::StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_reconciliation_modes() {
    let repo = MemoryCatalogRepository::new();
    repo.insert_ledger(ledger_product("ON", ProductStatus::OnBalance));
    repo.insert_ledger(ledger_product("GONE", ProductStatus::Deducted));
    repo.insert_ledger(ledger_product("NEW", ProductStatus::NotDefined));
    repo.insert_ledger(ledger_product("EXT", ProductStatus::InExternalDeducted));
    repo.insert_ledger(ledger_product("BOTH", ProductStatus::OnBalance));
    repo.insert_ledger(ledger_product("STALE", ProductStatus::Deducted));

    ingest(&repo, registry_zip(&["BOTH", "STALE", "NEW", "ONLY_EXT"]))
        .await
        .unwrap();

    let missing = reconcile(&repo, "ledger_missing_external").await.unwrap();
    assert_eq!(keys(&missing, false), ["EXT", "ON"]);
    assert!(missing.iter().all(|p| p.external.is_none()));

    let external = reconcile(&repo, "external_missing_ledger").await.unwrap();
    assert_eq!(keys(&external, true), ["ONLY_EXT"]);
    assert!(external.iter().all(|p| p.ledger.is_none()));

    let stale = reconcile(&repo, "ledger_stale_external_present").await.unwrap();
    assert_eq!(keys(&stale, false), ["NEW", "STALE"]);
    assert_eq!(keys(&stale, true), ["NEW", "STALE"]);

    let err = reconcile(&repo, "everything").await.unwrap_err();
    assert!(matches!(err, CatalogError::InvalidMode(ref key) if key == "everything"));
}

#[tokio::test]
async fn test_reconciliation_on_empty_tables() {
    let repo = MemoryCatalogRepository::new();
    for mode in [
        "ledger_missing_external",
        "external_missing_ledger",
        "ledger_stale_external_present",
    ] {
        assert!(reconcile(&repo, mode).await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_key_moves_between_missing_modes() {
    let repo = MemoryCatalogRepository::new();
    repo.insert_ledger(ledger_product("ABC123", ProductStatus::OnBalance));

    let missing = reconcile(&repo, "ledger_missing_external").await.unwrap();
    assert_eq!(keys(&missing, false), ["ABC123"]);

    ingest(&repo, registry_zip(&["ABC123", "XYZ789"])).await.unwrap();

    let missing = reconcile(&repo, "ledger_missing_external").await.unwrap();
    assert!(missing.is_empty());

    let external = reconcile(&repo, "external_missing_ledger").await.unwrap();
    assert_eq!(keys(&external, true), ["XYZ789"]);

    clear::handle(&repo, ClearCatalogCommand).await.unwrap();
    let missing = reconcile(&repo, "ledger_missing_external").await.unwrap();
    assert_eq!(keys(&missing, false), ["ABC123"]);
}
