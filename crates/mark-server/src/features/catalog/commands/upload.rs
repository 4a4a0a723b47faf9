//! Upload catalog command
//!
//! Runs the whole write path for one uploaded archive: extract the table,
//! normalize it on the blocking pool, validate every record, then load the
//! batch. Any failure leaves the staging table as it was before the call
//! (or, with `replace`, empty if the failure came after the clear).

use serde::Serialize;

use crate::catalog::normalizer::{self, CsvLayout};
use crate::catalog::{archive, loader, validator, CatalogError, CatalogRepository};

#[derive(Debug, Clone)]
pub struct UploadCatalogCommand {
    /// Client-side filename of the archive
    pub filename: String,
    pub data: Vec<u8>,
    /// Empty the staging table before loading
    pub replace: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadCatalogResponse {
    pub status: &'static str,
    pub processed: u64,
}

#[tracing::instrument(
    skip(repo, layout, command),
    fields(filename = %command.filename, size = command.data.len(), replace = command.replace)
)]
pub async fn handle(
    repo: &dyn CatalogRepository,
    layout: CsvLayout,
    command: UploadCatalogCommand,
) -> Result<UploadCatalogResponse, CatalogError> {
    let payload = archive::extract_table(&command.filename, &command.data)?;
    drop(command.data);

    tracing::debug!(entry = %payload.name, "Normalizing catalog table");
    let table = normalizer::normalize_blocking(payload.bytes, layout).await?;

    let entries = validator::validate(table.records)?;

    let processed = if command.replace {
        loader::replace(repo, &entries).await?
    } else {
        loader::load(repo, &entries).await?
    };

    tracing::info!(processed, skipped = table.skipped, "Catalog archive ingested");

    Ok(UploadCatalogResponse {
        status: "success",
        processed,
    })
}
