//! Bulk loading of validated entries into the staging table

use mark_common::CatalogEntry;
use tracing::info;

use crate::catalog::error::CatalogError;
use crate::catalog::storage::CatalogRepository;

/// Insert `entries` as one atomic batch
#[tracing::instrument(skip(repo, entries), fields(rows = entries.len()))]
pub async fn load(
    repo: &dyn CatalogRepository,
    entries: &[CatalogEntry],
) -> Result<u64, CatalogError> {
    let inserted = repo.insert_batch(entries).await?;
    info!(inserted, "Catalog batch loaded");
    Ok(inserted)
}

/// Empty the staging table
#[tracing::instrument(skip(repo))]
pub async fn clear(repo: &dyn CatalogRepository) -> Result<u64, CatalogError> {
    let removed = repo.clear().await?;
    info!(removed, "Catalog staging table cleared");
    Ok(removed)
}

/// [`clear`] followed by [`load`]
///
/// The two steps are separate transactions. Another upload running at the
/// same time can interleave between them.
pub async fn replace(
    repo: &dyn CatalogRepository,
    entries: &[CatalogEntry],
) -> Result<u64, CatalogError> {
    clear(repo).await?;
    load(repo, entries).await
}
