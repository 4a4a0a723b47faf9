//! Reconciliation check query

use serde::Deserialize;

use crate::catalog::{reconcile, CatalogError, CatalogRepository, DiscrepancyView};

/// `?key=<mode>`; a missing key is reported as an unknown mode
#[derive(Debug, Clone, Deserialize)]
pub struct CheckCatalogQuery {
    #[serde(default)]
    pub key: String,
}

#[tracing::instrument(skip(repo), fields(mode = %query.key))]
pub async fn handle(
    repo: &dyn CatalogRepository,
    query: CheckCatalogQuery,
) -> Result<Vec<DiscrepancyView>, CatalogError> {
    let pairs = reconcile::reconcile(repo, &query.key).await?;
    Ok(pairs.into_iter().map(DiscrepancyView::from).collect())
}
