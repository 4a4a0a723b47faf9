//! Clear catalog command

use serde::Serialize;

use crate::catalog::{loader, CatalogError, CatalogRepository};

#[derive(Debug, Clone, Copy, Default)]
pub struct ClearCatalogCommand;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClearCatalogResponse {
    pub status: &'static str,
    pub removed: u64,
}

pub async fn handle(
    repo: &dyn CatalogRepository,
    _command: ClearCatalogCommand,
) -> Result<ClearCatalogResponse, CatalogError> {
    let removed = loader::clear(repo).await?;
    Ok(ClearCatalogResponse {
        status: "success",
        removed,
    })
}
