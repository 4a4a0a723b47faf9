//! Catalog feature: upload, clear and reconciliation check

pub mod commands;
pub mod queries;
pub mod routes;

use std::sync::Arc;

use crate::catalog::normalizer::CsvLayout;
use crate::catalog::CatalogRepository;

pub use commands::{
    ClearCatalogCommand, ClearCatalogResponse, UploadCatalogCommand, UploadCatalogResponse,
};
pub use queries::CheckCatalogQuery;
pub use routes::catalog_routes;

/// State handed to catalog routes
#[derive(Clone)]
pub struct CatalogState {
    pub repository: Arc<dyn CatalogRepository>,
    pub layout: CsvLayout,
}
