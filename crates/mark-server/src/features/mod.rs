//! Feature slices of the mark API
//!
//! Each slice keeps its write operations under `commands/`, its reads under
//! `queries/` and its HTTP wiring in `routes.rs`.
//!
//! - **catalog**: registry archive upload, staging table clear, reconciliation
//! - **products**: ledger product CRUD keyed by business key

pub mod catalog;
pub mod products;
pub mod shared;

use std::sync::Arc;

use axum::Router;
use sqlx::PgPool;

use crate::catalog::normalizer::CsvLayout;
use crate::catalog::PgCatalogRepository;
use crate::config::IngestConfig;
use catalog::CatalogState;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    pub db: PgPool,
    pub ingest: IngestConfig,
}

impl FeatureState {
    /// Catalog state backed by the PostgreSQL repository
    ///
    /// The repository holds nothing but a pool handle, so building it here
    /// keeps no state beyond what the pool already caches.
    pub fn catalog_state(&self) -> CatalogState {
        let repository = PgCatalogRepository::new(self.db.clone())
            .with_chunk_size(self.ingest.insert_chunk_size);

        CatalogState {
            repository: Arc::new(repository),
            layout: CsvLayout {
                delimiter: self.ingest.csv_delimiter,
                ..CsvLayout::default()
            },
        }
    }
}

/// Creates the `/api/v1` router with all feature routes mounted
///
/// - `/catalog` - Registry ingestion and reconciliation
/// - `/products` - Ledger product management
pub fn router(state: FeatureState) -> Router<()> {
    Router::new()
        .nest("/catalog", catalog_router(state.catalog_state()))
        .nest("/products", products::products_routes().with_state(state.db.clone()))
}

/// Catalog routes bound to an explicit state
///
/// Integration tests mount this with an in-memory repository.
pub fn catalog_router(state: CatalogState) -> Router<()> {
    catalog::catalog_routes().with_state(state)
}
