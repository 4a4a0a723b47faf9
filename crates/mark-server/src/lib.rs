//! Mark Server Library
//!
//! HTTP server for a marked-product ledger and its reconciliation against the
//! external product registry.
//!
//! # Overview
//!
//! - **Catalog engine** ([`catalog`]): extracts the registry archive, normalizes
//!   and validates its CSV table, bulk loads it into a staging table and reports
//!   discrepancies against the ledger
//! - **Ledger CRUD** ([`features::products`]): products keyed by business key
//! - **Database Management**: PostgreSQL through SQLx, migrations at startup
//! - **Configuration**: environment-based, see [`config::Config::load`]
//! - **Middleware**: CORS, request tracing, compression and body limits
//!
//! # Architecture
//!
//! Feature slices separate commands (writes) from queries (reads). Each slice
//! exposes plain async `handle` functions plus an axum router. The catalog
//! engine talks to storage only through the [`catalog::CatalogRepository`]
//! trait, so the whole ingestion pipeline runs against an in-memory
//! repository in tests.
//!
//! # Example
//!
//! ```no_run
//! use mark_server::{api, config::Config, db};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let pool = db::create_pool(&config.database).await?;
//!     db::run_migrations(&pool).await?;
//!     api::serve(api::AppState { db: pool }, config).await
//! }
//! ```

pub mod api;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod features;
pub mod middleware;

// Re-export commonly used types
pub use error::{AppError, ServerResult};
