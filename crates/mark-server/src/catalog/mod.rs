//! Catalog ingestion and reconciliation engine
//!
//! Write path, leaf first:
//!
//! 1. [`archive`] isolates the single `.csv` payload from an uploaded zip
//! 2. [`normalizer`] maps registry headers to internal fields, drops
//!    structurally broken rows and parses registration dates
//! 3. [`validator`] maps every surviving row onto [`mark_common::CatalogEntry`],
//!    failing the whole batch on the first bad one
//! 4. [`loader`] inserts the batch into `catalog_entries` atomically
//!
//! [`reconcile`] reads the ledger and the staging table independently of
//! the write path. Both the loader and reconciliation report storage failures
//! through [`taxonomy`].

pub mod archive;
pub mod error;
pub mod loader;
pub mod normalizer;
pub mod reconcile;
pub mod storage;
pub mod taxonomy;
pub mod validator;

pub use error::CatalogError;
pub use reconcile::{Discrepancy, DiscrepancyView, ReconcileMode};
pub use storage::{CatalogRepository, MemoryCatalogRepository, PgCatalogRepository};
