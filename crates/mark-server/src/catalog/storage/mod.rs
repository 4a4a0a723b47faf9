//! Storage seam for the staged catalog
//!
//! [`PgCatalogRepository`] is a thin handle over the server's pool and caches
//! nothing of its own. [`MemoryCatalogRepository`] keeps both tables in
//! process for tests and local tooling, and can be told to fail its next
//! call with a chosen [`StorageFailureKind`](crate::catalog::taxonomy::StorageFailureKind).

use async_trait::async_trait;
use mark_common::CatalogEntry;

use crate::catalog::reconcile::{Discrepancy, ReconcileMode};
use crate::catalog::taxonomy::StorageFailure;

pub mod memory;
pub mod postgres;

pub use memory::MemoryCatalogRepository;
pub use postgres::PgCatalogRepository;

/// Persistence operations behind the loader and the reconciliation engine
///
/// Every write runs in its own unit of work: either all of it is visible
/// afterwards or none of it is.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Insert every entry atomically; returns the number of rows written
    async fn insert_batch(&self, entries: &[CatalogEntry]) -> Result<u64, StorageFailure>;

    /// Remove every staged entry; returns the number of rows removed
    async fn clear(&self) -> Result<u64, StorageFailure>;

    async fn count(&self) -> Result<i64, StorageFailure>;

    /// Read-only evaluation of `mode` against the ledger and the staging table
    async fn reconcile(&self, mode: ReconcileMode) -> Result<Vec<Discrepancy>, StorageFailure>;
}
