//! In-process catalog repository
//!
//! Mirrors the PostgreSQL constraints that matter to ingestion: a unique
//! `business_key` in the staging table and all-or-nothing batches.

use async_trait::async_trait;
use mark_common::{CatalogEntry, LedgerProduct};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::CatalogRepository;
use crate::catalog::reconcile::{self, Discrepancy, ReconcileMode};
use crate::catalog::taxonomy::{StorageFailure, StorageFailureKind};

#[derive(Debug, Default)]
struct Tables {
    ledger: Vec<LedgerProduct>,
    catalog: Vec<CatalogEntry>,
    fail_next: Option<StorageFailureKind>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryCatalogRepository {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryCatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed the ledger side
    pub fn insert_ledger(&self, product: LedgerProduct) {
        self.lock().ledger.push(product);
    }

    /// Make the next repository call fail with `kind`
    pub fn fail_next(&self, kind: StorageFailureKind) {
        self.lock().fail_next = Some(kind);
    }

    /// Snapshot of the staging table
    pub fn catalog(&self) -> Vec<CatalogEntry> {
        self.lock().catalog.clone()
    }

    fn injected(tables: &mut Tables) -> Result<(), StorageFailure> {
        match tables.fail_next.take() {
            Some(kind) => Err(StorageFailure::new(kind, "injected failure")),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CatalogRepository for MemoryCatalogRepository {
    async fn insert_batch(&self, entries: &[CatalogEntry]) -> Result<u64, StorageFailure> {
        let mut tables = self.lock();
        Self::injected(&mut tables)?;

        let mut keys: HashSet<&str> = tables
            .catalog
            .iter()
            .map(|e| e.business_key.as_str())
            .collect();

        for entry in entries {
            if !keys.insert(entry.business_key.as_str()) {
                return Err(StorageFailure::new(
                    StorageFailureKind::IntegrityViolation,
                    format!(
                        "duplicate key value violates unique constraint: business_key={}",
                        entry.business_key
                    ),
                ));
            }
        }

        tables.catalog.extend_from_slice(entries);
        Ok(entries.len() as u64)
    }

    async fn clear(&self) -> Result<u64, StorageFailure> {
        let mut tables = self.lock();
        Self::injected(&mut tables)?;

        let removed = tables.catalog.len() as u64;
        tables.catalog.clear();
        Ok(removed)
    }

    async fn count(&self) -> Result<i64, StorageFailure> {
        let mut tables = self.lock();
        Self::injected(&mut tables)?;
        Ok(tables.catalog.len() as i64)
    }

    async fn reconcile(&self, mode: ReconcileMode) -> Result<Vec<Discrepancy>, StorageFailure> {
        let mut tables = self.lock();
        Self::injected(&mut tables)?;
        Ok(reconcile::select(mode, &tables.ledger, &tables.catalog))
    }
}
