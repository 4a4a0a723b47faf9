//! Set differences between the ledger and the staged catalog
//!
//! | mode | rows |
//! |---|---|
//! | `ledger_missing_external` | ledger rows not deducted whose key is absent from the catalog |
//! | `external_missing_ledger` | catalog rows whose key is absent from the ledger |
//! | `ledger_stale_external_present` | keys on both sides where the ledger says not defined or deducted |
//!
//! Joins use `business_key` only. Output order is whatever storage returns.

use mark_common::{CatalogEntry, LedgerProduct, ProductStatus};
use serde::Serialize;
use std::collections::HashMap;
use std::str::FromStr;

use crate::catalog::error::CatalogError;
use crate::catalog::storage::CatalogRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReconcileMode {
    LedgerMissingExternal,
    ExternalMissingLedger,
    LedgerStaleExternalPresent,
}

impl ReconcileMode {
    pub const ALL: [ReconcileMode; 3] = [
        ReconcileMode::LedgerMissingExternal,
        ReconcileMode::ExternalMissingLedger,
        ReconcileMode::LedgerStaleExternalPresent,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ReconcileMode::LedgerMissingExternal => "ledger_missing_external",
            ReconcileMode::ExternalMissingLedger => "external_missing_ledger",
            ReconcileMode::LedgerStaleExternalPresent => "ledger_stale_external_present",
        }
    }

    /// Ledger statuses a row must (or must not) have to qualify
    pub fn status_filter(self) -> StatusFilter {
        match self {
            ReconcileMode::LedgerMissingExternal => {
                StatusFilter::Exclude(&[ProductStatus::Deducted])
            },
            ReconcileMode::ExternalMissingLedger => StatusFilter::Any,
            ReconcileMode::LedgerStaleExternalPresent => {
                StatusFilter::Include(&[ProductStatus::NotDefined, ProductStatus::Deducted])
            },
        }
    }
}

impl FromStr for ReconcileMode {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReconcileMode::ALL
            .into_iter()
            .find(|mode| mode.key() == s)
            .ok_or_else(|| CatalogError::InvalidMode(s.to_string()))
    }
}

impl std::fmt::Display for ReconcileMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    Any,
    Include(&'static [ProductStatus]),
    Exclude(&'static [ProductStatus]),
}

impl StatusFilter {
    pub fn accepts(self, status: ProductStatus) -> bool {
        match self {
            StatusFilter::Any => true,
            StatusFilter::Include(statuses) => statuses.contains(&status),
            StatusFilter::Exclude(statuses) => !statuses.contains(&status),
        }
    }

    /// Stored codes of the listed statuses
    pub fn codes(self) -> Vec<i16> {
        match self {
            StatusFilter::Any => Vec::new(),
            StatusFilter::Include(statuses) | StatusFilter::Exclude(statuses) => {
                statuses.iter().map(|s| s.code()).collect()
            },
        }
    }
}

/// One reported pair; the absent side is `None`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discrepancy {
    pub ledger: Option<LedgerProduct>,
    pub external: Option<CatalogEntry>,
}

/// Wire shape of a [`Discrepancy`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscrepancyView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_business_key: Option<String>,
}

impl From<Discrepancy> for DiscrepancyView {
    fn from(pair: Discrepancy) -> Self {
        let (name, business_key) = match pair.ledger {
            Some(product) => (Some(product.name), Some(product.business_key)),
            None => (None, None),
        };
        let (external_name, external_business_key) = match pair.external {
            Some(entry) => (Some(entry.name), Some(entry.business_key)),
            None => (None, None),
        };
        Self {
            name,
            business_key,
            external_name,
            external_business_key,
        }
    }
}

/// Evaluate `mode` over in-memory snapshots of both tables
pub fn select(
    mode: ReconcileMode,
    ledger: &[LedgerProduct],
    catalog: &[CatalogEntry],
) -> Vec<Discrepancy> {
    let filter = mode.status_filter();

    match mode {
        ReconcileMode::LedgerMissingExternal => {
            let external: HashMap<&str, &CatalogEntry> =
                catalog.iter().map(|e| (e.business_key.as_str(), e)).collect();
            ledger
                .iter()
                .filter(|p| filter.accepts(p.status))
                .filter(|p| !external.contains_key(p.business_key.as_str()))
                .map(|p| Discrepancy {
                    ledger: Some(p.clone()),
                    external: None,
                })
                .collect()
        },
        ReconcileMode::ExternalMissingLedger => {
            let internal: HashMap<&str, &LedgerProduct> =
                ledger.iter().map(|p| (p.business_key.as_str(), p)).collect();
            catalog
                .iter()
                .filter(|e| !internal.contains_key(e.business_key.as_str()))
                .map(|e| Discrepancy {
                    ledger: None,
                    external: Some(e.clone()),
                })
                .collect()
        },
        ReconcileMode::LedgerStaleExternalPresent => {
            let external: HashMap<&str, &CatalogEntry> =
                catalog.iter().map(|e| (e.business_key.as_str(), e)).collect();
            ledger
                .iter()
                .filter(|p| filter.accepts(p.status))
                .filter_map(|p| {
                    external.get(p.business_key.as_str()).map(|e| Discrepancy {
                        ledger: Some(p.clone()),
                        external: Some((*e).clone()),
                    })
                })
                .collect()
        },
    }
}

/// Parse `mode_key` and run it against `repo`
#[tracing::instrument(skip(repo))]
pub async fn reconcile(
    repo: &dyn CatalogRepository,
    mode_key: &str,
) -> Result<Vec<Discrepancy>, CatalogError> {
    let mode: ReconcileMode = mode_key.parse()?;
    let pairs = repo.reconcile(mode).await?;
    tracing::info!(mode = %mode, count = pairs.len(), "Reconciliation finished");
    Ok(pairs)
}
