//! Entity shapes shared by the ledger, the catalog engine and CRUD callers
//!
//! Both entities are keyed by the marking code printed on the physical unit
//! (`business_key`). Nothing guarantees a key exists on both sides at once;
//! reconciliation exists to report exactly that asymmetry.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::MarkError;

/// Lifecycle state of a marked unit in the ledger
///
/// Persisted as a small integer; the numeric codes are part of the stored
/// data and must not be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    /// Received but not yet classified
    #[default]
    NotDefined,
    /// Physically on balance
    OnBalance,
    /// Issued or written off
    Deducted,
    /// Listed by the external registry while no longer on balance
    InExternalDeducted,
}

impl ProductStatus {
    /// All statuses in code order
    pub const ALL: [ProductStatus; 4] = [
        ProductStatus::NotDefined,
        ProductStatus::OnBalance,
        ProductStatus::Deducted,
        ProductStatus::InExternalDeducted,
    ];

    /// Stored numeric code
    pub fn code(self) -> i16 {
        match self {
            ProductStatus::NotDefined => 0,
            ProductStatus::OnBalance => 1,
            ProductStatus::Deducted => 2,
            ProductStatus::InExternalDeducted => 3,
        }
    }

    /// Human readable label
    pub fn label(self) -> &'static str {
        match self {
            ProductStatus::NotDefined => "Not defined",
            ProductStatus::OnBalance => "On balance",
            ProductStatus::Deducted => "Deducted",
            ProductStatus::InExternalDeducted => "Listed externally, not on balance",
        }
    }

    /// Wire name, identical to the serde representation
    pub fn as_str(self) -> &'static str {
        match self {
            ProductStatus::NotDefined => "NOT_DEFINED",
            ProductStatus::OnBalance => "ON_BALANCE",
            ProductStatus::Deducted => "DEDUCTED",
            ProductStatus::InExternalDeducted => "IN_EXTERNAL_DEDUCTED",
        }
    }
}

impl TryFrom<i16> for ProductStatus {
    type Error = MarkError;

    fn try_from(code: i16) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(ProductStatus::NotDefined),
            1 => Ok(ProductStatus::OnBalance),
            2 => Ok(ProductStatus::Deducted),
            3 => Ok(ProductStatus::InExternalDeducted),
            other => Err(MarkError::InvalidStatus(other)),
        }
    }
}

impl std::str::FromStr for ProductStatus {
    type Err = MarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProductStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| MarkError::InvalidStatusName(s.to_string()))
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Internal record of a physical unit under marking control
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerProduct {
    pub id: Uuid,
    /// Marking code; unique across the ledger
    pub business_key: String,
    pub name: String,
    pub status: ProductStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_code: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_code: Option<i64>,
    /// Full marking code including the crypto tail
    pub mark_code: String,
    pub received_doc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_doc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LedgerProduct {
    /// Build a freshly received product with server-side defaults
    pub fn received(
        business_key: impl Into<String>,
        name: impl Into<String>,
        mark_code: impl Into<String>,
        received_doc: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            business_key: business_key.into(),
            name: name.into(),
            status: ProductStatus::NotDefined,
            work_code: None,
            external_code: None,
            mark_code: mark_code.into(),
            received_doc: received_doc.into(),
            received_date: None,
            issued_doc: None,
            issued_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_status(mut self, status: ProductStatus) -> Self {
        self.status = status;
        self
    }
}

/// Staged copy of one unit from the external registry
///
/// Text attributes are never null; an empty string means the registry left
/// the column blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub business_key: String,
    pub external_code: String,
    pub customs_code: String,
    pub supplier_tax_id: String,
    pub name: String,
    pub brand: String,
    pub supplier_name: String,
    pub registered_date: NaiveDate,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_round_trip() {
        for status in ProductStatus::ALL {
            assert_eq!(ProductStatus::try_from(status.code()).unwrap(), status);
        }
        assert_eq!(ProductStatus::try_from(7), Err(MarkError::InvalidStatus(7)));
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&ProductStatus::InExternalDeducted).unwrap(),
            "\"IN_EXTERNAL_DEDUCTED\""
        );
        assert_eq!("on_balance".parse::<ProductStatus>().unwrap(), ProductStatus::OnBalance);
        assert!("shipped".parse::<ProductStatus>().is_err());
    }

    #[test]
    fn test_received_product_defaults() {
        let product = LedgerProduct::received("ABC123", "Sneakers", "ABC123xyz", "INV-1");
        assert_eq!(product.status, ProductStatus::NotDefined);
        assert!(product.issued_doc.is_none());
        assert_eq!(product.created_at, product.updated_at);
    }
}
