//! Row decoding shared by the ledger slice and the catalog repository
//!
//! Column names are looked up with a prefix so joined queries can alias both
//! sides (`l_name`, `c_name`) and single-table queries can pass `""`.

use mark_common::{CatalogEntry, LedgerProduct, ProductStatus};
use sqlx::{postgres::PgRow, Row};

/// Ledger columns in table order
pub const LEDGER_COLUMNS: [&str; 13] = [
    "id",
    "business_key",
    "name",
    "status",
    "work_code",
    "external_code",
    "mark_code",
    "received_doc",
    "received_date",
    "issued_doc",
    "issued_date",
    "created_at",
    "updated_at",
];

/// Catalog columns read back by reconciliation
pub const CATALOG_COLUMNS: [&str; 8] = [
    "business_key",
    "external_code",
    "customs_code",
    "supplier_tax_id",
    "name",
    "brand",
    "supplier_name",
    "registered_date",
];

/// `alias.col AS prefixcol, ...` for a select list
pub fn select_list(columns: &[&str], alias: &str, prefix: &str) -> String {
    columns
        .iter()
        .map(|col| format!("{alias}.{col} AS {prefix}{col}"))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn ledger_from_row(row: &PgRow, prefix: &str) -> Result<LedgerProduct, sqlx::Error> {
    let col = |name: &str| format!("{prefix}{name}");

    let status_column = col("status");
    let code: i16 = row.try_get(status_column.as_str())?;
    let status = ProductStatus::try_from(code).map_err(|e| sqlx::Error::ColumnDecode {
        index: status_column.clone(),
        source: Box::new(e),
    })?;

    Ok(LedgerProduct {
        id: row.try_get(col("id").as_str())?,
        business_key: row.try_get(col("business_key").as_str())?,
        name: row.try_get(col("name").as_str())?,
        status,
        work_code: row.try_get(col("work_code").as_str())?,
        external_code: row.try_get(col("external_code").as_str())?,
        mark_code: row.try_get(col("mark_code").as_str())?,
        received_doc: row.try_get(col("received_doc").as_str())?,
        received_date: row.try_get(col("received_date").as_str())?,
        issued_doc: row.try_get(col("issued_doc").as_str())?,
        issued_date: row.try_get(col("issued_date").as_str())?,
        created_at: row.try_get(col("created_at").as_str())?,
        updated_at: row.try_get(col("updated_at").as_str())?,
    })
}

pub fn catalog_from_row(row: &PgRow, prefix: &str) -> Result<CatalogEntry, sqlx::Error> {
    let col = |name: &str| format!("{prefix}{name}");

    Ok(CatalogEntry {
        business_key: row.try_get(col("business_key").as_str())?,
        external_code: row.try_get(col("external_code").as_str())?,
        customs_code: row.try_get(col("customs_code").as_str())?,
        supplier_tax_id: row.try_get(col("supplier_tax_id").as_str())?,
        name: row.try_get(col("name").as_str())?,
        brand: row.try_get(col("brand").as_str())?,
        supplier_name: row.try_get(col("supplier_name").as_str())?,
        registered_date: row.try_get(col("registered_date").as_str())?,
    })
}
