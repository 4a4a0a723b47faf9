//! Strict mapping of raw records onto [`CatalogEntry`]
//!
//! All-or-nothing: the first record that does not fit aborts the batch.

use chrono::NaiveDate;
use mark_common::CatalogEntry;
use serde::Serialize;
use thiserror::Error;

use crate::catalog::normalizer::{CatalogField, RawRecord, RawValue};

/// The record that stopped the batch
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("Record {index} (line {line}): field '{field}' {reason}")]
pub struct ValidationError {
    /// 0-based position in the batch
    pub index: usize,
    pub line: u64,
    #[serde(serialize_with = "serialize_field")]
    pub field: CatalogField,
    pub reason: String,
}

fn serialize_field<S: serde::Serializer>(field: &CatalogField, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(field.as_str())
}

struct RecordCursor<'a> {
    index: usize,
    record: &'a mut RawRecord,
}

impl RecordCursor<'_> {
    fn fail(&self, field: CatalogField, reason: &str) -> ValidationError {
        ValidationError {
            index: self.index,
            line: self.record.line,
            field,
            reason: reason.to_string(),
        }
    }

    fn text(&mut self, field: CatalogField) -> Result<String, ValidationError> {
        match self.record.fields.remove(&field) {
            Some(RawValue::Text(value)) => Ok(value),
            Some(RawValue::Date(_)) => Err(self.fail(field, "must be text")),
            None => Err(self.fail(field, "is missing")),
        }
    }

    fn date(&mut self, field: CatalogField) -> Result<NaiveDate, ValidationError> {
        match self.record.fields.remove(&field) {
            Some(RawValue::Date(value)) => Ok(value),
            Some(RawValue::Text(_)) => Err(self.fail(field, "must be a date")),
            None => Err(self.fail(field, "is missing")),
        }
    }
}

fn validate_record(index: usize, mut record: RawRecord) -> Result<CatalogEntry, ValidationError> {
    let mut cursor = RecordCursor {
        index,
        record: &mut record,
    };

    let business_key = cursor.text(CatalogField::BusinessKey)?;
    if business_key.trim().is_empty() {
        return Err(cursor.fail(CatalogField::BusinessKey, "must not be blank"));
    }

    Ok(CatalogEntry {
        business_key,
        external_code: cursor.text(CatalogField::ExternalCode)?,
        customs_code: cursor.text(CatalogField::CustomsCode)?,
        supplier_tax_id: cursor.text(CatalogField::SupplierTaxId)?,
        name: cursor.text(CatalogField::Name)?,
        brand: cursor.text(CatalogField::Brand)?,
        supplier_name: cursor.text(CatalogField::SupplierName)?,
        registered_date: cursor.date(CatalogField::RegisteredDate)?,
    })
}

/// Validate a whole batch
pub fn validate(records: Vec<RawRecord>) -> Result<Vec<CatalogEntry>, ValidationError> {
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| validate_record(index, record))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn record(line: u64, key: &str) -> RawRecord {
        let mut fields = BTreeMap::new();
        for field in CatalogField::ALL {
            let value = match field {
                CatalogField::BusinessKey => RawValue::Text(key.to_string()),
                CatalogField::RegisteredDate => {
                    RawValue::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
                },
                other => RawValue::Text(format!("{}-value", other)),
            };
            fields.insert(field, value);
        }
        RawRecord { line, fields }
    }

    #[test]
    fn test_valid_batch() {
        let entries = validate(vec![record(3, "K1"), record(4, "K2")]).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].business_key, "K2");
        assert_eq!(entries[0].brand, "brand-value");
    }

    #[test]
    fn test_first_invalid_record_aborts() {
        let mut bad = record(5, "K2");
        bad.fields.remove(&CatalogField::Brand);
        let mut also_bad = record(6, "K3");
        also_bad.fields.remove(&CatalogField::Name);

        let err = validate(vec![record(4, "K1"), bad, also_bad]).unwrap_err();
        assert_eq!(
            err,
            ValidationError {
                index: 1,
                line: 5,
                field: CatalogField::Brand,
                reason: "is missing".to_string(),
            }
        );
    }

    #[test]
    fn test_date_must_be_date() {
        let mut bad = record(3, "K1");
        bad.fields
            .insert(CatalogField::RegisteredDate, RawValue::Text(String::new()));

        let err = validate(vec![bad]).unwrap_err();
        assert_eq!(err.field, CatalogField::RegisteredDate);
        assert_eq!(err.reason, "must be a date");
    }

    #[test]
    fn test_text_field_rejects_date() {
        let mut bad = record(3, "K1");
        bad.fields.insert(
            CatalogField::CustomsCode,
            RawValue::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()),
        );

        let err = validate(vec![bad]).unwrap_err();
        assert_eq!(err.field, CatalogField::CustomsCode);
    }

    #[test]
    fn test_blank_business_key() {
        let err = validate(vec![record(3, "  ")]).unwrap_err();
        assert_eq!(err.field, CatalogField::BusinessKey);
        assert_eq!(err.reason, "must not be blank");
    }

    #[test]
    fn test_error_serializes_field_name() {
        let err = validate(vec![record(9, "")]).unwrap_err();
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["field"], "business_key");
        assert_eq!(value["line"], 9);
    }
}
