//! Registry extract to raw records
//!
//! The registry's CSV starts with one line describing the export filter,
//! followed by the header row. Only the columns named in
//! [`CatalogField::from_header`] are read; everything else is ignored.
//!
//! Parsing is lenient: structurally broken rows (wrong column count, invalid
//! UTF-8, CSV syntax errors) are dropped and counted. Values are kept as text
//! so codes with leading zeros or long digit runs survive untouched. The one
//! exception is the registration date, which is parsed here and reduced to a
//! UTC calendar date.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::collections::BTreeMap;
use tracing::warn;

use crate::catalog::error::CatalogError;

/// Internal field of a catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CatalogField {
    BusinessKey,
    ExternalCode,
    CustomsCode,
    SupplierTaxId,
    Name,
    Brand,
    SupplierName,
    RegisteredDate,
}

impl CatalogField {
    pub const ALL: [CatalogField; 8] = [
        CatalogField::BusinessKey,
        CatalogField::ExternalCode,
        CatalogField::CustomsCode,
        CatalogField::SupplierTaxId,
        CatalogField::Name,
        CatalogField::Brand,
        CatalogField::SupplierName,
        CatalogField::RegisteredDate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CatalogField::BusinessKey => "business_key",
            CatalogField::ExternalCode => "external_code",
            CatalogField::CustomsCode => "customs_code",
            CatalogField::SupplierTaxId => "supplier_tax_id",
            CatalogField::Name => "name",
            CatalogField::Brand => "brand",
            CatalogField::SupplierName => "supplier_name",
            CatalogField::RegisteredDate => "registered_date",
        }
    }

    /// Column header used by the registry export
    pub fn header(self) -> &'static str {
        match self {
            CatalogField::BusinessKey => "Код",
            CatalogField::ExternalCode => "GTIN",
            CatalogField::CustomsCode => "Код ТН ВЭД",
            CatalogField::SupplierTaxId => "Производитель / Импортер",
            CatalogField::Name => "Наименование товара",
            CatalogField::Brand => "Бренд",
            CatalogField::SupplierName => "Наименование производителя",
            CatalogField::RegisteredDate => "Дата ввода в оборот",
        }
    }

    pub fn from_header(header: &str) -> Option<Self> {
        let header = header.trim();
        Self::ALL.into_iter().find(|field| field.header() == header)
    }
}

impl std::fmt::Display for CatalogField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cell after normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Text(String),
    Date(NaiveDate),
}

/// One surviving row, keyed by internal field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// 1-based line in the extract, preamble included
    pub line: u64,
    pub fields: BTreeMap<CatalogField, RawValue>,
}

/// Shape of the extract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvLayout {
    pub delimiter: u8,
    /// Lines before the header row
    pub preamble_lines: usize,
}

impl Default for CsvLayout {
    fn default() -> Self {
        Self {
            delimiter: b',',
            preamble_lines: 1,
        }
    }
}

/// Output of [`normalize`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedTable {
    pub records: Vec<RawRecord>,
    /// Rows dropped for structural problems
    pub skipped: usize,
}

fn strip_preamble(data: &[u8], lines: usize) -> (&[u8], u64) {
    let mut rest = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);
    let mut skipped = 0;
    while skipped < lines {
        match rest.iter().position(|&b| b == b'\n') {
            Some(pos) => rest = &rest[pos + 1..],
            None => rest = &[],
        }
        skipped += 1;
    }
    (rest, skipped as u64)
}

/// Offset-aware ISO 8601 layouts beyond strict RFC 3339
const ZONED_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y%m%dT%H%M%S%#z",
];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y%m%dT%H%M%S",
];

/// Parse a registry timestamp into the UTC calendar date
///
/// Accepts ISO 8601 date-times with a `Z` suffix or an offset in extended
/// (`+03:00`) or basic (`+0300`, `+03`) form, at minute or finer precision,
/// naive date-times with `T` or a space, and plain dates in extended or
/// basic form. Naive values are taken as UTC.
pub fn parse_registered_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }

    let zoned = match value.strip_suffix('Z').or_else(|| value.strip_suffix('z')) {
        Some(local) => format!("{}+00:00", local),
        None => value.to_string(),
    };
    for format in ZONED_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&zoned, format) {
            return Some(dt.with_timezone(&Utc).date_naive());
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.date());
        }
    }

    ["%Y-%m-%d", "%Y%m%d"]
        .into_iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

/// Normalize an extract into raw records
///
/// # Errors
///
/// `DateFormat` when a non-empty registration date cannot be parsed. An
/// empty date is passed through as empty text for the validator to reject.
pub fn normalize(data: &[u8], layout: &CsvLayout) -> Result<NormalizedTable, CatalogError> {
    let (body, line_offset) = strip_preamble(data, layout.preamble_lines);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(layout.delimiter)
        .has_headers(true)
        .flexible(false)
        .from_reader(body);

    let columns: Vec<(usize, CatalogField)> = match reader.byte_headers() {
        Ok(headers) => headers
            .iter()
            .enumerate()
            .filter_map(|(index, raw)| {
                CatalogField::from_header(&String::from_utf8_lossy(raw)).map(|f| (index, f))
            })
            .collect(),
        Err(e) => {
            warn!(error = %e, "Extract has no readable header row");
            return Ok(NormalizedTable::default());
        },
    };

    let mut table = NormalizedTable::default();
    let mut record = csv::ByteRecord::new();

    loop {
        match reader.read_byte_record(&mut record) {
            Ok(true) => {},
            Ok(false) => break,
            Err(e) => {
                tracing::debug!(error = %e, "Dropping malformed row");
                table.skipped += 1;
                continue;
            },
        }

        let line = record.position().map_or(0, |p| p.line()) + line_offset;

        let mut fields = BTreeMap::new();
        let mut well_formed = true;
        for &(index, field) in &columns {
            let Some(cell) = record.get(index).map(std::str::from_utf8) else {
                continue;
            };
            let Ok(text) = cell else {
                well_formed = false;
                break;
            };

            let value = match field {
                CatalogField::RegisteredDate if !text.trim().is_empty() => {
                    let date = parse_registered_date(text).ok_or_else(|| {
                        CatalogError::DateFormat {
                            line,
                            value: text.to_string(),
                        }
                    })?;
                    RawValue::Date(date)
                },
                CatalogField::RegisteredDate => RawValue::Text(String::new()),
                _ => RawValue::Text(text.to_string()),
            };
            fields.insert(field, value);
        }

        if well_formed {
            table.records.push(RawRecord { line, fields });
        } else {
            tracing::debug!(line, "Dropping row with invalid UTF-8");
            table.skipped += 1;
        }
    }

    if table.skipped > 0 {
        warn!(
            skipped = table.skipped,
            kept = table.records.len(),
            "Dropped malformed rows from extract"
        );
    }

    Ok(table)
}

/// Run [`normalize`] on the blocking pool
pub async fn normalize_blocking(
    data: Vec<u8>,
    layout: CsvLayout,
) -> Result<NormalizedTable, CatalogError> {
    tokio::task::spawn_blocking(move || normalize(&data, &layout))
        .await
        .map_err(|e| CatalogError::ServerFault(format!("normalizer task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Код,GTIN,Код ТН ВЭД,Производитель / Импортер,Наименование товара,Бренд,Наименование производителя,Дата ввода в оборот";

    fn extract(rows: &[&str]) -> Vec<u8> {
        let mut text = String::from("Фильтр: все товары\n");
        text.push_str(HEADER);
        text.push('\n');
        for row in rows {
            text.push_str(row);
            text.push('\n');
        }
        text.into_bytes()
    }

    fn text(record: &RawRecord, field: CatalogField) -> &str {
        match record.fields.get(&field) {
            Some(RawValue::Text(s)) => s,
            other => panic!("expected text for {}, got {:?}", field, other),
        }
    }

    #[test]
    fn test_header_mapping() {
        for field in CatalogField::ALL {
            assert_eq!(CatalogField::from_header(field.header()), Some(field));
        }
        assert_eq!(CatalogField::from_header(" GTIN "), Some(CatalogField::ExternalCode));
        assert_eq!(CatalogField::from_header("Статус"), None);
    }

    #[test]
    fn test_keeps_codes_verbatim() {
        let data = extract(&[
            "ABC123,04600000000017,6403990000,007700000000,Кроссовки,Acme,ООО Акме,2023-01-15T10:00:00Z",
        ]);

        let table = normalize(&data, &CsvLayout::default()).unwrap();
        assert_eq!(table.skipped, 0);
        let record = &table.records[0];
        assert_eq!(record.line, 3);
        assert_eq!(text(record, CatalogField::BusinessKey), "ABC123");
        assert_eq!(text(record, CatalogField::ExternalCode), "04600000000017");
        assert_eq!(text(record, CatalogField::SupplierTaxId), "007700000000");
        assert_eq!(
            record.fields.get(&CatalogField::RegisteredDate),
            Some(&RawValue::Date(NaiveDate::from_ymd_opt(2023, 1, 15).unwrap()))
        );
    }

    #[test]
    fn test_missing_values_become_empty_text() {
        let data = extract(&["K1,,,,,,,2023-01-15"]);
        let table = normalize(&data, &CsvLayout::default()).unwrap();
        assert_eq!(text(&table.records[0], CatalogField::Brand), "");
    }

    #[test]
    fn test_drops_rows_with_wrong_column_count() {
        let data = extract(&[
            "K1,1,2,3,n,b,s,2023-01-15",
            "K2,1,2",
            "K3,1,2,3,n,b,s,2023-01-16",
        ]);

        let table = normalize(&data, &CsvLayout::default()).unwrap();
        assert_eq!(table.skipped, 1);
        assert_eq!(table.records.len(), 2);
        assert_eq!(text(&table.records[1], CatalogField::BusinessKey), "K3");
    }

    #[test]
    fn test_drops_rows_with_invalid_utf8() {
        let mut data = extract(&["K1,1,2,3,n,b,s,2023-01-15"]);
        data.extend_from_slice(b"K2,1,2,3,\xFF\xFE,b,s,2023-01-15\n");

        let table = normalize(&data, &CsvLayout::default()).unwrap();
        assert_eq!(table.skipped, 1);
        assert_eq!(table.records.len(), 1);
    }

    #[test]
    fn test_unparsable_date_fails_with_line() {
        let data = extract(&["K1,1,2,3,n,b,s,2023-01-15", "K2,1,2,3,n,b,s,15/01/2023"]);

        match normalize(&data, &CsvLayout::default()) {
            Err(CatalogError::DateFormat { line, value }) => {
                assert_eq!(line, 4);
                assert_eq!(value, "15/01/2023");
            },
            other => panic!("expected DateFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_date_left_for_validator() {
        let data = extract(&["K1,1,2,3,n,b,s,"]);
        let table = normalize(&data, &CsvLayout::default()).unwrap();
        assert_eq!(text(&table.records[0], CatalogField::RegisteredDate), "");
    }

    #[test]
    fn test_missing_column_is_absent() {
        let data = "filter\nКод,GTIN\nK1,123\n".as_bytes();
        let table = normalize(data, &CsvLayout::default()).unwrap();
        let record = &table.records[0];
        assert_eq!(record.fields.len(), 2);
        assert!(!record.fields.contains_key(&CatalogField::Name));
    }

    #[test]
    fn test_unknown_columns_ignored_and_bom_tolerated() {
        let data = "\u{feff}filter\nСтатус;Код;GTIN\nactive;K1;001\n".as_bytes();
        let layout = CsvLayout {
            delimiter: b';',
            ..CsvLayout::default()
        };

        let table = normalize(data, &layout).unwrap();
        let record = &table.records[0];
        assert_eq!(text(record, CatalogField::BusinessKey), "K1");
        assert_eq!(text(record, CatalogField::ExternalCode), "001");
    }

    #[test]
    fn test_empty_extract() {
        let table = normalize(b"", &CsvLayout::default()).unwrap();
        assert!(table.records.is_empty());
        assert_eq!(table.skipped, 0);
    }

    #[test]
    fn test_parse_registered_date_forms() {
        let expected = NaiveDate::from_ymd_opt(2023, 1, 15).unwrap();
        assert_eq!(parse_registered_date("2023-01-15"), Some(expected));
        assert_eq!(parse_registered_date("2023-01-15 08:30:00"), Some(expected));
        assert_eq!(parse_registered_date("2023-01-15T08:30:00.123"), Some(expected));
        // 01:00 at +03:00 is still the previous day in UTC
        assert_eq!(
            parse_registered_date("2023-01-16T01:00:00+03:00"),
            Some(expected)
        );
        assert_eq!(parse_registered_date("yesterday"), None);
    }

    #[test]
    fn test_parse_registered_date_iso8601_variants() {
        let march_1 = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let feb_29 = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();

        for value in [
            "2024-03-01T10:15Z",
            "2024-03-01T10:15:00+0300",
            "2024-03-01T10:15:00.5+03",
            "2024-03-01T10:15+03:00",
            "2024-03-01 10:15:00+00:00",
            "20240301T101500Z",
            "20240301",
        ] {
            assert_eq!(parse_registered_date(value), Some(march_1), "{}", value);
        }

        // Offsets still shift the UTC calendar day
        assert_eq!(parse_registered_date("2024-03-01T01:15+0300"), Some(feb_29));
        assert_eq!(parse_registered_date("2024-03-01T10:15+25:00"), None);
        assert_eq!(parse_registered_date("2024-13-01"), None);
    }

    #[tokio::test]
    async fn test_normalize_blocking() {
        let data = extract(&["K1,1,2,3,n,b,s,2023-01-15"]);
        let table = normalize_blocking(data, CsvLayout::default()).await.unwrap();
        assert_eq!(table.records.len(), 1);
    }
}
