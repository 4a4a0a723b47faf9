//! Fixtures shared by the mark-server integration tests
//!
//! Builds registry extracts the way the registry ships them: a one-line
//! preamble, a header row with the registry's column names, then data rows,
//! all inside a zip archive.

#![allow(dead_code)]

use std::io::Write;

use mark_common::{LedgerProduct, ProductStatus};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const PREAMBLE: &str = "Выгрузка из реестра маркированных товаров";

pub const HEADER: &str = "Код,GTIN,Код ТН ВЭД,Производитель / Импортер,\
Наименование товара,Бренд,Наименование производителя,Дата ввода в оборот";

/// One well-formed data row for `key`
pub fn row(key: &str) -> String {
    format!(
        "{key},04601234567890,6404110000,7701234567,Товар {key},Бренд,ООО Фабрика,2024-03-01T10:15:00Z"
    )
}

/// A full extract from preamble, header and `rows`
pub fn extract(rows: &[String]) -> Vec<u8> {
    let mut text = format!("{}\n{}\n", PREAMBLE, HEADER);
    for row in rows {
        text.push_str(row);
        text.push('\n');
    }
    text.into_bytes()
}

/// Extract for a list of keys
pub fn extract_for(keys: &[&str]) -> Vec<u8> {
    extract(&keys.iter().map(|k| row(k)).collect::<Vec<_>>())
}

/// Zip `entries` (name, bytes) in order
pub fn zip_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    for (name, bytes) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(bytes).unwrap();
    }

    writer.finish().unwrap().into_inner()
}

/// Archive holding a single `registry.csv`
pub fn registry_zip(keys: &[&str]) -> Vec<u8> {
    zip_archive(&[("registry.csv", extract_for(keys).as_slice())])
}

pub fn ledger_product(key: &str, status: ProductStatus) -> LedgerProduct {
    LedgerProduct::received(key, format!("Ledger {}", key), format!("{}tail", key), "INV-1")
        .with_status(status)
}
