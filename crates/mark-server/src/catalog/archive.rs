//! Isolation of the tabular payload from an uploaded zip archive
//!
//! The registry ships its extract as a zip holding one `.csv` file. When an
//! archive carries several, the first one in central-directory order wins;
//! the rest are ignored.

use std::io::{Cursor, Read};
use std::path::Path;
use tracing::debug;

use crate::catalog::error::CatalogError;

/// The selected table entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePayload {
    /// Entry name inside the archive
    pub name: String,
    pub bytes: Vec<u8>,
}

fn has_extension(name: &str, extension: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

/// Extract the table payload from `data`, an archive uploaded as `filename`
///
/// # Errors
///
/// - `InvalidArchive` when the filename is not `*.zip`, the upload is empty,
///   or the bytes are not a readable zip
/// - `InvalidArchive` when the selected entry uses a compression method this
///   build cannot decode
/// - `NoTabularPayload` when no file entry ends in `.csv`
/// - `ExtractionIo` when the selected entry cannot be decompressed
pub fn extract_table(filename: &str, data: &[u8]) -> Result<TablePayload, CatalogError> {
    if !has_extension(filename, "zip") {
        return Err(CatalogError::InvalidArchive(format!(
            "'{}' is not a .zip file",
            filename
        )));
    }

    if data.is_empty() {
        return Err(CatalogError::InvalidArchive("archive is empty".to_string()));
    }

    let mut archive = zip::ZipArchive::new(Cursor::new(data))
        .map_err(|e| CatalogError::InvalidArchive(e.to_string()))?;

    let mut selected = None;
    for i in 0..archive.len() {
        let entry = archive
            .by_index_raw(i)
            .map_err(|e| CatalogError::InvalidArchive(format!("entry {}: {}", i, e)))?;

        if !entry.is_dir() && has_extension(entry.name(), "csv") {
            selected = Some((i, entry.name().to_string()));
            break;
        }
    }

    let (index, name) = selected.ok_or(CatalogError::NoTabularPayload)?;

    let mut entry = archive.by_index(index).map_err(|e| match e {
        zip::result::ZipError::UnsupportedArchive(reason) => {
            CatalogError::InvalidArchive(format!("{}: {}", name, reason))
        },
        other => CatalogError::ExtractionIo(other.into()),
    })?;

    let mut bytes = Vec::new();
    entry
        .read_to_end(&mut bytes)
        .map_err(CatalogError::ExtractionIo)?;

    debug!(entry = %name, size = bytes.len(), "Extracted table payload");

    Ok(TablePayload { name, bytes })
}
