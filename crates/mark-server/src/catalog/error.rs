//! Domain-facing failures of catalog ingestion and reconciliation
//!
//! Every variant has a stable wire code and HTTP status. Storage-level
//! failures reach this type only through [`crate::catalog::taxonomy`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::api::response::ErrorResponse;
use crate::catalog::validator::ValidationError;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Invalid archive: {0}")]
    InvalidArchive(String),

    #[error("Archive contains no .csv entry")]
    NoTabularPayload,

    #[error("Failed to read archive entry: {0}")]
    ExtractionIo(#[source] std::io::Error),

    #[error("Line {line}: unparsable registration date '{value}'")]
    DateFormat { line: u64, value: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad data: {0}")]
    BadData(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Bad query: {0}")]
    BadQuery(String),

    #[error("Storage fault: {0}")]
    ServerFault(String),

    #[error("Unknown reconciliation mode '{0}'")]
    InvalidMode(String),
}

impl CatalogError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            CatalogError::InvalidArchive(_) => "INVALID_ARCHIVE",
            CatalogError::NoTabularPayload => "NO_TABULAR_PAYLOAD",
            CatalogError::ExtractionIo(_) => "EXTRACTION_IO_ERROR",
            CatalogError::DateFormat { .. } => "DATE_FORMAT_ERROR",
            CatalogError::Validation(_) => "VALIDATION_ERROR",
            CatalogError::Conflict(_) => "CONFLICT",
            CatalogError::BadData(_) => "BAD_DATA",
            CatalogError::Unavailable(_) => "UNAVAILABLE",
            CatalogError::BadQuery(_) => "BAD_QUERY",
            CatalogError::ServerFault(_) => "SERVER_FAULT",
            CatalogError::InvalidMode(_) => "INVALID_MODE",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            CatalogError::InvalidArchive(_)
            | CatalogError::NoTabularPayload
            | CatalogError::BadData(_)
            | CatalogError::BadQuery(_)
            | CatalogError::InvalidMode(_) => StatusCode::BAD_REQUEST,
            CatalogError::DateFormat { .. } | CatalogError::Validation(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            },
            CatalogError::Conflict(_) => StatusCode::CONFLICT,
            CatalogError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            CatalogError::ExtractionIo(_) | CatalogError::ServerFault(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            CatalogError::DateFormat { line, value } => Some(json!({
                "line": line,
                "value": value,
            })),
            CatalogError::Validation(err) => serde_json::to_value(err).ok(),
            _ => None,
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = ?self, "Catalog request failed");
        } else {
            tracing::warn!(code = self.code(), error = %self, "Catalog request rejected");
        }

        let body = match self.details() {
            Some(details) => ErrorResponse::with_details(self.code(), self.to_string(), details),
            None => ErrorResponse::new(self.code(), self.to_string()),
        };

        body.into_response_with(status)
    }
}
