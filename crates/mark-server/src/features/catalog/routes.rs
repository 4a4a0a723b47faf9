//! Catalog API routes
//!
//! - `POST /api/v1/catalog/upload` - Ingest a registry archive (multipart field `file`)
//! - `DELETE /api/v1/catalog` - Empty the staging table
//! - `GET /api/v1/catalog/check?key=<mode>` - Report ledger/catalog discrepancies

use axum::{
    extract::{multipart::MultipartError, Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;

use super::{
    commands::{ClearCatalogCommand, UploadCatalogCommand},
    queries::CheckCatalogQuery,
    CatalogState,
};
use crate::catalog::CatalogError;
use crate::error::AppError;

pub fn catalog_routes() -> Router<CatalogState> {
    Router::new()
        .route("/", delete(clear_catalog))
        .route("/upload", post(upload_catalog))
        .route("/check", get(check_catalog))
}

#[derive(Debug, Default, Deserialize)]
struct UploadParams {
    #[serde(default)]
    replace: bool,
}

/// Ingest a registry archive
///
/// # Response
///
/// - `200 OK` - `{"status": "success", "processed": n}`
/// - `400 Bad Request` - Not a zip, no `.csv` entry, missing `file` field
/// - `413 Payload Too Large` - Body exceeds the configured upload limit
/// - `409 Conflict` - A key is already staged or repeated in the batch
/// - `422 Unprocessable Entity` - Bad date or schema-invalid row
/// - `503 Service Unavailable` - Database unreachable
#[tracing::instrument(skip(state, multipart), fields(replace = params.replace))]
async fn upload_catalog(
    State(state): State<CatalogState>,
    Query(params): Query<UploadParams>,
    mut multipart: Multipart,
) -> Result<Response, CatalogApiError> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Failed to read multipart field", e))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| multipart_error("Failed to read file bytes", e))?;
            upload = Some((filename, data.to_vec()));
            break;
        }
    }

    let (filename, data) = upload.ok_or_else(|| {
        AppError::BadRequest("No file field found in multipart data".to_string())
    })?;

    let command = UploadCatalogCommand {
        filename,
        data,
        replace: params.replace,
    };

    let response =
        super::commands::upload::handle(state.repository.as_ref(), state.layout, command).await?;

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Keep the body-limit rejection distinguishable from a malformed body
fn multipart_error(context: &str, err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("{}: {}", context, err.body_text()))
    } else {
        AppError::BadRequest(format!("{}: {}", context, err.body_text()))
    }
}

/// Empty the staging table
#[tracing::instrument(skip(state))]
async fn clear_catalog(State(state): State<CatalogState>) -> Result<Response, CatalogApiError> {
    let response =
        super::commands::clear::handle(state.repository.as_ref(), ClearCatalogCommand).await?;

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Run one reconciliation mode
///
/// Modes: `ledger_missing_external`, `external_missing_ledger`,
/// `ledger_stale_external_present`. Anything else is `400 INVALID_MODE`.
#[tracing::instrument(skip(state, query), fields(mode = %query.key))]
async fn check_catalog(
    State(state): State<CatalogState>,
    Query(query): Query<CheckCatalogQuery>,
) -> Result<Response, CatalogApiError> {
    let pairs = super::queries::check::handle(state.repository.as_ref(), query).await?;

    Ok((StatusCode::OK, Json(pairs)).into_response())
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
enum CatalogApiError {
    Catalog(CatalogError),
    Request(AppError),
}

impl From<CatalogError> for CatalogApiError {
    fn from(err: CatalogError) -> Self {
        Self::Catalog(err)
    }
}

impl From<AppError> for CatalogApiError {
    fn from(err: AppError) -> Self {
        Self::Request(err)
    }
}

impl IntoResponse for CatalogApiError {
    fn into_response(self) -> Response {
        match self {
            CatalogApiError::Catalog(err) => err.into_response(),
            CatalogApiError::Request(err) => err.into_response(),
        }
    }
}
