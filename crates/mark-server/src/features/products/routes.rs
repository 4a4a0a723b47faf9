//! Ledger product API routes
//!
//! - `POST /api/v1/products` - Create a product
//! - `GET /api/v1/products/statuses` - List ledger statuses
//! - `GET /api/v1/products/:business_key` - Get a product
//! - `PATCH /api/v1/products/:business_key` - Partially update a product
//! - `DELETE /api/v1/products/:business_key` - Delete a product

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use sqlx::PgPool;

use super::{
    commands::{
        CreateProductCommand, CreateProductError, DeleteProductCommand, DeleteProductError,
        UpdateProductCommand, UpdateProductError,
    },
    queries::{GetProductError, GetProductQuery},
};
use crate::api::response::{ApiResponse, ErrorResponse};

pub fn products_routes() -> Router<PgPool> {
    Router::new()
        .route("/", post(create_product))
        .route("/statuses", get(list_statuses))
        .route(
            "/:business_key",
            get(get_product).patch(update_product).delete(delete_product),
        )
}

// ============================================================================
// Command Handlers (Write Operations)
// ============================================================================

/// Create a ledger product
///
/// # Response
///
/// - `201 Created` - Product stored
/// - `400 Bad Request` - Validation error
/// - `409 Conflict` - Business key or name already taken
#[tracing::instrument(skip(pool, command), fields(business_key = %command.business_key))]
async fn create_product(
    State(pool): State<PgPool>,
    Json(command): Json<CreateProductCommand>,
) -> Result<Response, ProductApiError> {
    let product = super::commands::create::handle(pool, command).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(product))).into_response())
}

/// Partially update a ledger product
#[tracing::instrument(skip(pool, command), fields(business_key = %business_key))]
async fn update_product(
    State(pool): State<PgPool>,
    Path(business_key): Path<String>,
    Json(mut command): Json<UpdateProductCommand>,
) -> Result<Response, ProductApiError> {
    command.business_key = business_key;

    let product = super::commands::update::handle(pool, command).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(product))).into_response())
}

#[tracing::instrument(skip(pool), fields(business_key = %business_key))]
async fn delete_product(
    State(pool): State<PgPool>,
    Path(business_key): Path<String>,
) -> Result<Response, ProductApiError> {
    let response =
        super::commands::delete::handle(pool, DeleteProductCommand { business_key }).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

// ============================================================================
// Query Handlers (Read Operations)
// ============================================================================

#[tracing::instrument(skip(pool), fields(business_key = %business_key))]
async fn get_product(
    State(pool): State<PgPool>,
    Path(business_key): Path<String>,
) -> Result<Response, ProductApiError> {
    let product = super::queries::get::handle(pool, GetProductQuery { business_key }).await?;

    tracing::debug!(status = %product.status, "Ledger product retrieved via API");

    Ok((StatusCode::OK, Json(ApiResponse::success(product))).into_response())
}

async fn list_statuses() -> Response {
    let items = super::queries::statuses::handle();
    let meta = json!({ "count": items.len() });

    (StatusCode::OK, Json(ApiResponse::success_with_meta(items, meta))).into_response()
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
enum ProductApiError {
    Create(CreateProductError),
    Update(UpdateProductError),
    Delete(DeleteProductError),
    Get(GetProductError),
}

impl From<CreateProductError> for ProductApiError {
    fn from(err: CreateProductError) -> Self {
        Self::Create(err)
    }
}

impl From<UpdateProductError> for ProductApiError {
    fn from(err: UpdateProductError) -> Self {
        Self::Update(err)
    }
}

impl From<DeleteProductError> for ProductApiError {
    fn from(err: DeleteProductError) -> Self {
        Self::Delete(err)
    }
}

impl From<GetProductError> for ProductApiError {
    fn from(err: GetProductError) -> Self {
        Self::Get(err)
    }
}

impl ProductApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        use ProductApiError::*;

        match self {
            Create(CreateProductError::Validation(_))
            | Update(UpdateProductError::BusinessKeyRequired)
            | Update(UpdateProductError::NoFieldsToUpdate)
            | Update(UpdateProductError::Validation(_))
            | Delete(DeleteProductError::BusinessKeyRequired)
            | Get(GetProductError::BusinessKeyRequired) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            },
            Update(UpdateProductError::NotFound(_))
            | Delete(DeleteProductError::NotFound(_))
            | Get(GetProductError::NotFound(_)) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Create(CreateProductError::DuplicateKey(_))
            | Create(CreateProductError::DuplicateName(_))
            | Update(UpdateProductError::DuplicateName(_)) => (StatusCode::CONFLICT, "CONFLICT"),
            Create(CreateProductError::Database(_))
            | Update(UpdateProductError::Database(_))
            | Delete(DeleteProductError::Database(_))
            | Get(GetProductError::Database(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            },
        }
    }
}

impl std::fmt::Display for ProductApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductApiError::Create(e) => write!(f, "{}", e),
            ProductApiError::Update(e) => write!(f, "{}", e),
            ProductApiError::Delete(e) => write!(f, "{}", e),
            ProductApiError::Get(e) => write!(f, "{}", e),
        }
    }
}

impl IntoResponse for ProductApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Database error in ledger product API: {}", self);
            "A database error occurred".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}
