//! Ledger product feature: create, read, update and delete by business key

pub mod commands;
pub mod queries;
pub mod routes;

pub use commands::{
    CreateProductCommand, CreateProductError, DeleteProductCommand, DeleteProductError,
    DeleteProductResponse, UpdateProductCommand, UpdateProductError,
};
pub use queries::{GetProductError, GetProductQuery, StatusItem};
pub use routes::products_routes;
