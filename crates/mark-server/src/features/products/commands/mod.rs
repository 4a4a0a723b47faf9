pub mod create;
pub mod delete;
pub mod update;

pub use create::{CreateProductCommand, CreateProductError};
pub use delete::{DeleteProductCommand, DeleteProductError, DeleteProductResponse};
pub use update::{UpdateProductCommand, UpdateProductError};
