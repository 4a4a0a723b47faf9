pub mod clear;
pub mod upload;

pub use clear::{ClearCatalogCommand, ClearCatalogResponse};
pub use upload::{UploadCatalogCommand, UploadCatalogResponse};
