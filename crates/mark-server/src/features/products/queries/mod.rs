pub mod get;
pub mod statuses;

pub use get::{GetProductError, GetProductQuery};
pub use statuses::StatusItem;
