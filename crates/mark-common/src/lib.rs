//! Mark Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared entity shapes, error handling and logging for the mark workspace.
//!
//! # Overview
//!
//! - **Types**: the ledger product and external catalog entry shapes that the
//!   server persists and that outer CRUD layers read and write
//! - **Error Handling**: conversion errors for those shapes
//! - **Logging**: tracing subscriber setup shared by every binary
//!
//! # Example
//!
//! ```no_run
//! use mark_common::types::ProductStatus;
//!
//! let status = ProductStatus::try_from(1_i16)?;
//! assert_eq!(status, ProductStatus::OnBalance);
//! # Ok::<(), mark_common::MarkError>(())
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{MarkError, Result};
pub use types::{CatalogEntry, LedgerProduct, ProductStatus};
