//! Helpers shared by feature slices

pub mod error_helpers;
pub mod validation;
