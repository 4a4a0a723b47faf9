//! Classification of storage failures
//!
//! Repositories report a closed [`StorageFailureKind`]; callers convert it to
//! the matching [`CatalogError`] with an exhaustive match. For PostgreSQL the
//! kind is derived from the SQLSTATE class of the server error, or from the
//! client-side `sqlx::Error` variant when the server never answered.

use thiserror::Error;

use crate::catalog::error::CatalogError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageFailureKind {
    /// Unique, foreign key, not-null or check constraint
    IntegrityViolation,
    /// Value out of range, bad encoding, invalid datetime
    DataException,
    /// Connection refused or lost, pool exhausted, server shutting down
    ConnectionFailure,
    /// Syntax error, unknown relation or column, undecodable row
    MalformedQuery,
    /// Internal error reported by the engine itself
    EngineInternal,
    Other,
}

/// A failed storage call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind:?}: {message}")]
pub struct StorageFailure {
    pub kind: StorageFailureKind,
    pub message: String,
}

impl StorageFailure {
    pub fn new(kind: StorageFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Map a SQLSTATE code to a failure kind by its two-character class
pub fn classify_sqlstate(code: &str) -> StorageFailureKind {
    match code.get(..2) {
        Some("23") => StorageFailureKind::IntegrityViolation,
        Some("22") => StorageFailureKind::DataException,
        Some("08" | "53" | "57" | "58") => StorageFailureKind::ConnectionFailure,
        Some("42") => StorageFailureKind::MalformedQuery,
        Some("XX") => StorageFailureKind::EngineInternal,
        _ => StorageFailureKind::Other,
    }
}

pub fn classify(error: &sqlx::Error) -> StorageFailureKind {
    match error {
        sqlx::Error::Database(db_err) => db_err
            .code()
            .map_or(StorageFailureKind::Other, |code| classify_sqlstate(&code)),
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => StorageFailureKind::ConnectionFailure,
        sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::TypeNotFound { .. } => StorageFailureKind::MalformedQuery,
        _ => StorageFailureKind::Other,
    }
}

impl From<sqlx::Error> for StorageFailure {
    fn from(error: sqlx::Error) -> Self {
        Self::new(classify(&error), error.to_string())
    }
}

impl From<StorageFailure> for CatalogError {
    fn from(failure: StorageFailure) -> Self {
        let StorageFailure { kind, message } = failure;
        match kind {
            StorageFailureKind::IntegrityViolation => CatalogError::Conflict(message),
            StorageFailureKind::DataException => CatalogError::BadData(message),
            StorageFailureKind::ConnectionFailure => {
                tracing::error!(cause = %message, "Storage unavailable");
                CatalogError::Unavailable(message)
            },
            StorageFailureKind::MalformedQuery => CatalogError::BadQuery(message),
            StorageFailureKind::EngineInternal => {
                tracing::error!(cause = %message, "Storage engine fault");
                CatalogError::ServerFault(message)
            },
            StorageFailureKind::Other => {
                tracing::error!(cause = %message, "Unclassified storage failure");
                CatalogError::ServerFault(message)
            },
        }
    }
}
