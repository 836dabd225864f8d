//! Error types for the dashboard analytics core
//!
//! This module contains all error types used throughout the library, organized
//! into logical categories for better maintainability and clarity.

use thiserror::Error;

pub mod internal;
pub mod storage;
pub mod validation;

pub use self::storage::StorageError;
pub use self::validation::ValidationError;
pub use internal::InternalError;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the dashboard analytics core
///
/// Errors are categorized into three main types:
/// - Storage errors: cache store and record store failures
/// - Validation errors: caller errors such as unknown report types
/// - Internal errors: serialization and invariant failures
#[derive(Error, Debug)]
pub enum Error {
    /// Storage related errors
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Validation related errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Internal library errors
    #[error(transparent)]
    Internal(#[from] InternalError),
}

// Conversions from external error types

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(StorageError::query(err.to_string()))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(InternalError::serialization(err.to_string()))
    }
}

impl Error {
    /// Whether this error originated in the storage layer
    ///
    /// The cache fallback coordinator uses this to decide whether an
    /// operation is eligible for the secondary cache.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}
