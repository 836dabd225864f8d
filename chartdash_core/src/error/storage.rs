//! Storage layer error types

use thiserror::Error;

/// Errors from the cache store or the raw-record store
#[derive(Error, Debug)]
pub enum StorageError {
    /// The durable cache store could not be reached
    #[error("Cache store unavailable: {message}")]
    CacheUnavailable { message: String },

    /// A query against the record store failed
    #[error("Record store query failed: {message}")]
    Query { message: String },

    /// Connecting to the database failed
    #[error("Failed to connect to database: {message}")]
    Connection { message: String },

    /// A schema migration failed
    #[error("Failed to apply migration {version}: {message}")]
    Migration { version: i32, message: String },
}

impl StorageError {
    /// Create a cache unavailable error
    pub fn cache_unavailable(message: impl Into<String>) -> Self {
        Self::CacheUnavailable {
            message: message.into(),
        }
    }

    /// Create a query error
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a migration error
    pub fn migration(version: i32, message: impl Into<String>) -> Self {
        Self::Migration {
            version,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_unavailable_error() {
        let error = StorageError::cache_unavailable("table missing");
        assert!(error.to_string().contains("Cache store unavailable"));
        assert!(error.to_string().contains("table missing"));
    }

    #[test]
    fn test_migration_error_includes_version() {
        let error = StorageError::migration(2, "duplicate column");
        assert!(error.to_string().contains('2'));
        assert!(error.to_string().contains("duplicate column"));
    }
}
