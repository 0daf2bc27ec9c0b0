//! Domain error types
//!
//! This module defines the error hierarchy for docsync.
//! All errors are domain-specific and don't expose third-party SDK types.

use thiserror::Error;

/// Main docsync error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The store client could not be constructed (bad endpoint or credential)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Database, collection or procedure could not be read or created
    #[error("Provisioning error: {0}")]
    Provisioning(String),

    /// Document store operation errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A filter could not be expressed in the store's query language
    #[error("Query translation error: {0}")]
    QueryTranslation(#[from] QueryError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Import job errors (source fetch, parsing)
    #[error("Import error: {0}")]
    Import(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Document store errors
///
/// Classified responses from the remote (or in-memory) document store.
/// "Not found" and "conflict" are kept distinct so callers can treat them as
/// normal outcomes where appropriate.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Resource does not exist (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Resource already exists (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Request rate too large (429)
    #[error("Request rate too large (429): {0}")]
    Throttled(String),

    /// Authentication or authorization failed (401/403)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Any other non-success response
    #[error("Request failed: {status} - {message}")]
    Request { status: u16, message: String },

    /// Network-level failure before a response was received
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body could not be interpreted
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Bulk import made no progress on a resubmission
    #[error("Bulk import stalled: {completed}/{total} documents acknowledged")]
    BulkImportStalled { completed: usize, total: usize },
}

impl StoreError {
    /// Build an error from an HTTP status code and message
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            404 => StoreError::NotFound(message),
            409 => StoreError::Conflict(message),
            429 => StoreError::Throttled(message),
            401 | 403 => StoreError::Unauthorized(message),
            _ => StoreError::Request { status, message },
        }
    }

    /// Whether the store reported that the resource does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }

    /// Whether the store reported that the resource already exists
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict(_))
    }

    /// Whether the request was throttled
    pub fn is_throttled(&self) -> bool {
        matches!(self, StoreError::Throttled(_))
    }
}

/// Filter translation errors
///
/// Raised while compiling a [`Filter`](crate::repository::Filter) and always
/// before any request reaches the store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    /// Field path is empty or contains an empty segment
    #[error("Invalid field path '{0}'")]
    InvalidField(String),

    /// Operator cannot be applied to the given operand
    #[error("Unsupported operand for '{op}' on field '{field}': {reason}")]
    UnsupportedOperand {
        op: &'static str,
        field: String,
        reason: String,
    },

    /// Combinator or list with no members
    #[error("Empty '{0}' expression")]
    Empty(&'static str),
}

// Conversion from std::io::Error
impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<csv::Error> for SyncError {
    fn from(err: csv::Error) -> Self {
        SyncError::Import(format!("CSV error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_error_display() {
        let err = SyncError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_store_error_conversion() {
        let store_err = StoreError::Throttled("5 seconds".to_string());
        let sync_err: SyncError = store_err.into();
        assert!(matches!(sync_err, SyncError::Store(StoreError::Throttled(_))));
    }

    #[test]
    fn test_query_error_conversion() {
        let query_err = QueryError::Empty("and");
        let sync_err: SyncError = query_err.into();
        assert!(matches!(sync_err, SyncError::QueryTranslation(_)));
        assert_eq!(
            sync_err.to_string(),
            "Query translation error: Empty 'and' expression"
        );
    }

    #[test]
    fn test_store_error_from_status() {
        assert!(StoreError::from_status(404, "missing").is_not_found());
        assert!(StoreError::from_status(409, "exists").is_conflict());
        assert!(StoreError::from_status(429, "slow down").is_throttled());
        assert!(matches!(
            StoreError::from_status(403, "denied"),
            StoreError::Unauthorized(_)
        ));
        assert!(matches!(
            StoreError::from_status(503, "unavailable"),
            StoreError::Request { status: 503, .. }
        ));
    }

    #[test]
    fn test_bulk_stalled_display() {
        let err = StoreError::BulkImportStalled {
            completed: 3,
            total: 10,
        };
        assert_eq!(
            err.to_string(),
            "Bulk import stalled: 3/10 documents acknowledged"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let sync_err: SyncError = io_err.into();
        assert!(matches!(sync_err, SyncError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let sync_err: SyncError = json_err.into();
        assert!(matches!(sync_err, SyncError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let sync_err: SyncError = toml_err.into();
        assert!(matches!(sync_err, SyncError::Configuration(_)));
        assert!(sync_err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_sync_error_implements_std_error() {
        let err = SyncError::Provisioning("Test error".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
