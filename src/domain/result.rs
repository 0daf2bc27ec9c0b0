//! Result type alias for docsync
//!
//! This module provides a convenient Result type alias that uses SyncError
//! as the error type.

use super::errors::{StoreError, SyncError};

/// Result type alias for docsync operations
///
/// # Examples
///
/// ```
/// use docsync::domain::result::Result;
/// use docsync::domain::errors::SyncError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(SyncError::Configuration("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, SyncError>;

/// Result type alias for raw document store calls
pub type StoreResult<T> = std::result::Result<T, StoreError>;
