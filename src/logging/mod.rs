//! Logging and observability
//!
//! Structured logging through `tracing`:
//! - console output
//! - JSON log files with daily or hourly rotation
//! - level from configuration, overridable with `RUST_LOG`
//!
//! # Example
//!
//! ```no_run
//! use docsync::logging::init_logging;
//! use docsync::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(database = "catalog-db", "Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of an import job
///
/// ```no_run
/// use docsync::core::import::ImportJob;
/// use docsync::log_import_start;
///
/// log_import_start!(ImportJob::Controls);
/// ```
#[macro_export]
macro_rules! log_import_start {
    ($job:expr) => {
        tracing::info!(job = %$job, "Starting import");
    };
}

/// Log the completion of an import job
///
/// ```no_run
/// use docsync::core::import::ImportJob;
/// use docsync::log_import_complete;
/// use std::time::Duration;
///
/// log_import_complete!(ImportJob::Controls, 20, Duration::from_millis(850));
/// ```
#[macro_export]
macro_rules! log_import_complete {
    ($job:expr, $count:expr, $duration:expr) => {
        tracing::info!(
            job = %$job,
            count = $count,
            duration_ms = $duration.as_millis() as u64,
            "Import completed"
        );
    };
}

/// Log an error with context
///
/// ```no_run
/// use docsync::log_error_with_context;
/// use docsync::domain::SyncError;
///
/// let error = SyncError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = %$context,
            "Error occurred"
        );
    };
}

#[cfg(test)]
mod tests {
    use crate::core::import::ImportJob;
    use crate::domain::SyncError;
    use std::time::Duration;

    #[test]
    fn test_macros_expand_without_subscriber() {
        crate::log_import_start!(ImportJob::Customers);
        crate::log_import_complete!(ImportJob::Customers, 3usize, Duration::from_secs(1));
        crate::log_error_with_context!(
            &SyncError::Import("boom".to_string()),
            "customers import"
        );
    }
}
