//! CLI command implementations
//!
//! Commands return a process exit code: 0 success, 1 completed with failed
//! jobs, 2 configuration error, 4 connection or provisioning error, 5 fatal.

pub mod import;
pub mod init;
pub mod provision;
pub mod run;
pub mod validate;

use crate::adapters::cosmosdb::ConnectionProvider;
use crate::config::{load_config, SyncConfig};
use crate::core::import::{ImportSummary, JobStatus};
use std::sync::Arc;

/// Load configuration, printing the error on failure
pub(crate) fn load_or_report(config_path: &str) -> Option<SyncConfig> {
    match load_config(config_path) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            eprintln!("Failed to load configuration: {e}");
            None
        }
    }
}

pub(crate) fn provider(config: &SyncConfig) -> Arc<ConnectionProvider> {
    Arc::new(ConnectionProvider::new(config.cosmosdb.clone()))
}

/// Print an import summary and map it to an exit code
pub(crate) fn report_summary(summary: &ImportSummary) -> i32 {
    println!();
    println!("Import Summary:");
    for report in &summary.jobs {
        let status = match &report.status {
            JobStatus::Succeeded => "ok".to_string(),
            JobStatus::DryRun => "dry run".to_string(),
            JobStatus::Skipped => "skipped".to_string(),
            JobStatus::Failed(message) => format!("failed: {message}"),
        };
        println!(
            "  {:<10} read {:>5}  written {:>5}  ({:.2}s) {status}",
            report.job.as_str(),
            report.fetched,
            report.imported,
            report.duration.as_secs_f64()
        );
    }
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!();

    if summary.is_successful() {
        println!("Import completed successfully");
        0
    } else {
        println!("Import completed with {} failed job(s)", summary.failed_jobs());
        1
    }
}
