//! Import command implementation
//!
//! Runs the enabled import jobs once, or a single job with `--job`.

use super::{load_or_report, provider, report_summary};
use crate::core::import::{ImportCoordinator, ImportJob};
use clap::Args;
use tokio::sync::watch;

/// Arguments for the import command
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Run only this job (controls or customers)
    #[arg(long)]
    pub job: Option<ImportJob>,

    /// Read sources without writing to Cosmos DB
    #[arg(long)]
    pub dry_run: bool,
}

impl ImportArgs {
    /// Execute the import command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting import command");

        let Some(config) = load_or_report(config_path) else {
            return Ok(2);
        };

        let dry_run = self.dry_run || config.application.dry_run;
        if dry_run {
            println!("DRY RUN MODE - No documents will be written");
            println!();
        }

        let coordinator = ImportCoordinator::new(config.clone(), provider(&config))
            .with_dry_run(dry_run)
            .with_shutdown(shutdown_signal);

        let jobs = match self.job {
            Some(job) => vec![job],
            None => coordinator.enabled_jobs(),
        };
        if jobs.is_empty() {
            println!("No import jobs are enabled");
            return Ok(0);
        }

        let summary = coordinator.run(&jobs).await;
        Ok(report_summary(&summary))
    }
}
