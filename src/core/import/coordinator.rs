//! Import coordinator - runs the configured import jobs
//!
//! Jobs run one after another against repositories sharing a single
//! [`ConnectionProvider`]. A failing job is recorded in the summary and the
//! next job still runs.

use crate::adapters::cosmosdb::ConnectionProvider;
use crate::config::SyncConfig;
use crate::core::import::catalog;
use crate::core::import::customers::CustomerSource;
use crate::core::import::summary::{ImportJob, ImportSummary, JobReport, JobStatus};
use crate::domain::{Customer, Entity, Result, SecurityControl};
use crate::repository::{DocumentRepository, ProvisionOutcome, RepositoryOptions};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Import coordinator
pub struct ImportCoordinator {
    config: SyncConfig,
    provider: Arc<ConnectionProvider>,
    dry_run: bool,
    shutdown: Option<watch::Receiver<bool>>,
}

impl ImportCoordinator {
    /// Create a coordinator; dry run follows `application.dry_run`
    pub fn new(config: SyncConfig, provider: Arc<ConnectionProvider>) -> Self {
        let dry_run = config.application.dry_run;
        Self {
            config,
            provider,
            dry_run,
            shutdown: None,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Stop starting new jobs once the signal reads `true`
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Jobs enabled in configuration, in run order
    pub fn enabled_jobs(&self) -> Vec<ImportJob> {
        ImportJob::ALL
            .into_iter()
            .filter(|job| match job {
                ImportJob::Controls => self.config.controls.enabled,
                ImportJob::Customers => self.config.customers.enabled,
            })
            .collect()
    }

    /// Run every enabled job
    pub async fn run_enabled(&self) -> ImportSummary {
        let jobs = self.enabled_jobs();
        self.run(&jobs).await
    }

    /// Run the given jobs sequentially
    pub async fn run(&self, jobs: &[ImportJob]) -> ImportSummary {
        let start = Instant::now();
        let mut summary = ImportSummary::new();

        if self.dry_run {
            tracing::info!("Dry run mode enabled - no documents will be written");
        }

        for &job in jobs {
            if self.shutdown_requested() {
                tracing::warn!(job = %job, "Shutdown requested, skipping import job");
                summary.add(JobReport::skipped(job));
                continue;
            }

            crate::log_import_start!(job);
            let job_start = Instant::now();
            match self.run_job(job).await {
                Ok(mut report) => {
                    report.duration = job_start.elapsed();
                    crate::log_import_complete!(job, report.imported, report.duration);
                    summary.add(report);
                }
                Err(e) => {
                    crate::log_error_with_context!(&e, format!("Import job '{job}' failed"));
                    summary.add(JobReport::failed(job, e.to_string(), job_start.elapsed()));
                }
            }
        }

        let summary = summary.with_duration(start.elapsed());
        summary.log_summary();
        summary
    }

    /// Initialize the repositories of every enabled job
    ///
    /// # Errors
    ///
    /// Stops at the first repository that cannot be provisioned.
    pub async fn provision(&self) -> Result<Vec<(ImportJob, ProvisionOutcome)>> {
        let mut outcomes = Vec::new();
        for job in self.enabled_jobs() {
            let outcome = match job {
                ImportJob::Controls => self.controls().initialize().await?,
                ImportJob::Customers => self.customers().initialize().await?,
            };
            outcomes.push((job, outcome));
        }
        Ok(outcomes)
    }

    async fn run_job(&self, job: ImportJob) -> Result<JobReport> {
        match job {
            ImportJob::Controls => {
                let controls = catalog::load_embedded()?;
                self.import(job, &self.controls(), controls).await
            }
            ImportJob::Customers => {
                let source = CustomerSource::from_config(&self.config.customers)?;
                let customers = source.fetch().await?;
                self.import(job, &self.customers(), customers).await
            }
        }
    }

    async fn import<T: Entity>(
        &self,
        job: ImportJob,
        repository: &DocumentRepository<T>,
        items: Vec<T>,
    ) -> Result<JobReport> {
        let mut report = JobReport::new(job);
        report.fetched = items.len();

        if self.dry_run {
            tracing::info!(
                job = %job,
                collection = %repository.collection(),
                count = items.len(),
                "Dry run: skipping write"
            );
            report.status = JobStatus::DryRun;
            return Ok(report);
        }

        repository.initialize().await?;
        let bulk = repository.add_or_update_many(&items).await?;
        report.imported = bulk.imported;
        report.invocations = bulk.invocations;
        Ok(report)
    }

    fn options(&self) -> RepositoryOptions {
        RepositoryOptions {
            procedure_name: self.config.cosmosdb.procedure_name.clone(),
            throughput: self.config.cosmosdb.throughput,
            page_size: None,
        }
    }

    /// Repository holding the control catalog
    pub fn controls(&self) -> DocumentRepository<SecurityControl> {
        DocumentRepository::with_options(
            Arc::clone(&self.provider),
            self.config.cosmosdb.database_name.clone(),
            self.config.controls.collection.clone(),
            self.options(),
        )
    }

    /// Repository holding customers
    pub fn customers(&self) -> DocumentRepository<Customer> {
        DocumentRepository::with_options(
            Arc::clone(&self.provider),
            self.config.cosmosdb.database_name.clone(),
            self.config.customers.collection.clone(),
            self.options(),
        )
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown.as_ref().is_some_and(|rx| *rx.borrow())
    }
}
