//! Import summary and reporting

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// An import job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportJob {
    /// Embedded security-control catalog
    Controls,
    /// Customer records from the upstream API
    Customers,
}

impl ImportJob {
    pub const ALL: [ImportJob; 2] = [ImportJob::Controls, ImportJob::Customers];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImportJob::Controls => "controls",
            ImportJob::Customers => "customers",
        }
    }
}

impl fmt::Display for ImportJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImportJob {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "controls" => Ok(ImportJob::Controls),
            "customers" => Ok(ImportJob::Customers),
            other => Err(format!(
                "Unknown import job '{other}'. Must be one of: controls, customers"
            )),
        }
    }
}

/// Outcome of one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Succeeded,
    /// Source was read but nothing was written
    DryRun,
    Failed(String),
    /// Not started because shutdown was requested
    Skipped,
}

/// Report for one job
#[derive(Debug, Clone)]
pub struct JobReport {
    pub job: ImportJob,

    /// Records read from the source
    pub fetched: usize,

    /// Records acknowledged by the store
    pub imported: usize,

    /// Bulk procedure invocations
    pub invocations: usize,

    pub duration: Duration,

    pub status: JobStatus,
}

impl JobReport {
    pub fn new(job: ImportJob) -> Self {
        Self {
            job,
            fetched: 0,
            imported: 0,
            invocations: 0,
            duration: Duration::ZERO,
            status: JobStatus::Succeeded,
        }
    }

    pub fn failed(job: ImportJob, message: impl Into<String>, duration: Duration) -> Self {
        Self {
            duration,
            status: JobStatus::Failed(message.into()),
            ..Self::new(job)
        }
    }

    pub fn skipped(job: ImportJob) -> Self {
        Self {
            status: JobStatus::Skipped,
            ..Self::new(job)
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, JobStatus::Failed(_))
    }
}

/// Summary of an import run
#[derive(Debug, Clone, Default)]
pub struct ImportSummary {
    pub jobs: Vec<JobReport>,

    pub duration: Duration,

    /// Whether the run started later than scheduled
    pub past_due: bool,
}

impl ImportSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn add(&mut self, report: JobReport) {
        self.jobs.push(report);
    }

    /// Report for a job, if it ran
    pub fn job(&self, job: ImportJob) -> Option<&JobReport> {
        self.jobs.iter().find(|r| r.job == job)
    }

    pub fn failed_jobs(&self) -> usize {
        self.jobs.iter().filter(|r| r.is_failed()).count()
    }

    pub fn total_imported(&self) -> usize {
        self.jobs.iter().map(|r| r.imported).sum()
    }

    /// Check if every job that ran succeeded
    pub fn is_successful(&self) -> bool {
        self.failed_jobs() == 0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            jobs = self.jobs.len(),
            failed = self.failed_jobs(),
            imported = self.total_imported(),
            past_due = self.past_due,
            duration_ms = self.duration.as_millis() as u64,
            "Import run completed"
        );

        for report in &self.jobs {
            match &report.status {
                JobStatus::Failed(message) => tracing::warn!(
                    job = %report.job,
                    error = %message,
                    "Import job failed"
                ),
                status => tracing::debug!(
                    job = %report.job,
                    status = ?status,
                    fetched = report.fetched,
                    imported = report.imported,
                    invocations = report.invocations,
                    "Import job report"
                ),
            }
        }
    }
}
