//! Import jobs
//!
//! - [`catalog`] - embedded security-control catalog (CSV)
//! - [`customers`] - customer records from an HTTP source
//! - [`coordinator`] - runs jobs against the document repositories
//! - [`summary`] - per-job reports

pub mod catalog;
pub mod coordinator;
pub mod customers;
pub mod summary;

pub use coordinator::ImportCoordinator;
pub use customers::CustomerSource;
pub use summary::{ImportJob, ImportSummary, JobReport, JobStatus};
