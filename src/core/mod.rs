//! Core business logic for docsync.
//!
//! # Modules
//!
//! - [`import`] - Import jobs, coordination and reporting
//! - [`schedule`] - Daily trigger with past-due detection
//!
//! # Import Workflow
//!
//! 1. **Read**: parse the embedded control catalog or fetch customers
//! 2. **Provision**: initialize the target repository (database, collection,
//!    bulk import procedure)
//! 3. **Write**: bulk upsert through the stored procedure
//! 4. **Report**: log the import summary
//!
//! # Example
//!
//! ```rust,no_run
//! use docsync::adapters::cosmosdb::ConnectionProvider;
//! use docsync::config::load_config;
//! use docsync::core::import::ImportCoordinator;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("docsync.toml")?;
//! let provider = Arc::new(ConnectionProvider::new(config.cosmosdb.clone()));
//!
//! let coordinator = ImportCoordinator::new(config, provider);
//! let summary = coordinator.run_enabled().await;
//!
//! println!("Imported: {}", summary.total_imported());
//! println!("Failed jobs: {}", summary.failed_jobs());
//! # Ok(())
//! # }
//! ```

pub mod import;
pub mod schedule;
