//! Typed repositories over a document store
//!
//! - [`document`] - [`DocumentRepository`], one entity type per collection
//! - [`provisioning`] - idempotent database, collection and procedure setup
//! - [`query`] - [`Filter`] builder compiled to Cosmos SQL
//! - [`procedure`] - the bulk import stored procedure
//!
//! # Example
//!
//! ```rust,no_run
//! use docsync::adapters::cosmosdb::ConnectionProvider;
//! use docsync::adapters::memory::MemoryStore;
//! use docsync::domain::SecurityControl;
//! use docsync::repository::{DocumentRepository, Field};
//! use std::sync::Arc;
//!
//! # async fn example() -> docsync::domain::Result<()> {
//! let provider = Arc::new(ConnectionProvider::with_store(Arc::new(MemoryStore::new())));
//! let controls: DocumentRepository<SecurityControl> =
//!     DocumentRepository::new(provider, "catalog-db", "controls");
//!
//! controls.initialize().await?;
//! let mfa = controls.query(&Field::new("name").eq("MFA")).await?;
//! # Ok(())
//! # }
//! ```

pub mod document;
pub mod procedure;
pub mod provisioning;
pub mod query;

pub use document::{BulkImportReport, DocumentRepository, RepositoryOptions};
pub use procedure::{BulkImportResponse, BULK_IMPORT_BODY, DEFAULT_PROCEDURE_NAME};
pub use provisioning::{ProvisionOutcome, Provisioner, ProvisioningPlan};
pub use query::{Field, Filter, QuerySpec, SqlParameter, SqlQuery};
