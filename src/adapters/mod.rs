//! External system integrations for docsync.
//!
//! - [`database`] - Document store abstraction (trait-based)
//! - [`cosmosdb`] - Azure Cosmos DB implementation and connection provider
//! - [`memory`] - In-memory implementation used by tests
//!
//! # Cosmos DB Adapter
//!
//! ```rust,no_run
//! use docsync::adapters::cosmosdb::ConnectionProvider;
//! use docsync::config::{secret_string, CosmosDbConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CosmosDbConfig {
//!     endpoint: "https://account.documents.azure.com:443/".to_string(),
//!     key: secret_string("a2V5".to_string()),
//!     database_name: "catalog-db".to_string(),
//!     throughput: Some(400),
//!     procedure_name: "BulkImport".to_string(),
//!     request_timeout_seconds: 30,
//! };
//!
//! let provider = ConnectionProvider::new(config);
//! let store = provider.client().await?;
//! store.read_database("catalog-db").await?;
//! # Ok(())
//! # }
//! ```

pub mod cosmosdb;
pub mod database;
pub mod memory;
