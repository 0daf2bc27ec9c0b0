//! Domain models and types for docsync.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Entity contract** ([`Entity`]) implemented by every repository-managed record
//! - **Synchronized records** ([`SecurityControl`], [`Customer`])
//! - **Error types** ([`SyncError`], [`StoreError`], [`QueryError`])
//! - **Result type aliases** ([`Result`], [`StoreResult`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, SyncError>`]:
//!
//! ```rust,no_run
//! use docsync::domain::Result;
//!
//! fn example() -> Result<()> {
//!     let config = docsync::config::load_config("docsync.toml")?;
//!     println!("{}", config.cosmosdb.database_name);
//!     Ok(())
//! }
//! ```

pub mod control;
pub mod customer;
pub mod entity;
pub mod errors;
pub mod result;

pub use control::{ControlLevel, SecurityControl};
pub use customer::{Customer, CustomerStatus};
pub use entity::Entity;
pub use errors::{QueryError, StoreError, SyncError};
pub use result::{Result, StoreResult};
