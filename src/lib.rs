// docsync - Scheduled document synchronization for Azure Cosmos DB
// Copyright (c) 2025 docsync Contributors
// Licensed under the MIT License

//! # docsync - typed document repositories over Azure Cosmos DB
//!
//! docsync keeps reference data in a schemaless document store. It provides
//! a generic repository per entity type and a scheduled importer that feeds
//! it.
//!
//! ## Overview
//!
//! - **Connection Provider**: one lazily built, shared store client per
//!   process, owned and injected rather than global
//! - **Provisioning**: idempotent creation of database, collection and the
//!   bulk import stored procedure
//! - **Document Repository**: typed upsert, point lookup, single-page read
//!   and paged filter queries
//! - **Bulk Import**: batches written through a server-side procedure,
//!   resubmitting the remainder until fully acknowledged
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Import jobs and the daily schedule
//! - [`repository`] - Typed repositories, provisioning and query builder
//! - [`adapters`] - Document store implementations (Cosmos DB, in-memory)
//! - [`domain`] - Entities and error types
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docsync::adapters::cosmosdb::ConnectionProvider;
//! use docsync::config::load_config;
//! use docsync::domain::SecurityControl;
//! use docsync::repository::{DocumentRepository, Field};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("docsync.toml")?;
//!     let provider = Arc::new(ConnectionProvider::new(config.cosmosdb.clone()));
//!
//!     let controls: DocumentRepository<SecurityControl> =
//!         DocumentRepository::new(provider, &config.cosmosdb.database_name, "controls");
//!     controls.initialize().await?;
//!
//!     let identity = controls
//!         .query(&Field::new("domain").eq("Identity"))
//!         .await?;
//!     println!("{} identity controls", identity.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`domain::Result`], whose error type is
//! [`domain::SyncError`]. Store responses are classified by
//! [`domain::StoreError`]; a missing document on point lookup is `Ok(None)`.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
pub mod repository;
