//! Azure Cosmos DB integration
//!
//! This module provides the Cosmos DB document store, the shared connection
//! provider, and the document serialization policy.

pub mod client;
pub mod codec;
pub mod rest;
pub mod store;

pub use client::ConnectionProvider;
pub use codec::{DocumentCodec, PARTITION_KEY_FIELD, PARTITION_KEY_PATH};
pub use rest::CosmosRestClient;
pub use store::CosmosStore;
