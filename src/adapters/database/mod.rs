//! Document store abstraction layer
//!
//! This module provides the trait every document store backend implements,
//! allowing the repository layer to run against Azure Cosmos DB or the
//! in-memory store used in tests.

pub mod traits;

pub use traits::{DocumentStore, QueryPage};
