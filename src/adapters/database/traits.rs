//! Document store abstraction traits
//!
//! This module defines the wire-level contract a document store backend must
//! implement to be driven by the repository layer. Every method addresses a
//! single database/collection pair that the implementation was built for.

use crate::domain::StoreResult;
use crate::repository::query::QuerySpec;
use async_trait::async_trait;
use serde_json::Value;

/// One page of query results
#[derive(Debug, Clone, Default)]
pub struct QueryPage {
    /// Raw documents in store order
    pub documents: Vec<Value>,

    /// Opaque token for the next page; `None` when the feed is exhausted
    pub continuation: Option<String>,
}

/// Document store trait
///
/// Implementations classify failures into [`StoreError`](crate::domain::StoreError)
/// kinds; "not found" and "conflict" must be reported as such so the
/// provisioning layer can tell them apart from real failures.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read the database, failing with `NotFound` if it does not exist
    async fn read_database(&self, database: &str) -> StoreResult<()>;

    /// Create the database, failing with `Conflict` if it already exists
    async fn create_database(&self, database: &str) -> StoreResult<()>;

    /// Read a collection, failing with `NotFound` if it does not exist
    async fn read_collection(&self, database: &str, collection: &str) -> StoreResult<()>;

    /// Create a collection partitioned on `partition_key_path`
    ///
    /// `throughput` is the provisioned request-unit budget; `None` leaves the
    /// store default.
    async fn create_collection(
        &self,
        database: &str,
        collection: &str,
        partition_key_path: &str,
        throughput: Option<u32>,
    ) -> StoreResult<()>;

    /// Read a stored procedure, failing with `NotFound` if it does not exist
    async fn read_procedure(&self, database: &str, collection: &str, name: &str)
        -> StoreResult<()>;

    /// Register a stored procedure body under `name`
    async fn create_procedure(
        &self,
        database: &str,
        collection: &str,
        name: &str,
        body: &str,
    ) -> StoreResult<()>;

    /// Point read by id within a partition
    ///
    /// Returns `Ok(None)` when the document does not exist.
    async fn read_document(
        &self,
        database: &str,
        collection: &str,
        partition: &str,
        id: &str,
    ) -> StoreResult<Option<Value>>;

    /// Insert or replace a document matched by its `id` property
    ///
    /// Returns the stored representation.
    async fn upsert_document(
        &self,
        database: &str,
        collection: &str,
        partition: &str,
        document: Value,
    ) -> StoreResult<Value>;

    /// Fetch a single page of a query
    ///
    /// `max_items` of `None` uses the store's default page size.
    async fn query_page(
        &self,
        database: &str,
        collection: &str,
        partition: &str,
        query: &QuerySpec,
        continuation: Option<String>,
        max_items: Option<u32>,
    ) -> StoreResult<QueryPage>;

    /// Execute a stored procedure within a partition and return its response body
    async fn execute_procedure(
        &self,
        database: &str,
        collection: &str,
        name: &str,
        partition: &str,
        args: Vec<Value>,
    ) -> StoreResult<Value>;
}
