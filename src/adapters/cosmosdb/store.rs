//! Cosmos DB document store
//!
//! Implements [`DocumentStore`] on top of the `azure_data_cosmos` SDK for
//! database and container operations, and [`CosmosRestClient`] for
//! documents, stored procedures and paged queries.

use crate::adapters::cosmosdb::rest::CosmosRestClient;
use crate::adapters::database::{DocumentStore, QueryPage};
use crate::config::CosmosDbConfig;
use crate::domain::{Result, StoreError, StoreResult, SyncError};
use crate::repository::query::QuerySpec;
use async_trait::async_trait;
use azure_core::credentials::Secret;
use azure_data_cosmos::models::{
    ContainerProperties, IndexingPolicy, PartitionKeyDefinition, ThroughputProperties,
};
use azure_data_cosmos::{CosmosClient, CosmosClientOptions, CreateContainerOptions};
use serde_json::Value;
use std::borrow::Cow;
use std::time::Duration;

/// Cosmos DB backed document store
pub struct CosmosStore {
    client: CosmosClient,
    rest: CosmosRestClient,
    endpoint: String,
}

impl CosmosStore {
    /// Connect to the account described by `config`
    ///
    /// No request is sent; the SDK and REST clients are only constructed.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Connection` if either client cannot be created.
    pub fn connect(config: &CosmosDbConfig) -> Result<Self> {
        use secrecy::ExposeSecret;

        let key_str: String = config.key.expose_secret().clone().into();
        let options = Some(CosmosClientOptions::default());

        let client = CosmosClient::with_key(&config.endpoint, Secret::new(key_str.clone()), options)
            .map_err(|e| SyncError::Connection(format!("Failed to create Cosmos client: {e}")))?;

        let rest = CosmosRestClient::new(
            &config.endpoint,
            &key_str,
            Duration::from_secs(config.request_timeout_seconds),
        )?;

        tracing::info!(endpoint = %config.endpoint, "Cosmos DB client created");

        Ok(Self {
            client,
            rest,
            endpoint: config.endpoint.clone(),
        })
    }

    /// Get the endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Map an SDK error onto the store taxonomy
fn classify(context: &str, err: azure_core::Error) -> StoreError {
    let status = err.http_status().map(u16::from);
    classify_status(context, status, &err.to_string())
}

/// Errors without an HTTP response are transport failures
fn classify_status(context: &str, status: Option<u16>, text: &str) -> StoreError {
    let message = format!("{context}: {text}");
    match status {
        Some(code) => StoreError::from_status(code, message),
        None => StoreError::Transport(message),
    }
}

#[async_trait]
impl DocumentStore for CosmosStore {
    async fn read_database(&self, database: &str) -> StoreResult<()> {
        self.client
            .database_client(database)
            .read(None)
            .await
            .map(|_| ())
            .map_err(|e| classify(&format!("Failed to read database {database}"), e))
    }

    async fn create_database(&self, database: &str) -> StoreResult<()> {
        self.client
            .create_database(database, None)
            .await
            .map(|_| ())
            .map_err(|e| classify(&format!("Failed to create database {database}"), e))
    }

    async fn read_collection(&self, database: &str, collection: &str) -> StoreResult<()> {
        self.client
            .database_client(database)
            .container_client(collection)
            .read(None)
            .await
            .map(|_| ())
            .map_err(|e| classify(&format!("Failed to read container {collection}"), e))
    }

    async fn create_collection(
        &self,
        database: &str,
        collection: &str,
        partition_key_path: &str,
        throughput: Option<u32>,
    ) -> StoreResult<()> {
        let partition_key_def = PartitionKeyDefinition {
            paths: vec![partition_key_path.to_string()],
            kind: azure_data_cosmos::models::PartitionKeyKind::Hash,
            version: None,
        };

        let properties = ContainerProperties {
            id: Cow::Owned(collection.to_string()),
            partition_key: partition_key_def,
            indexing_policy: Some(IndexingPolicy::default()),
            ..Default::default()
        };

        let options = throughput.map(|rus| CreateContainerOptions {
            throughput: Some(ThroughputProperties::manual(rus as usize)),
            ..Default::default()
        });

        self.client
            .database_client(database)
            .create_container(properties, options)
            .await
            .map(|_| ())
            .map_err(|e| classify(&format!("Failed to create container {collection}"), e))
    }

    async fn read_procedure(
        &self,
        database: &str,
        collection: &str,
        name: &str,
    ) -> StoreResult<()> {
        self.rest.read_procedure(database, collection, name).await
    }

    async fn create_procedure(
        &self,
        database: &str,
        collection: &str,
        name: &str,
        body: &str,
    ) -> StoreResult<()> {
        self.rest
            .create_procedure(database, collection, name, body)
            .await
    }

    async fn read_document(
        &self,
        database: &str,
        collection: &str,
        partition: &str,
        id: &str,
    ) -> StoreResult<Option<Value>> {
        self.rest
            .read_document(database, collection, partition, id)
            .await
    }

    async fn upsert_document(
        &self,
        database: &str,
        collection: &str,
        partition: &str,
        document: Value,
    ) -> StoreResult<Value> {
        self.rest
            .upsert_document(database, collection, partition, document)
            .await
    }

    async fn query_page(
        &self,
        database: &str,
        collection: &str,
        partition: &str,
        query: &QuerySpec,
        continuation: Option<String>,
        max_items: Option<u32>,
    ) -> StoreResult<QueryPage> {
        self.rest
            .query_page(
                database,
                collection,
                partition,
                &query.sql,
                continuation,
                max_items,
            )
            .await
    }

    async fn execute_procedure(
        &self,
        database: &str,
        collection: &str,
        name: &str,
        partition: &str,
        args: Vec<Value>,
    ) -> StoreResult<Value> {
        self.rest
            .execute_procedure(database, collection, name, partition, args)
            .await
    }
}
