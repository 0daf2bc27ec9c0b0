//! Idempotent provisioning of databases, collections and procedures
//!
//! Each resource is read first and only created when the store reports it
//! missing. A conflict on create means a concurrent caller won the race and
//! is treated as success.

use crate::adapters::database::DocumentStore;
use crate::domain::{Result, StoreError, StoreResult, SyncError};
use std::future::Future;

/// Everything that must exist before documents can be written
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisioningPlan {
    pub database: String,
    pub collection: String,
    pub partition_key_path: String,
    pub throughput: Option<u32>,
    pub procedure_name: String,
    pub procedure_body: String,
}

/// What a provisioning pass actually created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProvisionOutcome {
    pub database_created: bool,
    pub collection_created: bool,
    pub procedure_created: bool,
}

impl ProvisionOutcome {
    /// Whether anything was created
    pub fn created_any(&self) -> bool {
        self.database_created || self.collection_created || self.procedure_created
    }
}

/// Ensures resources exist on a document store
pub struct Provisioner<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> Provisioner<'a> {
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Ensure database, collection and procedure exist, in that order
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Provisioning` naming the failing resource for any
    /// store error other than not-found on read or conflict on create.
    pub async fn ensure_ready(&self, plan: &ProvisioningPlan) -> Result<ProvisionOutcome> {
        let database_created = self.ensure_database(&plan.database).await?;
        let collection_created = self
            .ensure_collection(
                &plan.database,
                &plan.collection,
                &plan.partition_key_path,
                plan.throughput,
            )
            .await?;
        let procedure_created = self
            .ensure_procedure(
                &plan.database,
                &plan.collection,
                &plan.procedure_name,
                &plan.procedure_body,
            )
            .await?;

        Ok(ProvisionOutcome {
            database_created,
            collection_created,
            procedure_created,
        })
    }

    /// Ensure a database exists; returns whether this call created it
    pub async fn ensure_database(&self, database: &str) -> Result<bool> {
        ensure(
            &format!("database {database}"),
            self.store.read_database(database),
            || self.store.create_database(database),
        )
        .await
    }

    /// Ensure a collection exists; returns whether this call created it
    pub async fn ensure_collection(
        &self,
        database: &str,
        collection: &str,
        partition_key_path: &str,
        throughput: Option<u32>,
    ) -> Result<bool> {
        ensure(
            &format!("collection {database}/{collection}"),
            self.store.read_collection(database, collection),
            || {
                self.store
                    .create_collection(database, collection, partition_key_path, throughput)
            },
        )
        .await
    }

    /// Ensure a stored procedure exists; returns whether this call created it
    ///
    /// An existing procedure is left untouched even if its body differs.
    pub async fn ensure_procedure(
        &self,
        database: &str,
        collection: &str,
        name: &str,
        body: &str,
    ) -> Result<bool> {
        ensure(
            &format!("procedure {name} in {database}/{collection}"),
            self.store.read_procedure(database, collection, name),
            || self.store.create_procedure(database, collection, name, body),
        )
        .await
    }
}

async fn ensure<R, C, F>(resource: &str, read: R, create: C) -> Result<bool>
where
    R: Future<Output = StoreResult<()>>,
    C: FnOnce() -> F,
    F: Future<Output = StoreResult<()>>,
{
    match read.await {
        Ok(()) => {
            tracing::debug!(resource = %resource, "Resource already exists");
            return Ok(false);
        }
        Err(StoreError::NotFound(_)) => {}
        Err(e) => {
            return Err(SyncError::Provisioning(format!(
                "Failed to read {resource}: {e}"
            )))
        }
    }

    tracing::info!(resource = %resource, "Creating resource");
    match create().await {
        Ok(()) => {
            tracing::info!(resource = %resource, "Resource created");
            Ok(true)
        }
        Err(StoreError::Conflict(_)) => {
            tracing::debug!(resource = %resource, "Resource created concurrently");
            Ok(false)
        }
        Err(e) => Err(SyncError::Provisioning(format!(
            "Failed to create {resource}: {e}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;

    fn plan() -> ProvisioningPlan {
        ProvisioningPlan {
            database: "catalog-db".to_string(),
            collection: "controls".to_string(),
            partition_key_path: "/docType".to_string(),
            throughput: Some(400),
            procedure_name: "BulkImport".to_string(),
            procedure_body: "function bulkImport(docs) {}".to_string(),
        }
    }

    #[tokio::test]
    async fn test_creates_missing_resources() {
        let store = MemoryStore::new();
        let outcome = Provisioner::new(&store).ensure_ready(&plan()).await.unwrap();

        assert!(outcome.database_created);
        assert!(outcome.collection_created);
        assert!(outcome.procedure_created);
        assert_eq!(
            store.procedure_body("catalog-db", "controls", "BulkImport").await,
            Some("function bulkImport(docs) {}".to_string())
        );
        assert_eq!(store.collection_throughput("catalog-db", "controls").await, Some(400));
    }

    #[tokio::test]
    async fn test_second_pass_only_reads() {
        let store = MemoryStore::new();
        let provisioner = Provisioner::new(&store);
        provisioner.ensure_ready(&plan()).await.unwrap();
        let before = store.stats().await;

        let outcome = provisioner.ensure_ready(&plan()).await.unwrap();
        let after = store.stats().await;

        assert!(!outcome.created_any());
        assert_eq!(after.database_creates, before.database_creates);
        assert_eq!(after.collection_creates, before.collection_creates);
        assert_eq!(after.procedure_creates, before.procedure_creates);
        assert_eq!(after.database_reads, before.database_reads + 1);
    }

    #[tokio::test]
    async fn test_existing_procedure_body_is_kept() {
        let store = MemoryStore::new();
        let provisioner = Provisioner::new(&store);
        provisioner.ensure_ready(&plan()).await.unwrap();

        let mut changed = plan();
        changed.procedure_body = "function other() {}".to_string();
        provisioner.ensure_ready(&changed).await.unwrap();

        assert_eq!(
            store.procedure_body("catalog-db", "controls", "BulkImport").await,
            Some("function bulkImport(docs) {}".to_string())
        );
    }
}
