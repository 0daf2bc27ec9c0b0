//! Typed document repository
//!
//! [`DocumentRepository`] maps one entity type onto one collection. Documents
//! are written through the provider's [`DocumentCodec`] and stamped with the
//! entity kind, which is also the partition every operation targets.

use crate::adapters::cosmosdb::codec::PARTITION_KEY_PATH;
use crate::adapters::cosmosdb::{ConnectionProvider, DocumentCodec};
use crate::adapters::database::DocumentStore;
use crate::domain::{Entity, Result, StoreError};
use crate::repository::procedure::{BulkImportResponse, BULK_IMPORT_BODY, DEFAULT_PROCEDURE_NAME};
use crate::repository::provisioning::{ProvisionOutcome, Provisioner, ProvisioningPlan};
use crate::repository::query::{Filter, QuerySpec};
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

/// Per-repository settings
#[derive(Debug, Clone, PartialEq)]
pub struct RepositoryOptions {
    /// Name the bulk import procedure is registered under
    pub procedure_name: String,

    /// Provisioned throughput for a newly created collection
    pub throughput: Option<u32>,

    /// Page size requested by predicate queries; `None` uses the store default
    pub page_size: Option<u32>,
}

impl Default for RepositoryOptions {
    fn default() -> Self {
        Self {
            procedure_name: DEFAULT_PROCEDURE_NAME.to_string(),
            throughput: Some(400),
            page_size: None,
        }
    }
}

/// Result of a bulk upsert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkImportReport {
    /// Documents in the batch
    pub submitted: usize,

    /// Documents the procedure acknowledged
    pub imported: usize,

    /// Procedure invocations issued
    pub invocations: usize,
}

/// Repository for one entity type stored in one collection
pub struct DocumentRepository<T: Entity> {
    provider: Arc<ConnectionProvider>,
    database: String,
    collection: String,
    options: RepositoryOptions,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> DocumentRepository<T> {
    /// Create a repository with default options
    pub fn new(
        provider: Arc<ConnectionProvider>,
        database: impl Into<String>,
        collection: impl Into<String>,
    ) -> Self {
        Self::with_options(provider, database, collection, RepositoryOptions::default())
    }

    pub fn with_options(
        provider: Arc<ConnectionProvider>,
        database: impl Into<String>,
        collection: impl Into<String>,
        options: RepositoryOptions,
    ) -> Self {
        Self {
            provider,
            database: database.into(),
            collection: collection.into(),
            options,
            _entity: PhantomData,
        }
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn codec(&self) -> &DocumentCodec {
        self.provider.codec()
    }

    async fn store(&self) -> Result<Arc<dyn DocumentStore>> {
        self.provider.client().await
    }

    /// Provision the database, collection and bulk import procedure
    ///
    /// Safe to call on every start. When everything exists this issues three
    /// reads and no writes.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Connection` if the client cannot be built, or
    /// `SyncError::Provisioning` if a resource cannot be read or created.
    pub async fn initialize(&self) -> Result<ProvisionOutcome> {
        let store = self.store().await?;
        let plan = ProvisioningPlan {
            database: self.database.clone(),
            collection: self.collection.clone(),
            partition_key_path: PARTITION_KEY_PATH.to_string(),
            throughput: self.options.throughput,
            procedure_name: self.options.procedure_name.clone(),
            procedure_body: BULK_IMPORT_BODY.to_string(),
        };

        let outcome = Provisioner::new(store.as_ref()).ensure_ready(&plan).await?;
        tracing::info!(
            database = %self.database,
            collection = %self.collection,
            kind = T::KIND,
            created = outcome.created_any(),
            "Repository initialized"
        );
        Ok(outcome)
    }

    /// Insert or fully replace one entity, matched by id
    ///
    /// Returns the stored representation decoded back into `T`.
    pub async fn add_or_update(&self, item: &T) -> Result<T> {
        let document = self.codec().encode(item)?;
        let store = self.store().await?;

        let stored = store
            .upsert_document(&self.database, &self.collection, T::KIND, document)
            .await?;

        tracing::debug!(collection = %self.collection, id = %item.id(), "Document upserted");
        self.codec().decode(stored)
    }

    /// Upsert a batch through the bulk import procedure
    ///
    /// The batch is submitted in id order. When an invocation runs out of
    /// execution budget the remainder is resubmitted from the acknowledged
    /// offset until every document has been written. Requires
    /// [`initialize`](Self::initialize) to have registered the procedure.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::BulkImportStalled` if an invocation acknowledges
    /// nothing. Documents acknowledged before a failure remain written.
    pub async fn add_or_update_many(&self, items: &[T]) -> Result<BulkImportReport> {
        let mut report = BulkImportReport {
            submitted: items.len(),
            ..Default::default()
        };
        if items.is_empty() {
            return Ok(report);
        }

        let mut documents = items
            .iter()
            .map(|item| self.codec().encode(item))
            .collect::<Result<Vec<Value>>>()?;
        documents.sort_by(|a, b| document_id(a).cmp(document_id(b)));

        let store = self.store().await?;

        while report.imported < documents.len() {
            let remainder = Value::Array(documents[report.imported..].to_vec());
            let response = store
                .execute_procedure(
                    &self.database,
                    &self.collection,
                    &self.options.procedure_name,
                    T::KIND,
                    vec![remainder],
                )
                .await?;
            report.invocations += 1;

            let acknowledged = BulkImportResponse::parse(response)?.count;
            if acknowledged == 0 {
                return Err(StoreError::BulkImportStalled {
                    completed: report.imported,
                    total: documents.len(),
                }
                .into());
            }

            report.imported = (report.imported + acknowledged).min(documents.len());
            if report.imported < documents.len() {
                tracing::debug!(
                    collection = %self.collection,
                    imported = report.imported,
                    total = documents.len(),
                    "Bulk import budget exhausted, resubmitting remainder"
                );
            }
        }

        tracing::info!(
            collection = %self.collection,
            count = report.imported,
            invocations = report.invocations,
            "Bulk import complete"
        );
        Ok(report)
    }

    /// Point lookup by id; `None` when the document does not exist
    pub async fn get(&self, id: &str) -> Result<Option<T>> {
        let store = self.store().await?;
        match store
            .read_document(&self.database, &self.collection, T::KIND, id)
            .await?
        {
            Some(document) => self.codec().decode(document).map(Some),
            None => Ok(None),
        }
    }

    /// Read the collection with a single request
    ///
    /// Only the first page at the store's default page size is returned;
    /// continuation is not followed. Use [`query`](Self::query) with a
    /// filter that matches everything for a complete scan.
    pub async fn get_all(&self) -> Result<Vec<T>> {
        let store = self.store().await?;
        let page = store
            .query_page(
                &self.database,
                &self.collection,
                T::KIND,
                &QuerySpec::all(),
                None,
                None,
            )
            .await?;

        if page.continuation.is_some() {
            tracing::debug!(
                collection = %self.collection,
                returned = page.documents.len(),
                "get_all returned the first page only"
            );
        }
        self.decode_all(page.documents)
    }

    /// Return every entity matching `filter`, following continuation pages
    ///
    /// # Errors
    ///
    /// Returns `SyncError::QueryTranslation` before any request if the filter
    /// cannot be compiled.
    pub async fn query(&self, filter: &Filter) -> Result<Vec<T>> {
        let spec = QuerySpec::from_filter(filter)?;
        let store = self.store().await?;

        let mut documents = Vec::new();
        let mut continuation = None;
        let mut pages = 0usize;
        loop {
            let page = store
                .query_page(
                    &self.database,
                    &self.collection,
                    T::KIND,
                    &spec,
                    continuation,
                    self.options.page_size,
                )
                .await?;
            pages += 1;
            documents.extend(page.documents);

            match page.continuation {
                Some(token) => continuation = Some(token),
                None => break,
            }
        }

        tracing::debug!(
            collection = %self.collection,
            pages = pages,
            count = documents.len(),
            "Query complete"
        );
        self.decode_all(documents)
    }

    fn decode_all(&self, documents: Vec<Value>) -> Result<Vec<T>> {
        documents
            .into_iter()
            .map(|document| self.codec().decode(document))
            .collect()
    }
}

fn document_id(document: &Value) -> &str {
    document.get("id").and_then(Value::as_str).unwrap_or_default()
}
