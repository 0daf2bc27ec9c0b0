//! In-memory [`DocumentStore`] implementation
//!
//! Keeps databases, collections, procedures and documents in ordered maps
//! behind a single async mutex. Query pages are evaluated in process against
//! the compiled filter and ordered by document id; continuation tokens are
//! offsets into that ordering.
//!
//! Every registered procedure behaves as the bulk import procedure: the first
//! argument is an array of documents which are upserted in order, optionally
//! capped per invocation to emulate the remote execution budget.

use crate::adapters::database::{DocumentStore, QueryPage};
use crate::domain::{StoreError, StoreResult};
use crate::repository::query::QuerySpec;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tokio::sync::Mutex;

/// Default number of documents returned per query page
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Request counters, used to observe provisioning and paging behaviour
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub database_reads: usize,
    pub database_creates: usize,
    pub collection_reads: usize,
    pub collection_creates: usize,
    pub procedure_reads: usize,
    pub procedure_creates: usize,
    pub procedure_executions: usize,
    pub document_reads: usize,
    pub document_upserts: usize,
    pub query_pages: usize,
}

#[derive(Default)]
struct CollectionState {
    partition_field: String,
    throughput: Option<u32>,
    procedures: BTreeMap<String, String>,
    /// Keyed by (partition value, id)
    documents: BTreeMap<(String, String), Value>,
}

#[derive(Default)]
struct State {
    databases: BTreeMap<String, BTreeMap<String, CollectionState>>,
    stats: StoreStats,
    etag: u64,
}

impl State {
    fn collection(&self, database: &str, collection: &str) -> StoreResult<&CollectionState> {
        self.databases
            .get(database)
            .ok_or_else(|| StoreError::NotFound(format!("Database {database} does not exist")))?
            .get(collection)
            .ok_or_else(|| {
                StoreError::NotFound(format!("Collection {database}/{collection} does not exist"))
            })
    }

    fn collection_mut(
        &mut self,
        database: &str,
        collection: &str,
    ) -> StoreResult<&mut CollectionState> {
        self.databases
            .get_mut(database)
            .ok_or_else(|| StoreError::NotFound(format!("Database {database} does not exist")))?
            .get_mut(collection)
            .ok_or_else(|| {
                StoreError::NotFound(format!("Collection {database}/{collection} does not exist"))
            })
    }

    fn next_etag(&mut self) -> String {
        self.etag += 1;
        format!("\"{:016x}\"", self.etag)
    }
}

/// In-memory document store for tests and dry runs
pub struct MemoryStore {
    state: Mutex<State>,
    page_size: usize,
    procedure_budget: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            page_size: DEFAULT_PAGE_SIZE,
            procedure_budget: None,
        }
    }

    /// Set the page size used when a query does not specify one
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Cap the number of documents a single procedure invocation writes
    pub fn with_procedure_budget(mut self, budget: usize) -> Self {
        self.procedure_budget = Some(budget);
        self
    }

    /// Snapshot of the request counters
    pub async fn stats(&self) -> StoreStats {
        self.state.lock().await.stats.clone()
    }

    /// Number of documents stored in a collection, across partitions
    pub async fn document_count(&self, database: &str, collection: &str) -> usize {
        let state = self.state.lock().await;
        state
            .collection(database, collection)
            .map(|c| c.documents.len())
            .unwrap_or(0)
    }

    /// Body of a registered procedure
    pub async fn procedure_body(
        &self,
        database: &str,
        collection: &str,
        name: &str,
    ) -> Option<String> {
        let state = self.state.lock().await;
        state
            .collection(database, collection)
            .ok()
            .and_then(|c| c.procedures.get(name).cloned())
    }

    /// Throughput a collection was created with
    pub async fn collection_throughput(&self, database: &str, collection: &str) -> Option<u32> {
        let state = self.state.lock().await;
        state
            .collection(database, collection)
            .ok()
            .and_then(|c| c.throughput)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Write one document into a collection, stamping system properties
fn upsert_into(
    collection: &mut CollectionState,
    etag: String,
    partition: &str,
    document: Value,
) -> StoreResult<Value> {
    let (id, document) = prepare_document(&collection.partition_field, etag, partition, document)?;
    collection
        .documents
        .insert((partition.to_string(), id), document.clone());
    Ok(document)
}

/// Validate a document against its partition and stamp system properties
///
/// Returns the document id alongside the stamped document.
fn prepare_document(
    partition_field: &str,
    etag: String,
    partition: &str,
    mut document: Value,
) -> StoreResult<(String, Value)> {
    let object = document.as_object_mut().ok_or_else(|| StoreError::Request {
        status: 400,
        message: "Document must be a JSON object".to_string(),
    })?;

    let id = match object.get("id") {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        _ => {
            return Err(StoreError::Request {
                status: 400,
                message: "Document is missing a string 'id'".to_string(),
            })
        }
    };

    match object.get(partition_field) {
        Some(Value::String(value)) if value == partition => {}
        _ => {
            return Err(StoreError::Request {
                status: 400,
                message: format!(
                    "Partition key of document {id} does not match partition '{partition}'"
                ),
            })
        }
    }

    object.insert("_etag".to_string(), Value::String(etag));
    object.insert("_ts".to_string(), json!(chrono::Utc::now().timestamp()));
    Ok((id, document))
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn read_database(&self, database: &str) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        state.stats.database_reads += 1;
        if state.databases.contains_key(database) {
            Ok(())
        } else {
            Err(StoreError::NotFound(format!(
                "Database {database} does not exist"
            )))
        }
    }

    async fn create_database(&self, database: &str) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        state.stats.database_creates += 1;
        if state.databases.contains_key(database) {
            return Err(StoreError::Conflict(format!(
                "Database {database} already exists"
            )));
        }
        state
            .databases
            .insert(database.to_string(), BTreeMap::new());
        Ok(())
    }

    async fn read_collection(&self, database: &str, collection: &str) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        state.stats.collection_reads += 1;
        state.collection(database, collection).map(|_| ())
    }

    async fn create_collection(
        &self,
        database: &str,
        collection: &str,
        partition_key_path: &str,
        throughput: Option<u32>,
    ) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        state.stats.collection_creates += 1;

        let collections = state.databases.get_mut(database).ok_or_else(|| {
            StoreError::NotFound(format!("Database {database} does not exist"))
        })?;
        if collections.contains_key(collection) {
            return Err(StoreError::Conflict(format!(
                "Collection {database}/{collection} already exists"
            )));
        }

        collections.insert(
            collection.to_string(),
            CollectionState {
                partition_field: partition_key_path.trim_start_matches('/').to_string(),
                throughput,
                ..Default::default()
            },
        );
        Ok(())
    }

    async fn read_procedure(
        &self,
        database: &str,
        collection: &str,
        name: &str,
    ) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        state.stats.procedure_reads += 1;
        if state
            .collection(database, collection)?
            .procedures
            .contains_key(name)
        {
            Ok(())
        } else {
            Err(StoreError::NotFound(format!(
                "Procedure {name} does not exist"
            )))
        }
    }

    async fn create_procedure(
        &self,
        database: &str,
        collection: &str,
        name: &str,
        body: &str,
    ) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        state.stats.procedure_creates += 1;
        let coll = state.collection_mut(database, collection)?;
        if coll.procedures.contains_key(name) {
            return Err(StoreError::Conflict(format!(
                "Procedure {name} already exists"
            )));
        }
        coll.procedures.insert(name.to_string(), body.to_string());
        Ok(())
    }

    async fn read_document(
        &self,
        database: &str,
        collection: &str,
        partition: &str,
        id: &str,
    ) -> StoreResult<Option<Value>> {
        let mut state = self.state.lock().await;
        state.stats.document_reads += 1;
        Ok(state
            .collection(database, collection)?
            .documents
            .get(&(partition.to_string(), id.to_string()))
            .cloned())
    }

    async fn upsert_document(
        &self,
        database: &str,
        collection: &str,
        partition: &str,
        document: Value,
    ) -> StoreResult<Value> {
        let mut state = self.state.lock().await;
        state.stats.document_upserts += 1;
        let etag = state.next_etag();
        let coll = state.collection_mut(database, collection)?;
        upsert_into(coll, etag, partition, document)
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
        let mut state = self.state.lock().await;
        state.stats.query_pages += 1;

        let offset = match continuation {
            Some(token) => token.parse::<usize>().map_err(|_| StoreError::Request {
                status: 400,
                message: format!("Invalid continuation token '{token}'"),
            })?,
            None => 0,
        };
        let limit = max_items.map_or(self.page_size, |m| (m as usize).max(1));

        let matching: Vec<&Value> = state
            .collection(database, collection)?
            .documents
            .iter()
            .filter(|((p, _), doc)| p == partition && query.matches(doc))
            .map(|(_, doc)| doc)
            .collect();

        let documents: Vec<Value> = matching
            .iter()
            .skip(offset)
            .take(limit)
            .map(|doc| (*doc).clone())
            .collect();

        let next = offset + documents.len();
        let continuation = (next < matching.len()).then(|| next.to_string());

        Ok(QueryPage {
            documents,
            continuation,
        })
    }

    async fn execute_procedure(
        &self,
        database: &str,
        collection: &str,
        name: &str,
        partition: &str,
        args: Vec<Value>,
    ) -> StoreResult<Value> {
        let mut state = self.state.lock().await;
        state.stats.procedure_executions += 1;

        if !state
            .collection(database, collection)?
            .procedures
            .contains_key(name)
        {
            return Err(StoreError::NotFound(format!(
                "Procedure {name} does not exist"
            )));
        }

        let docs = match args.into_iter().next() {
            Some(Value::Array(docs)) => docs,
            _ => {
                return Err(StoreError::Request {
                    status: 400,
                    message: "The input content is invalid because the required properties - 'docs' - are missing".to_string(),
                })
            }
        };

        // One invocation is a single transaction: nothing is written unless
        // every document within the budget is accepted.
        let budget = self.procedure_budget.unwrap_or(docs.len());
        let partition_field = state.collection(database, collection)?.partition_field.clone();
        let mut staged = Vec::with_capacity(budget.min(docs.len()));
        for doc in docs.into_iter().take(budget) {
            let etag = state.next_etag();
            staged.push(prepare_document(&partition_field, etag, partition, doc)?);
        }

        let count = staged.len();
        let coll = state.collection_mut(database, collection)?;
        for (id, doc) in staged {
            coll.documents.insert((partition.to_string(), id), doc);
        }

        Ok(json!({ "count": count }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::query::Field;

    async fn provisioned() -> MemoryStore {
        let store = MemoryStore::new().with_page_size(2);
        store.create_database("db").await.unwrap();
        store
            .create_collection("db", "coll", "/docType", Some(400))
            .await
            .unwrap();
        store
    }

    fn doc(id: &str, kind: &str) -> Value {
        json!({ "id": id, "docType": kind, "name": format!("name-{id}") })
    }

    #[tokio::test]
    async fn test_missing_database_is_not_found() {
        let store = MemoryStore::new();
        let err = store.read_database("db").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_duplicate_create_is_conflict() {
        let store = provisioned().await;
        assert!(store.create_database("db").await.unwrap_err().is_conflict());
        assert!(store
            .create_collection("db", "coll", "/docType", None)
            .await
            .unwrap_err()
            .is_conflict());
        assert_eq!(store.collection_throughput("db", "coll").await, Some(400));
    }

    #[tokio::test]
    async fn test_upsert_stamps_system_properties() {
        let store = provisioned().await;
        store
            .upsert_document("db", "coll", "thing", doc("a", "thing"))
            .await
            .unwrap();

        let stored = store
            .read_document("db", "coll", "thing", "a")
            .await
            .unwrap()
            .unwrap();
        assert!(stored.get("_etag").is_some());
        assert!(stored.get("_ts").is_some());
    }

    #[tokio::test]
    async fn test_upsert_rejects_partition_mismatch() {
        let store = provisioned().await;
        let err = store
            .upsert_document("db", "coll", "other", doc("a", "thing"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Request { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_query_pages_follow_continuation() {
        let store = provisioned().await;
        for id in ["c", "a", "b"] {
            store
                .upsert_document("db", "coll", "thing", doc(id, "thing"))
                .await
                .unwrap();
        }
        store
            .upsert_document("db", "coll", "other", doc("z", "other"))
            .await
            .unwrap();

        let query = QuerySpec::all();
        let first = store
            .query_page("db", "coll", "thing", &query, None, None)
            .await
            .unwrap();
        assert_eq!(first.documents.len(), 2);
        assert_eq!(first.documents[0]["id"], "a");
        assert_eq!(first.continuation.as_deref(), Some("2"));

        let second = store
            .query_page("db", "coll", "thing", &query, first.continuation, None)
            .await
            .unwrap();
        assert_eq!(second.documents.len(), 1);
        assert_eq!(second.documents[0]["id"], "c");
        assert!(second.continuation.is_none());
    }

    #[tokio::test]
    async fn test_query_applies_filter() {
        let store = provisioned().await;
        for id in ["a", "b"] {
            store
                .upsert_document("db", "coll", "thing", doc(id, "thing"))
                .await
                .unwrap();
        }

        let query = QuerySpec::from_filter(&Field::new("name").eq("name-b")).unwrap();
        let page = store
            .query_page("db", "coll", "thing", &query, None, Some(10))
            .await
            .unwrap();
        assert_eq!(page.documents.len(), 1);
        assert_eq!(page.documents[0]["id"], "b");
    }

    #[tokio::test]
    async fn test_procedure_respects_budget() {
        let store = MemoryStore::new().with_procedure_budget(2);
        store.create_database("db").await.unwrap();
        store
            .create_collection("db", "coll", "/docType", None)
            .await
            .unwrap();
        store
            .create_procedure("db", "coll", "BulkImport", "function () {}")
            .await
            .unwrap();

        let docs = vec![doc("a", "thing"), doc("b", "thing"), doc("c", "thing")];
        let response = store
            .execute_procedure("db", "coll", "BulkImport", "thing", vec![Value::Array(docs)])
            .await
            .unwrap();

        assert_eq!(response, json!({ "count": 2 }));
        assert_eq!(store.document_count("db", "coll").await, 2);
    }

    #[tokio::test]
    async fn test_rejected_document_rolls_back_procedure() {
        let store = provisioned().await;
        store
            .create_procedure("db", "coll", "BulkImport", "function () {}")
            .await
            .unwrap();

        let docs = vec![doc("a", "thing"), doc("b", "other")];
        let err = store
            .execute_procedure("db", "coll", "BulkImport", "thing", vec![Value::Array(docs)])
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Request { status: 400, .. }));
        assert_eq!(store.document_count("db", "coll").await, 0);
        assert!(store
            .read_document("db", "coll", "thing", "a")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_unknown_procedure_is_not_found() {
        let store = provisioned().await;
        let err = store
            .execute_procedure("db", "coll", "Missing", "thing", vec![json!([])])
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
