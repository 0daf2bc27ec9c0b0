//! Cosmos DB REST calls not covered by the SDK
//!
//! The `azure_data_cosmos` crate has no stored procedure support, hides
//! continuation tokens behind its item stream and does not expose response
//! sub-status or write bodies. Procedures, paged queries and document point
//! operations go straight to the REST API using master-key authorization.

use crate::adapters::database::QueryPage;
use crate::domain::{Result, StoreError, StoreResult, SyncError};
use crate::repository::query::SqlQuery;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde::Deserialize;
use serde_json::{json, Value};
use sha2::Sha256;
use std::time::Duration;
use url::Url;

type HmacSha256 = Hmac<Sha256>;

const API_VERSION: &str = "2018-12-31";
const CONTINUATION_HEADER: &str = "x-ms-continuation";
const SUB_STATUS_HEADER: &str = "x-ms-substatus";

/// Sub-status of a 404 whose parent database or collection is missing
const OWNER_RESOURCE_MISSING: u32 = 1003;

/// Minimal Cosmos DB REST client
pub struct CosmosRestClient {
    http: Client,
    endpoint: Url,
    key: Vec<u8>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(rename = "Documents", default)]
    documents: Vec<Value>,
}

impl CosmosRestClient {
    /// Create a REST client for an account endpoint
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Connection` if the endpoint is not a URL, the key
    /// is not base64 or the HTTP client cannot be built.
    pub fn new(endpoint: &str, key: &str, timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| {
            SyncError::Connection(format!("Invalid Cosmos DB endpoint '{endpoint}': {e}"))
        })?;

        let key = STANDARD.decode(key.trim()).map_err(|e| {
            SyncError::Connection(format!("Cosmos DB key is not valid base64: {e}"))
        })?;

        let http = Client::builder().timeout(timeout).build().map_err(|e| {
            SyncError::Connection(format!("Failed to build HTTP client: {e}"))
        })?;

        Ok(Self {
            http,
            endpoint,
            key,
        })
    }

    /// Read a stored procedure definition
    pub async fn read_procedure(
        &self,
        database: &str,
        collection: &str,
        name: &str,
    ) -> StoreResult<()> {
        let segments = ["dbs", database, "colls", collection, "sprocs", name];
        self.send(Method::GET, &segments, "sprocs", &segments, HeaderMap::new(), None)
            .await
            .map(|_| ())
    }

    /// Register a stored procedure
    pub async fn create_procedure(
        &self,
        database: &str,
        collection: &str,
        name: &str,
        body: &str,
    ) -> StoreResult<()> {
        let segments = ["dbs", database, "colls", collection, "sprocs"];
        let link = ["dbs", database, "colls", collection];
        let payload = json!({ "id": name, "body": body });
        self.send(Method::POST, &segments, "sprocs", &link, HeaderMap::new(), Some(payload))
            .await
            .map(|_| ())
    }

    /// Execute a stored procedure within a partition
    pub async fn execute_procedure(
        &self,
        database: &str,
        collection: &str,
        name: &str,
        partition: &str,
        args: Vec<Value>,
    ) -> StoreResult<Value> {
        let segments = ["dbs", database, "colls", collection, "sprocs", name];
        let mut headers = HeaderMap::new();
        headers.insert("x-ms-documentdb-partitionkey", partition_header(partition)?);

        let (_, body) = self
            .send(Method::POST, &segments, "sprocs", &segments, headers, Some(Value::Array(args)))
            .await?;
        Ok(body)
    }

    /// Point read of a document within a partition
    ///
    /// A 404 for the document itself is `Ok(None)`. A 404 because the
    /// database or collection does not exist is `NotFound`.
    pub async fn read_document(
        &self,
        database: &str,
        collection: &str,
        partition: &str,
        id: &str,
    ) -> StoreResult<Option<Value>> {
        let segments = ["dbs", database, "colls", collection, "docs", id];
        let mut headers = HeaderMap::new();
        headers.insert("x-ms-documentdb-partitionkey", partition_header(partition)?);

        let response = self
            .execute(Method::GET, &segments, "docs", &segments, headers, None)
            .await?;
        if response.status == 404 && response.sub_status() != OWNER_RESOURCE_MISSING {
            return Ok(None);
        }

        let (_, body) = response.into_result()?;
        Ok(Some(body))
    }

    /// Insert or replace a document and return the stored representation
    pub async fn upsert_document(
        &self,
        database: &str,
        collection: &str,
        partition: &str,
        document: Value,
    ) -> StoreResult<Value> {
        let segments = ["dbs", database, "colls", collection, "docs"];
        let link = ["dbs", database, "colls", collection];
        let mut headers = HeaderMap::new();
        headers.insert("x-ms-documentdb-is-upsert", HeaderValue::from_static("True"));
        headers.insert("x-ms-documentdb-partitionkey", partition_header(partition)?);

        let (_, body) = self
            .send(Method::POST, &segments, "docs", &link, headers, Some(document))
            .await?;
        Ok(body)
    }

    /// Fetch one page of a query within a partition
    pub async fn query_page(
        &self,
        database: &str,
        collection: &str,
        partition: &str,
        query: &SqlQuery,
        continuation: Option<String>,
        max_items: Option<u32>,
    ) -> StoreResult<QueryPage> {
        let segments = ["dbs", database, "colls", collection, "docs"];
        let link = ["dbs", database, "colls", collection];

        let mut headers = HeaderMap::new();
        headers.insert("x-ms-documentdb-isquery", HeaderValue::from_static("True"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/query+json"));
        headers.insert("x-ms-documentdb-partitionkey", partition_header(partition)?);
        if let Some(max_items) = max_items {
            headers.insert("x-ms-max-item-count", HeaderValue::from(max_items));
        }
        if let Some(token) = continuation {
            headers.insert(CONTINUATION_HEADER, header_value(&token)?);
        }

        let body = serde_json::to_value(query)
            .map_err(|e| StoreError::InvalidResponse(format!("Failed to encode query: {e}")))?;

        let (response_headers, body) = self
            .send(Method::POST, &segments, "docs", &link, headers, Some(body))
            .await?;

        let page: QueryResponse = serde_json::from_value(body)
            .map_err(|e| StoreError::InvalidResponse(format!("Malformed query response: {e}")))?;

        let continuation = response_headers
            .get(CONTINUATION_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        Ok(QueryPage {
            documents: page.documents,
            continuation,
        })
    }

    async fn send(
        &self,
        method: Method,
        path: &[&str],
        resource_type: &str,
        resource_link: &[&str],
        headers: HeaderMap,
        body: Option<Value>,
    ) -> StoreResult<(HeaderMap, Value)> {
        let response = self
            .execute(method, path, resource_type, resource_link, headers, body)
            .await?;
        response.into_result()
    }

    /// Sign and send a request without interpreting the status
    async fn execute(
        &self,
        method: Method,
        path: &[&str],
        resource_type: &str,
        resource_link: &[&str],
        mut headers: HeaderMap,
        body: Option<Value>,
    ) -> StoreResult<RawResponse> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Transport("Endpoint cannot be a base URL".to_string()))?
            .pop_if_empty()
            .extend(path);

        let date = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        let token = authorization_token(
            &self.key,
            method.as_str(),
            resource_type,
            &resource_link.join("/"),
            &date,
        )?;
        headers.insert("authorization", header_value(&token)?);
        headers.insert("x-ms-date", header_value(&date)?);
        headers.insert("x-ms-version", HeaderValue::from_static(API_VERSION));

        if body.is_some() && !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        let mut request = self.http.request(method, url).headers(headers);
        if let Some(body) = body {
            let bytes = serde_json::to_vec(&body)
                .map_err(|e| StoreError::InvalidResponse(format!("Failed to encode body: {e}")))?;
            request = request.body(bytes);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let text = response
            .text()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        Ok(RawResponse {
            status,
            headers,
            text,
        })
    }
}

/// Unparsed REST response
struct RawResponse {
    status: u16,
    headers: HeaderMap,
    text: String,
}

impl RawResponse {
    fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Cosmos sub-status, `0` when the header is absent
    fn sub_status(&self) -> u32 {
        self.headers
            .get(SUB_STATUS_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }

    fn into_result(self) -> StoreResult<(HeaderMap, Value)> {
        if !self.is_success() {
            tracing::debug!(
                status = self.status,
                sub_status = self.sub_status(),
                body = %self.text,
                "Cosmos DB request failed"
            );
            return Err(StoreError::from_status(self.status, error_message(&self.text)));
        }

        let body = if self.text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&self.text)
                .map_err(|e| StoreError::InvalidResponse(format!("Response is not JSON: {e}")))?
        };

        Ok((self.headers, body))
    }
}

/// Build the master-key authorization header value
///
/// The signed payload is `verb\nresourceType\nresourceLink\ndate\n\n` with
/// verb, resource type and date lowercased.
pub(crate) fn authorization_token(
    key: &[u8],
    verb: &str,
    resource_type: &str,
    resource_link: &str,
    date: &str,
) -> StoreResult<String> {
    let payload = format!(
        "{}\n{}\n{}\n{}\n\n",
        verb.to_lowercase(),
        resource_type.to_lowercase(),
        resource_link,
        date.to_lowercase()
    );

    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| StoreError::Unauthorized(format!("Invalid signing key: {e}")))?;
    mac.update(payload.as_bytes());
    let signature = STANDARD.encode(mac.finalize().into_bytes());

    let token = format!("type=master&ver=1.0&sig={signature}");
    Ok(url::form_urlencoded::byte_serialize(token.as_bytes()).collect())
}

fn partition_header(partition: &str) -> StoreResult<HeaderValue> {
    header_value(&json!([partition]).to_string())
}

fn header_value(value: &str) -> StoreResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| StoreError::InvalidResponse(format!("Invalid header value: {e}")))
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}
