//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `SearchIndexProvider`
//! using the OpenSearch Rust client.

use async_trait::async_trait;
use opensearch::{
    auth::Credentials,
    http::request::JsonBody,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesExistsParts},
    BulkParts, OpenSearch, SearchParts,
};
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::types::{BatchOperationResult, BatchOperationSummary};
use catalog_indexer_shared::ProductDocument;

/// Basic-auth credentials for the search engine.
#[derive(Debug, Clone)]
pub struct OpenSearchCredentials {
    pub username: String,
    pub password: String,
}

/// OpenSearch client implementation.
///
/// # Example
///
/// ```ignore
/// let client = OpenSearchClient::new("http://localhost:9200", None).await?;
/// if !client.index_exists("products").await? {
///     client.create_index("products").await?;
/// }
/// let summary = client.bulk_index_documents("products", &documents).await?;
/// ```
pub struct OpenSearchClient {
    client: OpenSearch,
}

impl OpenSearchClient {
    /// Create a new OpenSearch client connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The server URL (e.g., "http://localhost:9200")
    /// * `credentials` - Optional basic-auth credentials
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchClient)` - A new client instance
    /// * `Err(SearchIndexError)` - If connection setup fails
    pub async fn new(
        url: &str,
        credentials: Option<OpenSearchCredentials>,
    ) -> Result<Self, SearchIndexError> {
        let parsed_url =
            Url::parse(url).map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let mut builder = TransportBuilder::new(conn_pool).disable_proxy();
        let authenticated = credentials.is_some();
        if let Some(credentials) = credentials {
            builder = builder.auth(Credentials::Basic(
                credentials.username,
                credentials.password,
            ));
        }
        let transport = builder
            .build()
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(url = %url, authenticated, "Created OpenSearch client");

        Ok(Self { client })
    }

    /// Lines of the newline-delimited `_bulk` body: one `index` action per
    /// document followed by its sparse source. `index` replaces any existing
    /// document with the same `_id`.
    fn bulk_lines(index: &str, documents: &[ProductDocument]) -> Vec<Value> {
        let mut lines = Vec::with_capacity(documents.len() * 2);
        for doc in documents {
            lines.push(json!({"index": {"_index": index, "_id": doc.document_id()}}));
            lines.push(Value::Object(doc.to_source()));
        }
        lines
    }

    fn bulk_body(index: &str, documents: &[ProductDocument]) -> Vec<JsonBody<Value>> {
        Self::bulk_lines(index, documents)
            .into_iter()
            .map(JsonBody::from)
            .collect()
    }

    /// Turn a `_bulk` response into per-document results.
    ///
    /// Items are matched to documents by position. A document with no
    /// corresponding item is counted as failed so that the summary always
    /// accounts for every document sent.
    fn parse_bulk_response(
        response: &Value,
        documents: &[ProductDocument],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        let items = response
            .get("items")
            .and_then(Value::as_array)
            .ok_or_else(|| SearchIndexError::parse("Bulk response has no items array"))?;

        let mut results = Vec::with_capacity(documents.len());
        for (position, doc) in documents.iter().enumerate() {
            let Some(item) = items.get(position) else {
                results.push(BatchOperationResult::failed(
                    doc.document_id(),
                    None,
                    "No result reported for document",
                ));
                continue;
            };

            // Each item is keyed by its action name, e.g. {"index": {...}}.
            let action = item
                .as_object()
                .and_then(|obj| obj.values().next())
                .unwrap_or(&Value::Null);

            let document_id = action
                .get("_id")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| doc.document_id());
            let status = action
                .get("status")
                .and_then(Value::as_u64)
                .and_then(|s| u16::try_from(s).ok());

            match action.get("error") {
                Some(err) if !err.is_null() => {
                    results.push(BatchOperationResult::failed(
                        document_id,
                        status,
                        Self::error_reason(err),
                    ));
                }
                _ if status.is_some_and(|s| !(200..300).contains(&s)) => {
                    results.push(BatchOperationResult::failed(
                        document_id,
                        status,
                        format!("Item failed with status {}", status.unwrap_or_default()),
                    ));
                }
                _ => results.push(BatchOperationResult::succeeded(document_id, status)),
            }
        }

        Ok(BatchOperationSummary::from_results(results))
    }

    /// Extract a readable cause from an item error, which is either a string
    /// or an object with `type` and `reason`.
    fn error_reason(err: &Value) -> String {
        if let Some(reason) = err.as_str() {
            return reason.to_string();
        }
        let kind = err.get("type").and_then(Value::as_str);
        let reason = err.get("reason").and_then(Value::as_str);
        match (kind, reason) {
            (Some(kind), Some(reason)) => format!("{}: {}", kind, reason),
            (None, Some(reason)) => reason.to_string(),
            (Some(kind), None) => kind.to_string(),
            (None, None) => err.to_string(),
        }
    }

    /// Extract `hits.hits` from a `_search` response.
    fn parse_hits(response: &Value) -> Vec<Value> {
        response
            .get("hits")
            .and_then(|h| h.get("hits"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl SearchIndexProvider for OpenSearchClient {
    async fn index_exists(&self, index: &str) -> Result<bool, SearchIndexError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SearchIndexError::index(e.to_string()))?;

        let status = response.status_code();
        match status.as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            _ => {
                error!(status = %status, index = %index, "Index existence check failed");
                Err(SearchIndexError::index(format!(
                    "Index existence check for '{}' returned status {}",
                    index, status
                )))
            }
        }
    }

    async fn create_index(&self, index: &str) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(json!({}))
            .send()
            .await
            .map_err(|e| SearchIndexError::index(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            // Another writer created it between our check and this call.
            if error_body.contains("resource_already_exists_exception") {
                debug!(index = %index, "Index already exists");
                return Ok(());
            }
            error!(status = %status, body = %error_body, "Index creation failed");
            return Err(SearchIndexError::index(format!(
                "Creating index '{}' failed with status {}: {}",
                index, status, error_body
            )));
        }

        debug!(index = %index, "Index created");
        Ok(())
    }

    #[instrument(skip(self, documents), fields(document_count = documents.len()))]
    async fn bulk_index_documents(
        &self,
        index: &str,
        documents: &[ProductDocument],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        if documents.is_empty() {
            return Ok(BatchOperationSummary::default());
        }

        let response = self
            .client
            .bulk(BulkParts::Index(index))
            .body(Self::bulk_body(index, documents))
            .send()
            .await
            .map_err(|e| SearchIndexError::bulk_transport(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Bulk request failed");
            return Err(SearchIndexError::bulk_transport(format!(
                "Bulk request failed with status {}: {}",
                status, error_body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchIndexError::bulk_transport(e.to_string()))?;

        let summary = Self::parse_bulk_response(&body, documents)?;
        debug!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Bulk request completed"
        );
        Ok(summary)
    }

    async fn search(&self, index: &str, query: &Value) -> Result<Vec<Value>, SearchIndexError> {
        let response = self
            .client
            .search(SearchParts::Index(&[index]))
            .body(query.clone())
            .send()
            .await
            .map_err(|e| SearchIndexError::query(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(SearchIndexError::query(format!(
                "Search failed with status {}: {}",
                status, error_body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))?;

        Ok(Self::parse_hits(&body))
    }
}
