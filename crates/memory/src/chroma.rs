//! ChromaDB store adapter.
//!
//! Talks to the ChromaDB v1 REST API. The `memory` collection is created
//! lazily on first use. Every record carries its content as the document
//! and everything else (userId, context, source, timestamp, tags) as
//! metadata.

use async_trait::async_trait;
use chrono::Utc;
use mindgate_core::chat::MemoryRecord;
use mindgate_core::error::StoreError;
use mindgate_core::memory::{InsertReceipt, MemoryFilter, MemoryHit, MemoryStore};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

const COLLECTION_NAME: &str = "memory";

/// Placeholder embedding until a real embedder is wired in; retrieval
/// relies on the metadata `where` filter.
const PLACEHOLDER_EMBEDDING: [f64; 3] = [0.1, 0.2, 0.3];

/// Number of results returned per query.
const QUERY_LIMIT: usize = 5;

/// A ChromaDB-backed memory store.
pub struct ChromaStore {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    documents: Vec<Vec<String>>,

    #[serde(default)]
    metadatas: Vec<Vec<serde_json::Value>>,

    #[serde(default)]
    distances: Vec<Vec<f64>>,
}

impl ChromaStore {
    /// Create a store for the given base URL (e.g. "http://chromadb:8000").
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/api/v1/collections/{}", self.base_url, COLLECTION_NAME)
    }

    /// Create the collection if it does not exist yet.
    async fn ensure_collection(&self) -> Result<(), StoreError> {
        let response = self
            .client
            .get(self.collection_url())
            .send()
            .await
            .map_err(|e| StoreError::Collection(e.to_string()))?;

        if response.status().is_success() {
            return Ok(());
        }

        if response.status().as_u16() != 404 {
            return Err(StoreError::Collection(format!(
                "collection lookup returned status {}",
                response.status().as_u16()
            )));
        }

        let create = self
            .client
            .post(format!("{}/api/v1/collections", self.base_url))
            .json(&serde_json::json!({
                "name": COLLECTION_NAME,
                "metadata": { "description": "Agent memory storage" },
            }))
            .send()
            .await
            .map_err(|e| StoreError::Collection(e.to_string()))?;

        if !create.status().is_success() {
            return Err(StoreError::Collection(format!(
                "collection create returned status {}",
                create.status().as_u16()
            )));
        }

        info!(collection = COLLECTION_NAME, "Created memory collection");
        Ok(())
    }
}

#[async_trait]
impl MemoryStore for ChromaStore {
    fn name(&self) -> &str {
        "chroma"
    }

    async fn insert(&self, record: MemoryRecord) -> Result<InsertReceipt, StoreError> {
        self.ensure_collection().await?;

        let id = uuid::Uuid::new_v4().to_string();
        let timestamp = record.timestamp.unwrap_or_else(Utc::now);

        let metadata = serde_json::json!({
            "userId": record.user_id.as_deref().unwrap_or("default"),
            "context": record.context.as_deref().unwrap_or("personal"),
            "source": record.source.as_deref().unwrap_or("unknown"),
            "timestamp": timestamp.to_rfc3339(),
            "tags": record.tags,
        });

        let body = serde_json::json!({
            "ids": [id],
            "embeddings": [PLACEHOLDER_EMBEDDING],
            "metadatas": [metadata],
            "documents": [record.content],
        });

        let response = self
            .client
            .post(format!("{}/upsert", self.collection_url()))
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Insert(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StoreError::Insert(format!(
                "upsert returned status {}",
                response.status().as_u16()
            )));
        }

        debug!(id = %id, "Memory record inserted");
        Ok(InsertReceipt {
            success: true,
            id,
            timestamp,
        })
    }

    async fn query(&self, filter: MemoryFilter) -> Result<Vec<MemoryHit>, StoreError> {
        self.ensure_collection().await?;

        let mut body = serde_json::json!({
            "query_embeddings": [PLACEHOLDER_EMBEDDING],
            "n_results": QUERY_LIMIT,
            "include": ["documents", "metadatas", "distances"],
        });

        let mut conditions = serde_json::Map::new();
        if let Some(user_id) = &filter.user_id {
            conditions.insert("userId".into(), serde_json::json!(user_id));
        }
        if let Some(context) = &filter.context {
            conditions.insert("context".into(), serde_json::json!(context));
        }
        if !conditions.is_empty() {
            body["where"] = serde_json::Value::Object(conditions);
        }

        let response = self
            .client
            .post(format!("{}/query", self.collection_url()))
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StoreError::Query(format!(
                "query returned status {}",
                response.status().as_u16()
            )));
        }

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        // One embedding in, one result row out.
        let documents = parsed.documents.into_iter().next().unwrap_or_default();
        let metadatas = parsed.metadatas.into_iter().next().unwrap_or_default();
        let distances = parsed.distances.into_iter().next().unwrap_or_default();

        let hits: Vec<MemoryHit> = documents
            .into_iter()
            .enumerate()
            .map(|(i, content)| MemoryHit {
                content,
                metadata: metadatas.get(i).cloned().unwrap_or(serde_json::Value::Null),
                relevance: distances.get(i).map(|d| 1.0 - d).unwrap_or(0.0),
            })
            .collect();

        debug!(count = hits.len(), "Memory query complete");
        Ok(hits)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        let response = self
            .client
            .get(format!("{}/api/v1/heartbeat", self.base_url))
            .send()
            .await
            .map_err(|e| StoreError::Collection(e.to_string()))?;
        Ok(response.status().is_success())
    }
}
