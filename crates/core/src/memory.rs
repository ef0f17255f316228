//! MemoryStore trait — the seam to the vector-metadata store.
//!
//! The core only needs two operations: insert a record and query by filter.
//! Write outcomes never affect chat responses; the webhook path treats the
//! insert as fire-and-forget.

use crate::chat::MemoryRecord;
use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Receipt for a successful insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertReceipt {
    pub success: bool,

    /// The identifier assigned to the stored record
    pub id: String,

    /// The timestamp actually stored (caller-supplied or insertion time)
    pub timestamp: DateTime<Utc>,
}

/// Filter for a memory query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemoryFilter {
    /// The query text
    pub q: Option<String>,

    /// Restrict to a user
    pub user_id: Option<String>,

    /// Restrict to a context (e.g. "personal", "work")
    pub context: Option<String>,
}

/// One query result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryHit {
    pub content: String,

    /// The stored metadata, returned as-is
    pub metadata: serde_json::Value,

    /// Similarity-derived relevance; higher is closer
    pub relevance: f64,
}

/// The memory store seam.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// The backend name (e.g. "chroma").
    fn name(&self) -> &str;

    /// Store a record, assigning it a fresh unique identifier.
    async fn insert(&self, record: MemoryRecord) -> std::result::Result<InsertReceipt, StoreError>;

    /// Query records matching the filter.
    async fn query(&self, filter: MemoryFilter) -> std::result::Result<Vec<MemoryHit>, StoreError>;

    /// Health check — can we reach the store?
    async fn health_check(&self) -> std::result::Result<bool, StoreError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_receipt_serialization() {
        let receipt = InsertReceipt {
            success: true,
            id: "0f8fad5b-d9cb-469f-a165-70867728950e".into(),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&receipt).unwrap();
        assert!(json.contains("\"success\":true"));
        assert!(json.contains("0f8fad5b"));
    }

    #[test]
    fn memory_filter_defaults() {
        let filter = MemoryFilter::default();
        assert!(filter.q.is_none());
        assert!(filter.user_id.is_none());
        assert!(filter.context.is_none());
    }
}
