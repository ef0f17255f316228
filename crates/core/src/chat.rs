//! Chat request/response wire types.
//!
//! Field casing on the wire is camelCase (`userId`, `toolUsed`) to match
//! the service's JSON contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A synchronous chat request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// The user's message. Required; an absent or empty message is a
    /// validation error.
    #[serde(default)]
    pub message: String,

    /// Defaults to "default" at the orchestration boundary.
    #[serde(default)]
    pub user_id: Option<String>,

    /// Defaults to "personal" at the orchestration boundary.
    #[serde(default)]
    pub context: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            user_id: None,
            context: None,
        }
    }

    /// The effective user id, with the boundary default applied.
    pub fn user_id_or_default(&self) -> &str {
        self.user_id.as_deref().filter(|s| !s.is_empty()).unwrap_or("default")
    }

    /// The effective context, with the boundary default applied.
    pub fn context_or_default(&self) -> &str {
        self.context.as_deref().filter(|s| !s.is_empty()).unwrap_or("personal")
    }
}

/// The unified answer returned by the synchronous path.
///
/// Invariant: `response` is never empty — the orchestrator substitutes a
/// fixed sentinel when generation yields nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub response: String,
    pub model: String,
    pub user_id: String,
    pub context: String,
    pub timestamp: DateTime<Utc>,
    pub tool_used: bool,
}

/// A record written to the memory store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryRecord {
    /// The text to store. Required; an absent or empty content is a
    /// validation error at the gateway.
    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub user_id: Option<String>,

    #[serde(default)]
    pub context: Option<String>,

    /// Where the record came from (e.g. "telegram", "chat")
    #[serde(default)]
    pub source: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Defaults to the insertion time when omitted
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}
