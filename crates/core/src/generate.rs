//! Generator trait — the abstraction over the text-generation backend.
//!
//! The backend streams its output as fragments; implementations aggregate
//! them and hand the orchestrator one complete text. The orchestrator calls
//! `generate()` without knowing which backend is behind it, which is also
//! what makes the pipeline testable with a stub.

use crate::error::UpstreamError;
use async_trait::async_trait;

/// The generation backend seam.
#[async_trait]
pub trait Generator: Send + Sync {
    /// A human-readable name for this backend (e.g. "ollama").
    fn name(&self) -> &str;

    /// Send a prompt and return the fully aggregated output text.
    ///
    /// Aggregation is the implementation's concern: the ordered
    /// concatenation of every fragment the backend produced, with
    /// malformed fragments silently dropped.
    async fn generate(
        &self,
        prompt: &str,
        model: &str,
    ) -> std::result::Result<String, UpstreamError>;

    /// Health check — can we reach the backend?
    async fn health_check(&self) -> std::result::Result<bool, UpstreamError> {
        Ok(true)
    }
}
