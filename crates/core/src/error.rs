//! Error types for the Mindgate domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.
//!
//! Note the deliberate absence of a "parse error" context: malformed
//! streamed lines and tool-call-shaped-but-unparseable text are always
//! recovered locally (the fragment is skipped, or the text is treated as
//! plain output) and never reach a caller.

use thiserror::Error;

/// The top-level error type for all Mindgate operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Generation backend / tool endpoint errors ---
    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    // --- Memory store errors ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Delivery channel errors ---
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    // --- Tool manifest errors ---
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures reaching or reading from an upstream HTTP service — the
/// generation backend or a tool endpoint. Never retried.
#[derive(Debug, Clone, Error)]
pub enum UpstreamError {
    #[error("Upstream returned status {status_code}: {message}")]
    Status { status_code: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Memory insert failed: {0}")]
    Insert(String),

    #[error("Memory query failed: {0}")]
    Query(String),

    #[error("Collection setup failed: {0}")]
    Collection(String),
}

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Channel not configured: {0}")]
    NotConfigured(String),

    #[error("Channel API returned status {status_code}: {message}")]
    Api { status_code: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Failed to read tool manifest at {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Failed to parse tool manifest at {path}: {reason}")]
    Parse { path: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_error_displays_correctly() {
        let err = Error::Upstream(UpstreamError::Status {
            status_code: 502,
            message: "bad gateway".into(),
        });
        assert!(err.to_string().contains("502"));
        assert!(err.to_string().contains("bad gateway"));
    }

    #[test]
    fn store_error_displays_correctly() {
        let err = Error::Store(StoreError::Insert("connection refused".into()));
        assert!(err.to_string().contains("insert"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn registry_error_carries_path() {
        let err = RegistryError::Parse {
            path: "tools.json".into(),
            reason: "expected array".into(),
        };
        assert!(err.to_string().contains("tools.json"));
    }
}
