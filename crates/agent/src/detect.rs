//! Tool-call detection inside aggregated model output.
//!
//! A binary, all-or-nothing classification: the entire trimmed text must
//! parse as one JSON object carrying a `tool` key to count as a call.
//! Everything else — prose, partial JSON, JSON with trailing garbage —
//! is plain text and passes through unchanged. The classification is a
//! total function; parse failures are a result value, not control flow.

use mindgate_core::tool::ToolCallRequest;
use tracing::debug;

/// What the model's aggregated output turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum Detection {
    /// Plain natural-language output, returned unchanged
    Plain(String),

    /// A structured tool invocation
    ToolCall(ToolCallRequest),
}

/// Classify aggregated output.
pub fn detect(aggregated: &str) -> Detection {
    let trimmed = aggregated.trim();

    let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) else {
        return Detection::Plain(aggregated.to_string());
    };

    if value.get("tool").is_none() {
        return Detection::Plain(aggregated.to_string());
    }

    match serde_json::from_value::<ToolCallRequest>(value) {
        Ok(call) => {
            debug!(tool = %call.tool, "Tool call detected");
            Detection::ToolCall(call)
        }
        // `tool` key present but not a usable call (e.g. non-string name)
        Err(_) => Detection::Plain(aggregated.to_string()),
    }
}
