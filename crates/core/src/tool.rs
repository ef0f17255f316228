//! Tool types — the vocabulary shared by the prompt builder, the call
//! detector, and the dispatcher.
//!
//! Tools are remote HTTP endpoints described by an external manifest; the
//! core never executes anything in-process.

use serde::{Deserialize, Serialize};

/// A single entry of the external tool manifest.
///
/// Invariant: all four fields are present and non-empty. Manifest entries
/// failing this are dropped by the loader before reaching the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool name (looked up exactly, case-sensitive)
    pub name: String,

    /// Description of what the tool does (rendered into the system prompt)
    pub description: String,

    /// JSON Schema describing the tool's parameters
    pub parameters: serde_json::Value,

    /// The HTTP endpoint invoked with the call parameters
    pub endpoint: String,
}

/// A structured tool invocation detected inside generated text.
///
/// Recognized only when the entire aggregated output parses as one JSON
/// object carrying a `tool` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Name of the tool the model wants to invoke
    pub tool: String,

    /// Call arguments; defaults to an empty object when omitted
    #[serde(default = "empty_object")]
    pub parameters: serde_json::Value,

    /// Model-supplied text to fall back on if the tool cannot be executed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_call_parameters_default_to_empty_object() {
        let call: ToolCallRequest = serde_json::from_str(r#"{"tool":"weather_current"}"#).unwrap();
        assert_eq!(call.tool, "weather_current");
        assert_eq!(call.parameters, serde_json::json!({}));
        assert!(call.fallback.is_none());
    }

    #[test]
    fn tool_call_with_fallback() {
        let call: ToolCallRequest = serde_json::from_str(
            r#"{"tool":"weather_current","parameters":{"location":"Oslo"},"fallback":"It is probably raining."}"#,
        )
        .unwrap();
        assert_eq!(call.parameters["location"], "Oslo");
        assert_eq!(call.fallback.as_deref(), Some("It is probably raining."));
    }

    #[test]
    fn tool_definition_serialization() {
        let tool = ToolDefinition {
            name: "weather_current".into(),
            description: "Get current weather for a location".into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "location": { "type": "string", "description": "City name" }
                },
                "required": ["location"]
            }),
            endpoint: "http://n8n:5678/webhook/weather/current".into(),
        };
        let json = serde_json::to_string(&tool).unwrap();
        assert!(json.contains("weather_current"));
        assert!(json.contains("location"));
    }
}
