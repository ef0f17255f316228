//! Tool dispatch — resolving a detected call and invoking its endpoint.
//!
//! Dispatch never fails the surrounding request: every failure mode
//! degrades to an explanatory message carrying the model's own fallback
//! text when it supplied one.

use mindgate_core::tool::ToolCallRequest;
use std::time::Duration;
use tracing::{info, warn};

use crate::registry::ToolRegistry;

/// The outcome of resolving and executing a tool call.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchOutcome {
    /// The final user-facing text
    pub text: String,

    /// Whether a tool endpoint was actually invoked successfully
    pub tool_used: bool,
}

/// Resolves tool calls against the registry and posts to their endpoints.
pub struct ToolDispatcher {
    client: reqwest::Client,
}

impl ToolDispatcher {
    /// Endpoint calls are bounded by `timeout`.
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");
        Self { client }
    }

    /// Resolve `call` and produce the final answer text.
    ///
    /// Resolution order: unknown name, then missing endpoint, then a single
    /// POST of the call parameters to the endpoint. No retries.
    pub async fn dispatch(&self, registry: &ToolRegistry, call: &ToolCallRequest) -> DispatchOutcome {
        let Some(tool) = registry.get(&call.tool) else {
            warn!(tool = %call.tool, "Tool call names an unknown tool");
            return DispatchOutcome {
                text: format!(
                    "I tried to use the tool '{}', but it doesn't exist. \
                     Here's what I know without using the tool: {}",
                    call.tool,
                    fallback_or(call, "I'm unable to complete this request without the proper tool.")
                ),
                tool_used: false,
            };
        };

        if tool.endpoint.is_empty() {
            warn!(tool = %tool.name, "Tool has no invocation endpoint");
            return DispatchOutcome {
                text: format!(
                    "I tried to use the tool '{}', but it doesn't have a valid endpoint. \
                     Here's what I know without using the tool: {}",
                    call.tool,
                    fallback_or(call, "I'm unable to complete this request without a working tool.")
                ),
                tool_used: false,
            };
        }

        info!(tool = %tool.name, endpoint = %tool.endpoint, "Calling tool endpoint");

        match self.invoke(&tool.endpoint, &call.parameters).await {
            Ok(result) => {
                let rendered = match &result {
                    serde_json::Value::String(s) => s.clone(),
                    other => serde_json::to_string_pretty(other).unwrap_or_default(),
                };
                DispatchOutcome {
                    text: format!(
                        "I used the {} tool and got the following result:\n\n{}",
                        tool.name, rendered
                    ),
                    tool_used: true,
                }
            }
            Err(reason) => {
                warn!(tool = %tool.name, error = %reason, "Tool endpoint call failed");
                DispatchOutcome {
                    text: format!(
                        "I tried to use the tool '{}', but encountered an error: {}. \
                         Here's what I know without using the tool: {}",
                        call.tool,
                        reason,
                        fallback_or(call, "I'm unable to complete this request due to a tool error.")
                    ),
                    tool_used: false,
                }
            }
        }
    }

    /// One POST of the parameters to the endpoint, JSON in, JSON (or raw
    /// text) out.
    async fn invoke(
        &self,
        endpoint: &str,
        parameters: &serde_json::Value,
    ) -> Result<serde_json::Value, String> {
        let response = self
            .client
            .post(endpoint)
            .json(parameters)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("endpoint returned status {}", status.as_u16()));
        }

        let body = response.text().await.map_err(|e| e.to_string())?;
        // Non-JSON bodies are still valid tool output; keep them as text.
        Ok(serde_json::from_str(&body).unwrap_or(serde_json::Value::String(body)))
    }
}

fn fallback_or<'a>(call: &'a ToolCallRequest, generic: &'a str) -> &'a str {
    call.fallback.as_deref().unwrap_or(generic)
}
