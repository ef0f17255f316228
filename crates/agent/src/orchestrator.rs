//! The synchronous chat pipeline.
//!
//! validate → build prompt → generate → detect → dispatch (or pass plain
//! text through) → assemble the response. Tool-dispatch failure never
//! aborts a request — it degrades to a fallback message inside a normal
//! response. Only validation and generation failures surface as errors.

use chrono::Utc;
use mindgate_core::chat::{ChatRequest, ChatResponse};
use mindgate_core::error::UpstreamError;
use mindgate_core::generate::Generator;
use mindgate_tools::{ToolDispatcher, ToolRegistry};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::detect::{Detection, detect};
use crate::prompt::build_prompt;

/// Substituted when generation yields no text at all.
const EMPTY_RESPONSE_SENTINEL: &str = "No response from model";

/// Failures the synchronous path surfaces to its caller.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Message is required")]
    MissingMessage,

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// Composes the pipeline for the synchronous request/response path.
pub struct ChatOrchestrator {
    generator: Arc<dyn Generator>,
    registry: Arc<ToolRegistry>,
    dispatcher: ToolDispatcher,
    model: String,
}

impl ChatOrchestrator {
    pub fn new(
        generator: Arc<dyn Generator>,
        registry: Arc<ToolRegistry>,
        dispatcher: ToolDispatcher,
        model: impl Into<String>,
    ) -> Self {
        Self {
            generator,
            registry,
            dispatcher,
            model: model.into(),
        }
    }

    /// The model this orchestrator requests from the backend.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run one request through the whole pipeline.
    pub async fn handle(&self, request: ChatRequest) -> Result<ChatResponse, ChatError> {
        if request.message.trim().is_empty() {
            return Err(ChatError::MissingMessage);
        }

        let user_id = request.user_id_or_default().to_string();
        let context = request.context_or_default().to_string();

        let prompt = build_prompt(&request.message, &self.registry);
        debug!(prompt_len = prompt.len(), tools = self.registry.len(), "Prompt built");

        let aggregated = self.generator.generate(&prompt, &self.model).await?;

        let (text, tool_used) = match detect(&aggregated) {
            Detection::Plain(text) => (text, false),
            Detection::ToolCall(call) => {
                info!(tool = %call.tool, "Dispatching tool call");
                let outcome = self.dispatcher.dispatch(&self.registry, &call).await;
                (outcome.text, outcome.tool_used)
            }
        };

        let response = if text.is_empty() {
            EMPTY_RESPONSE_SENTINEL.to_string()
        } else {
            text
        };

        Ok(ChatResponse {
            response,
            model: self.model.clone(),
            user_id,
            context,
            timestamp: Utc::now(),
            tool_used,
        })
    }
}
