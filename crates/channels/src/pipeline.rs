//! The asynchronous notification pipeline behind the Telegram webhook.
//!
//! The webhook handler acknowledges every update immediately; the real
//! work happens on a detached task so Telegram never retries a slow
//! generation. The flow per actionable update:
//!
//!   1. send a placeholder message so the user sees progress
//!   2. run the chat pipeline
//!   3. edit the placeholder into the answer, or send a fresh message
//!      if there is no placeholder to edit or the edit fails
//!   4. write the inbound message to the memory store, fire-and-forget
//!
//! No step here returns an error to the webhook: a failed generation
//! becomes an apology message, and everything else is logged and
//! swallowed.

use mindgate_agent::ChatOrchestrator;
use mindgate_core::chat::{ChatRequest, MemoryRecord};
use mindgate_core::memory::MemoryStore;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::telegram::{TelegramApi, TelegramUpdate};

const PLACEHOLDER_TEXT: &str = "Thinking...";
const APOLOGY_TEXT: &str =
    "Sorry, I ran into a problem while answering that. Please try again in a moment.";

/// Ack-then-deliver processing for webhook updates.
pub struct NotificationPipeline {
    orchestrator: Arc<ChatOrchestrator>,
    telegram: Arc<TelegramApi>,
    memory: Arc<dyn MemoryStore>,
}

impl NotificationPipeline {
    pub fn new(
        orchestrator: Arc<ChatOrchestrator>,
        telegram: Arc<TelegramApi>,
        memory: Arc<dyn MemoryStore>,
    ) -> Self {
        Self {
            orchestrator,
            telegram,
            memory,
        }
    }

    /// Validate an update and hand it to a detached task.
    ///
    /// Returns the task handle for observability; callers on the request
    /// path ignore it. Incomplete updates are dropped here, before any
    /// task is spawned.
    pub fn submit(self: &Arc<Self>, update: TelegramUpdate) -> Option<tokio::task::JoinHandle<()>> {
        let Some((chat_id, text)) = update.chat_and_text() else {
            debug!(update_id = ?update.update_id, "Dropping update without chat id or text");
            return None;
        };

        let text = text.to_owned();
        let pipeline = Arc::clone(self);
        Some(tokio::spawn(async move {
            pipeline.process(chat_id, text).await;
        }))
    }

    async fn process(&self, chat_id: i64, text: String) {
        info!(chat_id, text_len = text.len(), "Processing webhook message");

        let placeholder_id = match self.telegram.send_message(chat_id, PLACEHOLDER_TEXT).await {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(chat_id, error = %e, "Placeholder send failed, continuing without it");
                None
            }
        };

        let mut request = ChatRequest::new(text.clone());
        request.user_id = Some(chat_id.to_string());

        match self.orchestrator.handle(request).await {
            Ok(response) => {
                self.deliver(chat_id, placeholder_id, &response.response).await;
                self.remember(chat_id, text);
            }
            Err(e) => {
                warn!(chat_id, error = %e, "Generation failed, sending apology");
                self.deliver(chat_id, placeholder_id, APOLOGY_TEXT).await;
            }
        }
    }

    /// Edit the placeholder into the final text, falling back to a fresh
    /// send when there is no placeholder or the edit fails.
    async fn deliver(&self, chat_id: i64, placeholder_id: Option<i64>, text: &str) {
        if let Some(message_id) = placeholder_id {
            match self.telegram.edit_message(chat_id, message_id, text).await {
                Ok(()) => return,
                Err(e) => {
                    warn!(chat_id, message_id, error = %e, "Edit failed, sending new message");
                }
            }
        }

        if let Err(e) = self.telegram.send_message(chat_id, text).await {
            warn!(chat_id, error = %e, "Reply delivery failed");
        }
    }

    /// Fire-and-forget memory write. The write runs on its own task and
    /// reports its outcome over a oneshot channel to a second task that
    /// only logs; nothing on the delivery path waits for either.
    fn remember(&self, chat_id: i64, text: String) {
        let store = Arc::clone(&self.memory);
        let (done_tx, done_rx) = oneshot::channel();

        tokio::spawn(async move {
            let record = MemoryRecord {
                content: text,
                user_id: Some(chat_id.to_string()),
                context: None,
                source: Some("telegram".into()),
                tags: Vec::new(),
                timestamp: None,
            };
            let outcome = store.insert(record).await;
            let _ = done_tx.send(outcome);
        });

        tokio::spawn(async move {
            match done_rx.await {
                Ok(Ok(receipt)) => debug!(chat_id, id = %receipt.id, "Inbound message remembered"),
                Ok(Err(e)) => warn!(chat_id, error = %e, "Memory write failed"),
                Err(_) => warn!(chat_id, "Memory write task dropped before completing"),
            }
        });
    }
}
