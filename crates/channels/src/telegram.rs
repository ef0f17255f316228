//! Telegram Bot API client.
//!
//! Covers the two methods the pipeline needs: `sendMessage` and
//! `editMessageText`. The bot token is part of the request path, so the
//! Debug impl redacts the base URL along with the token itself.

use mindgate_core::error::ChannelError;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// An incoming webhook update, reduced to the fields the pipeline reads.
///
/// Everything is optional at the wire level; `chat_and_text` decides
/// whether the update is actionable.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramUpdate {
    #[serde(default)]
    pub update_id: Option<i64>,

    #[serde(default)]
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    #[serde(default)]
    pub text: Option<String>,

    #[serde(default)]
    pub chat: Option<IncomingChat>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncomingChat {
    pub id: i64,
}

impl TelegramUpdate {
    /// The chat id and message text, if this update carries both.
    /// Edited messages, channel posts, stickers and other textless
    /// payloads come back as `None` and are dropped upstream.
    pub fn chat_and_text(&self) -> Option<(i64, &str)> {
        let message = self.message.as_ref()?;
        let chat = message.chat.as_ref()?;
        let text = message.text.as_deref()?;
        if text.is_empty() {
            return None;
        }
        Some((chat.id, text))
    }
}

/// Envelope every Bot API method responds with.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,

    #[serde(default)]
    result: Option<SentMessage>,

    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

/// Thin client over the Telegram Bot API.
pub struct TelegramApi {
    base_url: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for TelegramApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramApi")
            .field("base_url", &"[REDACTED]")
            .finish()
    }
}

impl TelegramApi {
    pub fn new(bot_token: &str, timeout: Duration) -> Self {
        Self::with_base_url(format!("https://api.telegram.org/bot{bot_token}"), timeout)
    }

    /// Point the client at an arbitrary base URL. Tests use this to
    /// substitute a local server for api.telegram.org.
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into();
        let base_url = base_url.trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");
        Self { base_url, client }
    }

    /// Send a new message; returns the message id Telegram assigned so
    /// the caller can edit it later.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<i64, ChannelError> {
        let body = json!({ "chat_id": chat_id, "text": text });
        let response = self.call("sendMessage", &body).await?;
        debug!(chat_id, message_id = ?response.result.as_ref().map(|m| m.message_id), "Message sent");
        response
            .result
            .map(|m| m.message_id)
            .ok_or_else(|| ChannelError::Api {
                status_code: 200,
                message: "sendMessage response carried no message".into(),
            })
    }

    /// Edit a previously sent message in place.
    pub async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
    ) -> Result<(), ChannelError> {
        let body = json!({ "chat_id": chat_id, "message_id": message_id, "text": text });
        self.call("editMessageText", &body).await?;
        debug!(chat_id, message_id, "Message edited");
        Ok(())
    }

    async fn call(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<ApiResponse, ChannelError> {
        let url = format!("{}/{}", self.base_url, method);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ChannelError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ChannelError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(ChannelError::Api {
                status_code: status.as_u16(),
                message: text,
            });
        }

        let parsed: ApiResponse =
            serde_json::from_str(&text).map_err(|e| ChannelError::Network(e.to_string()))?;

        if !parsed.ok {
            return Err(ChannelError::Api {
                status_code: status.as_u16(),
                message: parsed.description.unwrap_or_else(|| "not ok".into()),
            });
        }

        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::extract::State;
    use axum::routing::post;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    type CallLog = Arc<Mutex<Vec<(String, serde_json::Value)>>>;

    async fn record(
        State(log): State<CallLog>,
        uri: axum::http::Uri,
        axum::Json(body): axum::Json<serde_json::Value>,
    ) -> axum::Json<serde_json::Value> {
        log.lock().unwrap().push((uri.path().to_string(), body));
        axum::Json(json!({ "ok": true, "result": { "message_id": 42 } }))
    }

    async fn spawn_bot_api() -> (String, CallLog) {
        let log: CallLog = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/{method}", post(record))
            .with_state(log.clone());
        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), log)
    }

    #[tokio::test]
    async fn send_message_returns_assigned_id() {
        let (base, log) = spawn_bot_api().await;
        let api = TelegramApi::with_base_url(base, Duration::from_secs(1));

        let id = api.send_message(1001, "hello").await.unwrap();
        assert_eq!(id, 42);

        let calls = log.lock().unwrap();
        assert_eq!(calls[0].0, "/sendMessage");
        assert_eq!(calls[0].1["chat_id"], 1001);
        assert_eq!(calls[0].1["text"], "hello");
    }

    #[tokio::test]
    async fn edit_message_targets_the_original() {
        let (base, log) = spawn_bot_api().await;
        let api = TelegramApi::with_base_url(base, Duration::from_secs(1));

        api.edit_message(1001, 42, "done").await.unwrap();

        let calls = log.lock().unwrap();
        assert_eq!(calls[0].0, "/editMessageText");
        assert_eq!(calls[0].1["message_id"], 42);
        assert_eq!(calls[0].1["text"], "done");
    }

    #[tokio::test]
    async fn unreachable_api_is_a_network_error() {
        let api = TelegramApi::with_base_url("http://127.0.0.1:9", Duration::from_millis(200));
        let err = api.send_message(1, "x").await.unwrap_err();
        assert!(matches!(err, ChannelError::Network(_)));
    }

    #[tokio::test]
    async fn not_ok_envelope_is_an_api_error() {
        let app = Router::new().route(
            "/{method}",
            post(|| async {
                axum::Json(json!({ "ok": false, "description": "Bad Request: chat not found" }))
            }),
        );
        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let api = TelegramApi::with_base_url(format!("http://{addr}"), Duration::from_secs(1));
        let err = api.send_message(1, "x").await.unwrap_err();
        match err {
            ChannelError::Api { message, .. } => assert!(message.contains("chat not found")),
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[test]
    fn debug_redacts_the_token_bearing_url() {
        let api = TelegramApi::new("123456:secret", Duration::from_secs(1));
        let debug = format!("{api:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn complete_update_is_actionable() {
        let update: TelegramUpdate = serde_json::from_str(
            r#"{"update_id": 7, "message": {"text": "hi", "chat": {"id": 99}}}"#,
        )
        .unwrap();
        assert_eq!(update.chat_and_text(), Some((99, "hi")));
    }

    #[test]
    fn textless_update_is_dropped() {
        let update: TelegramUpdate =
            serde_json::from_str(r#"{"update_id": 7, "message": {"chat": {"id": 99}}}"#).unwrap();
        assert_eq!(update.chat_and_text(), None);
    }

    #[test]
    fn chatless_update_is_dropped() {
        let update: TelegramUpdate =
            serde_json::from_str(r#"{"update_id": 7, "message": {"text": "hi"}}"#).unwrap();
        assert_eq!(update.chat_and_text(), None);
    }

    #[test]
    fn messageless_update_is_dropped() {
        let update: TelegramUpdate = serde_json::from_str(r#"{"update_id": 7}"#).unwrap();
        assert_eq!(update.chat_and_text(), None);
    }
}
