//! Ollama client — streamed NDJSON generation.
//!
//! The backend answers `POST /api/generate` with zero or more
//! newline-separated JSON objects, each optionally carrying a `response`
//! text fragment and a `done` flag. Depending on proxies and buffering the
//! body may arrive as one blob rather than truly incrementally, so the
//! client buffers bytes and cuts complete lines itself.

use futures::StreamExt;
use mindgate_core::error::UpstreamError;
use mindgate_core::generate::Generator;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Client for an Ollama-compatible generation backend.
pub struct OllamaClient {
    base_url: String,
    client: reqwest::Client,
}

/// One parsed unit of the backend's streamed output. Unknown fields are
/// ignored; malformed lines are discarded before ever producing one of
/// these.
#[derive(Debug, Deserialize)]
struct StreamFragment {
    #[serde(default)]
    response: Option<String>,

    #[serde(default)]
    #[allow(dead_code)]
    done: Option<bool>,
}

impl OllamaClient {
    /// Create a client for the given base URL (e.g. "http://ollama:11434").
    ///
    /// Every request is bounded by `timeout`; expiry surfaces as
    /// `UpstreamError::Timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    fn map_reqwest_err(e: reqwest::Error) -> UpstreamError {
        if e.is_timeout() {
            UpstreamError::Timeout(e.to_string())
        } else {
            UpstreamError::Network(e.to_string())
        }
    }
}

/// Aggregate a chunk of newline-delimited JSON into `out`.
///
/// Splits on newline, discards blank lines, parses each remaining line
/// independently; a parse failure on one line is logged and that line's
/// contribution omitted — it never aborts aggregation of the rest.
fn aggregate_lines(chunk: &str, out: &mut String) {
    for line in chunk.split('\n') {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<StreamFragment>(line) {
            Ok(fragment) => {
                if let Some(text) = fragment.response {
                    out.push_str(&text);
                }
            }
            Err(e) => {
                warn!(error = %e, "Skipping malformed response line");
            }
        }
    }
}

#[async_trait::async_trait]
impl Generator for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(&self, prompt: &str, model: &str) -> Result<String, UpstreamError> {
        let url = format!("{}/api/generate", self.base_url);

        debug!(model = %model, prompt_len = prompt.len(), "Sending generation request");

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "model": model, "prompt": prompt }))
            .send()
            .await
            .map_err(Self::map_reqwest_err)?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let message = response.text().await.unwrap_or_default();
            warn!(status, body = %message, "Generation backend returned error");
            return Err(UpstreamError::Status {
                status_code: status,
                message,
            });
        }

        // Read the body incrementally, cutting complete lines as they
        // arrive. A trailing partial line is held back until finished.
        let mut byte_stream = response.bytes_stream();
        let mut buffer = String::new();
        let mut aggregated = String::new();

        while let Some(chunk) = byte_stream.next().await {
            let bytes = chunk.map_err(Self::map_reqwest_err)?;
            buffer.push_str(&String::from_utf8_lossy(&bytes));

            while let Some(line_end) = buffer.find('\n') {
                let line: String = buffer.drain(..=line_end).collect();
                aggregate_lines(&line, &mut aggregated);
            }
        }

        // Whatever remains is the final (unterminated) line.
        aggregate_lines(&buffer, &mut aggregated);

        debug!(output_len = aggregated.len(), "Generation complete");
        Ok(aggregated)
    }

    async fn health_check(&self) -> Result<bool, UpstreamError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(Self::map_reqwest_err)?;
        Ok(response.status().is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, routing::post};

    #[test]
    fn fragments_aggregate_in_order() {
        let body = concat!(
            "{\"response\":\"Hello\",\"done\":false}\n",
            "{\"response\":\" there\",\"done\":false}\n",
            "{\"response\":\"!\",\"done\":true}\n",
        );
        let mut out = String::new();
        aggregate_lines(body, &mut out);
        assert_eq!(out, "Hello there!");
    }

    #[test]
    fn malformed_line_does_not_break_aggregation() {
        let body = concat!(
            "{\"response\":\"Hello\"}\n",
            "this is not json\n",
            "{\"response\":\" world\"}\n",
        );
        let mut out = String::new();
        aggregate_lines(body, &mut out);
        assert_eq!(out, "Hello world");
    }

    #[test]
    fn blank_lines_are_discarded() {
        let body = "\n\n{\"response\":\"ok\"}\n\n";
        let mut out = String::new();
        aggregate_lines(body, &mut out);
        assert_eq!(out, "ok");
    }

    #[test]
    fn fragments_without_response_contribute_nothing() {
        let body = "{\"done\":true}\n{\"response\":\"tail\"}";
        let mut out = String::new();
        aggregate_lines(body, &mut out);
        assert_eq!(out, "tail");
    }

    async fn spawn_backend(body: &'static str, status: u16) -> String {
        let app = Router::new().route(
            "/api/generate",
            post(move || async move {
                (
                    axum::http::StatusCode::from_u16(status).unwrap(),
                    body.to_string(),
                )
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn generate_aggregates_streamed_body() {
        let base = spawn_backend(
            "{\"response\":\"Hello\"}\n{\"response\":\" there!\",\"done\":true}\n",
            200,
        )
        .await;

        let client = OllamaClient::new(base, Duration::from_secs(5));
        let text = client.generate("hi", "mistral").await.unwrap();
        assert_eq!(text, "Hello there!");
    }

    #[tokio::test]
    async fn generate_handles_body_without_trailing_newline() {
        let base = spawn_backend("{\"response\":\"no newline\"}", 200).await;

        let client = OllamaClient::new(base, Duration::from_secs(5));
        let text = client.generate("hi", "mistral").await.unwrap();
        assert_eq!(text, "no newline");
    }

    #[tokio::test]
    async fn non_2xx_is_an_upstream_error() {
        let base = spawn_backend("model not loaded", 500).await;

        let client = OllamaClient::new(base, Duration::from_secs(5));
        let err = client.generate("hi", "mistral").await.unwrap_err();
        match err {
            UpstreamError::Status {
                status_code,
                message,
            } => {
                assert_eq!(status_code, 500);
                assert!(message.contains("model not loaded"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_network_error() {
        // Port 9 (discard) is almost certainly closed.
        let client = OllamaClient::new("http://127.0.0.1:9", Duration::from_secs(1));
        let err = client.generate("hi", "mistral").await.unwrap_err();
        assert!(matches!(
            err,
            UpstreamError::Network(_) | UpstreamError::Timeout(_)
        ));
    }
}
