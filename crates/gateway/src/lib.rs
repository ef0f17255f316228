//! HTTP API gateway for Mindgate.
//!
//! Exposes the REST surface:
//!
//! - `GET  /health`   — liveness probe
//! - `POST /chat`     — synchronous chat
//! - `POST /remember` — store a memory record
//! - `GET  /query`    — search memory
//! - `POST /telegram` — Telegram webhook (always acknowledged with 200)
//!
//! Built on Axum. All subsystems are constructed once in `start` and
//! shared through `AppState`; handlers never build clients or reload
//! configuration per request.

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use mindgate_agent::{ChatError, ChatOrchestrator};
use mindgate_channels::{NotificationPipeline, TelegramApi, TelegramUpdate};
use mindgate_config::AppConfig;
use mindgate_core::chat::{ChatRequest, ChatResponse, MemoryRecord};
use mindgate_core::memory::{InsertReceipt, MemoryFilter, MemoryStore};
use mindgate_inference::OllamaClient;
use mindgate_memory::ChromaStore;
use mindgate_tools::{ToolDispatcher, load_manifest};

/// Shared application state for the gateway.
pub struct AppState {
    pub orchestrator: Arc<ChatOrchestrator>,
    pub memory: Arc<dyn MemoryStore>,
    /// Absent when no bot token is configured; the webhook then drops
    /// updates after acknowledging them.
    pub pipeline: Option<Arc<NotificationPipeline>>,
}

pub type SharedState = Arc<AppState>;

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/chat", post(chat_handler))
        .route("/remember", post(remember_handler))
        .route("/query", get(query_handler))
        .route("/telegram", post(telegram_handler))
        .layer(CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server.
///
/// Builds the generation client, tool registry, dispatcher, memory
/// store, and (when configured) the Telegram pipeline ONCE and shares
/// them via Arc.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let timeout = Duration::from_secs(config.request_timeout_secs);

    let registry = Arc::new(load_manifest(&config.tools_manifest)?);
    info!(tools = registry.len(), "Tool registry loaded");

    let generator = Arc::new(OllamaClient::new(&config.ollama_host, timeout));
    let dispatcher = ToolDispatcher::new(timeout);
    let orchestrator = Arc::new(ChatOrchestrator::new(
        generator,
        registry,
        dispatcher,
        &config.default_model,
    ));

    let memory: Arc<dyn MemoryStore> = Arc::new(ChromaStore::new(&config.chroma_host, timeout));

    let pipeline = config.telegram.bot_token.as_deref().filter(|t| !t.is_empty()).map(|token| {
        info!("Telegram webhook channel enabled");
        Arc::new(NotificationPipeline::new(
            orchestrator.clone(),
            Arc::new(TelegramApi::new(token, timeout)),
            memory.clone(),
        ))
    });
    if pipeline.is_none() {
        info!("No Telegram bot token configured, webhook channel disabled");
    }

    let state = Arc::new(AppState {
        orchestrator,
        memory,
        pipeline,
    });

    let app = build_router(state);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Json<Self> {
        Json(Self {
            error: error.into(),
            details: None,
        })
    }

    fn with_details(error: impl Into<String>, details: impl Into<String>) -> Json<Self> {
        Json(Self {
            error: error.into(),
            details: Some(details.into()),
        })
    }
}

async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.orchestrator.handle(payload).await {
        Ok(response) => Ok(Json(response)),
        Err(ChatError::MissingMessage) => Err((
            StatusCode::BAD_REQUEST,
            ErrorResponse::new("Message is required"),
        )),
        Err(ChatError::Upstream(e)) => {
            error!(error = %e, "Chat request failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::with_details("Failed to process chat request", e.to_string()),
            ))
        }
    }
}

async fn remember_handler(
    State(state): State<SharedState>,
    Json(record): Json<MemoryRecord>,
) -> Result<Json<InsertReceipt>, (StatusCode, Json<ErrorResponse>)> {
    if record.content.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            ErrorResponse::new("content is required"),
        ));
    }

    match state.memory.insert(record).await {
        Ok(receipt) => Ok(Json(receipt)),
        Err(e) => {
            error!(error = %e, "Memory insert failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new("Failed to store memory"),
            ))
        }
    }
}

#[derive(Debug, Deserialize)]
struct QueryParams {
    #[serde(default)]
    q: Option<String>,

    #[serde(default, rename = "userId")]
    user_id: Option<String>,

    #[serde(default)]
    context: Option<String>,
}

#[derive(Serialize)]
struct QueryResponse {
    query: Option<String>,
    filters: QueryFilters,
    count: usize,
    results: Vec<mindgate_core::memory::MemoryHit>,
}

#[derive(Serialize)]
struct QueryFilters {
    #[serde(rename = "userId")]
    user_id: Option<String>,
    context: Option<String>,
}

async fn query_handler(
    State(state): State<SharedState>,
    Query(params): Query<QueryParams>,
) -> Result<Json<QueryResponse>, (StatusCode, Json<ErrorResponse>)> {
    let filter = MemoryFilter {
        q: params.q.clone(),
        user_id: params.user_id.clone(),
        context: params.context.clone(),
    };

    match state.memory.query(filter).await {
        Ok(results) => Ok(Json(QueryResponse {
            query: params.q,
            filters: QueryFilters {
                user_id: params.user_id,
                context: params.context,
            },
            count: results.len(),
            results,
        })),
        Err(e) => {
            error!(error = %e, "Memory query failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new("Failed to query memory"),
            ))
        }
    }
}

/// The webhook contract: acknowledge every delivery with 200 so Telegram
/// never retries, regardless of what the payload contains. The body is
/// parsed leniently here instead of through a Json extractor, which
/// would reject malformed bodies with a 400.
async fn telegram_handler(State(state): State<SharedState>, body: String) -> &'static str {
    let Some(pipeline) = state.pipeline.as_ref() else {
        warn!("Webhook update received but no Telegram channel is configured");
        return "OK";
    };

    match serde_json::from_str::<TelegramUpdate>(&body) {
        Ok(update) => {
            let _ = pipeline.submit(update);
        }
        Err(e) => {
            warn!(error = %e, "Unparseable webhook payload dropped");
        }
    }

    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::Utc;
    use http_body_util::BodyExt;
    use mindgate_core::error::{StoreError, UpstreamError};
    use mindgate_core::generate::Generator;
    use mindgate_core::memory::MemoryHit;
    use mindgate_tools::ToolRegistry;
    use tower::ServiceExt;

    struct StubGenerator {
        output: Result<String, UpstreamError>,
    }

    #[async_trait]
    impl Generator for StubGenerator {
        fn name(&self) -> &str {
            "stub"
        }

        async fn generate(&self, _prompt: &str, _model: &str) -> Result<String, UpstreamError> {
            self.output.clone()
        }
    }

    struct StubStore {
        fail: bool,
    }

    #[async_trait]
    impl MemoryStore for StubStore {
        fn name(&self) -> &str {
            "stub"
        }

        async fn insert(&self, _record: MemoryRecord) -> Result<InsertReceipt, StoreError> {
            if self.fail {
                return Err(StoreError::Insert("store unavailable".into()));
            }
            Ok(InsertReceipt {
                success: true,
                id: "stub-id".into(),
                timestamp: Utc::now(),
            })
        }

        async fn query(&self, _filter: MemoryFilter) -> Result<Vec<MemoryHit>, StoreError> {
            if self.fail {
                return Err(StoreError::Query("store unavailable".into()));
            }
            Ok(vec![MemoryHit {
                content: "User likes tea".into(),
                metadata: serde_json::json!({ "userId": "alice" }),
                relevance: 0.82,
            }])
        }
    }

    fn test_state(generator_output: Result<String, UpstreamError>, store_fails: bool) -> SharedState {
        let orchestrator = Arc::new(ChatOrchestrator::new(
            Arc::new(StubGenerator {
                output: generator_output,
            }),
            Arc::new(ToolRegistry::default()),
            ToolDispatcher::new(Duration::from_secs(1)),
            "mistral",
        ));
        Arc::new(AppState {
            orchestrator,
            memory: Arc::new(StubStore { fail: store_fails }),
            pipeline: None,
        })
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = build_router(test_state(Ok("hi".into()), false));
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert!(json["version"].is_string());
    }

    #[tokio::test]
    async fn chat_returns_unified_response() {
        let app = build_router(test_state(Ok("Hello!".into()), false));
        let response = app
            .oneshot(post_json("/chat", serde_json::json!({ "message": "Hi" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["response"], "Hello!");
        assert_eq!(json["model"], "mistral");
        assert_eq!(json["userId"], "default");
        assert_eq!(json["context"], "personal");
        assert_eq!(json["toolUsed"], false);
        assert!(json["timestamp"].is_string());
    }

    #[tokio::test]
    async fn chat_without_message_is_400() {
        let app = build_router(test_state(Ok("unused".into()), false));
        let response = app
            .oneshot(post_json("/chat", serde_json::json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["error"], "Message is required");
    }

    #[tokio::test]
    async fn chat_upstream_failure_is_500_with_details() {
        let app = build_router(test_state(
            Err(UpstreamError::Network("connection refused".into())),
            false,
        ));
        let response = app
            .oneshot(post_json("/chat", serde_json::json!({ "message": "Hi" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["error"], "Failed to process chat request");
        assert!(json["details"].as_str().unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn remember_returns_receipt() {
        let app = build_router(test_state(Ok("hi".into()), false));
        let response = app
            .oneshot(post_json(
                "/remember",
                serde_json::json!({ "content": "User likes tea", "userId": "alice" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["id"], "stub-id");
    }

    #[tokio::test]
    async fn remember_without_content_is_400() {
        let app = build_router(test_state(Ok("hi".into()), false));
        let response = app
            .oneshot(post_json("/remember", serde_json::json!({ "content": "  " })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["error"], "content is required");
    }

    #[tokio::test]
    async fn remember_with_absent_content_field_is_400() {
        let app = build_router(test_state(Ok("hi".into()), false));
        let response = app
            .oneshot(post_json("/remember", serde_json::json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["error"], "content is required");
    }

    #[tokio::test]
    async fn remember_store_failure_is_500() {
        let app = build_router(test_state(Ok("hi".into()), true));
        let response = app
            .oneshot(post_json("/remember", serde_json::json!({ "content": "x" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn query_echoes_filters_and_counts() {
        let app = build_router(test_state(Ok("hi".into()), false));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/query?q=tea&userId=alice&context=personal")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["query"], "tea");
        assert_eq!(json["filters"]["userId"], "alice");
        assert_eq!(json["filters"]["context"], "personal");
        assert_eq!(json["count"], 1);
        assert_eq!(json["results"][0]["content"], "User likes tea");
    }

    #[tokio::test]
    async fn query_without_parameters_is_valid() {
        let app = build_router(test_state(Ok("hi".into()), false));
        let response = app
            .oneshot(Request::builder().uri("/query").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert!(json["query"].is_null());
        assert!(json["filters"]["userId"].is_null());
    }

    #[tokio::test]
    async fn webhook_acknowledges_when_channel_is_unconfigured() {
        let app = build_router(test_state(Ok("hi".into()), false));
        let response = app
            .oneshot(post_json(
                "/telegram",
                serde_json::json!({
                    "update_id": 1,
                    "message": { "text": "hi", "chat": { "id": 5 } }
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn webhook_acknowledges_malformed_payloads() {
        let app = build_router(test_state(Ok("hi".into()), false));
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/telegram")
                    .header("content-type", "application/json")
                    .body(Body::from("this is not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
