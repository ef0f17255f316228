//! Configuration loading and validation for Mindgate.
//!
//! One immutable `AppConfig` is constructed at process start — from
//! `mindgate.toml` (or an explicit path) with environment variable
//! overrides — and passed explicitly into each component's constructor.
//! Nothing reads the environment after startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the Ollama generation backend
    #[serde(default = "default_ollama_host")]
    pub ollama_host: String,

    /// Base URL of the ChromaDB memory store
    #[serde(default = "default_chroma_host")]
    pub chroma_host: String,

    /// Model requested from the generation backend
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Path to the tool manifest JSON file
    #[serde(default = "default_tools_manifest")]
    pub tools_manifest: PathBuf,

    /// Timeout applied to every outbound HTTP call, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Gateway listener configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Telegram delivery channel configuration
    #[serde(default)]
    pub telegram: TelegramConfig,
}

fn default_ollama_host() -> String {
    "http://ollama:11434".into()
}
fn default_chroma_host() -> String {
    "http://chromadb:8000".into()
}
fn default_model() -> String {
    "mistral".into()
}
fn default_tools_manifest() -> PathBuf {
    PathBuf::from("tools.json")
}
fn default_request_timeout_secs() -> u64 {
    30
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("ollama_host", &self.ollama_host)
            .field("chroma_host", &self.chroma_host)
            .field("default_model", &self.default_model)
            .field("tools_manifest", &self.tools_manifest)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("gateway", &self.gateway)
            .field("telegram", &self.telegram)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    3000
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token from @BotFather. The webhook channel is disabled when
    /// no token is configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_token: Option<String>,
}

impl TelegramConfig {
    pub fn is_configured(&self) -> bool {
        self.bot_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &redact(&self.bot_token))
            .finish()
    }
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl AppConfig {
    /// Load configuration from `mindgate.toml` in the working directory,
    /// then apply environment variable overrides:
    ///
    /// - `OLLAMA_HOST`, `CHROMA_HOST` — backend base URLs
    /// - `DEFAULT_LOCAL_MODEL` — model name
    /// - `TELEGRAM_BOT_TOKEN` — enables the webhook channel
    /// - `MINDGATE_PORT` — gateway listener port
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(Path::new("mindgate.toml"))?;

        if let Ok(host) = std::env::var("OLLAMA_HOST") {
            config.ollama_host = host;
        }
        if let Ok(host) = std::env::var("CHROMA_HOST") {
            config.chroma_host = host;
        }
        if let Ok(model) = std::env::var("DEFAULT_LOCAL_MODEL") {
            config.default_model = model;
        }
        if let Ok(token) = std::env::var("TELEGRAM_BOT_TOKEN") {
            if !token.is_empty() {
                config.telegram.bot_token = Some(token);
            }
        }
        if let Ok(port) = std::env::var("MINDGATE_PORT") {
            config.gateway.port = port.parse().map_err(|_| {
                ConfigError::Validation(format!("MINDGATE_PORT is not a valid port: {port}"))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path. A missing file yields
    /// the defaults rather than an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "request_timeout_secs must be greater than zero".into(),
            ));
        }

        for (name, url) in [
            ("ollama_host", &self.ollama_host),
            ("chroma_host", &self.chroma_host),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::Validation(format!(
                    "{name} must start with http:// or https:// (got {url})"
                )));
            }
        }

        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ollama_host: default_ollama_host(),
            chroma_host: default_chroma_host(),
            default_model: default_model(),
            tools_manifest: default_tools_manifest(),
            request_timeout_secs: default_request_timeout_secs(),
            gateway: GatewayConfig::default(),
            telegram: TelegramConfig::default(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    Validation(String),
}
