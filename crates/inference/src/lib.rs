//! Generation backend client for Mindgate.
//!
//! Talks to an Ollama-style `/api/generate` endpoint and reassembles its
//! streamed, newline-delimited JSON output into one complete text.

mod ollama;

pub use ollama::OllamaClient;
