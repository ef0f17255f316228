//! # Mindgate Core
//!
//! Domain types, traits, and error definitions for the Mindgate agent
//! front end. This crate has **zero framework dependencies** — it defines
//! the domain model that all other crates implement against.
//!
//! The two outbound seams of the pipeline — the generation backend and the
//! memory store — are traits here, so the orchestrator and the notification
//! pipeline can be exercised against stubs in tests.

pub mod chat;
pub mod error;
pub mod generate;
pub mod memory;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use chat::{ChatRequest, ChatResponse, MemoryRecord};
pub use error::{ChannelError, Error, RegistryError, Result, StoreError, UpstreamError};
pub use generate::Generator;
pub use memory::{InsertReceipt, MemoryFilter, MemoryHit, MemoryStore};
pub use tool::{ToolCallRequest, ToolDefinition};
