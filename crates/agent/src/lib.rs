//! The agent orchestration pipeline for Mindgate.
//!
//! Composes the tool registry, prompt builder, generation backend,
//! tool-call detector, and dispatcher into the synchronous
//! request/response path. The asynchronous webhook path reuses the same
//! orchestrator from the channels crate.

mod detect;
mod orchestrator;
mod prompt;

pub use detect::{Detection, detect};
pub use orchestrator::{ChatError, ChatOrchestrator};
pub use prompt::build_prompt;
