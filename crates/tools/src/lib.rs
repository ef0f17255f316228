//! Tool registry and dispatch for Mindgate.
//!
//! Tools are remote HTTP endpoints described by an external JSON manifest.
//! The manifest is loaded once at startup into an immutable `ToolRegistry`;
//! the `ToolDispatcher` resolves detected tool calls against it and invokes
//! the endpoint, degrading to an explanatory fallback message when it
//! cannot.

mod dispatcher;
mod manifest;
mod registry;

pub use dispatcher::{DispatchOutcome, ToolDispatcher};
pub use manifest::load_manifest;
pub use registry::ToolRegistry;
