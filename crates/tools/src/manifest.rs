//! Tool manifest loading.
//!
//! The manifest is a JSON array of tool definitions maintained outside the
//! service. Entries missing any of name, description, parameters, or
//! endpoint (or carrying an empty value for one) are dropped with a
//! warning; the pipeline never sees them.

use mindgate_core::error::RegistryError;
use mindgate_core::tool::ToolDefinition;
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

use crate::registry::ToolRegistry;

/// A manifest entry before validation. All fields optional so one bad
/// entry cannot fail the whole file.
#[derive(Debug, Deserialize)]
struct RawToolEntry {
    #[serde(default)]
    name: Option<String>,

    #[serde(default)]
    description: Option<String>,

    #[serde(default)]
    parameters: Option<serde_json::Value>,

    #[serde(default)]
    endpoint: Option<String>,
}

impl RawToolEntry {
    fn validate(self) -> Option<ToolDefinition> {
        let name = self.name.filter(|s| !s.is_empty())?;
        let description = self.description.filter(|s| !s.is_empty())?;
        let parameters = self.parameters.filter(|v| !v.is_null())?;
        let endpoint = self.endpoint.filter(|s| !s.is_empty())?;
        Some(ToolDefinition {
            name,
            description,
            parameters,
            endpoint,
        })
    }
}

/// Load the tool manifest into a registry.
///
/// A missing manifest file is not an error — it yields an empty registry,
/// and the agent states that no tools are available. An unreadable or
/// unparseable file is.
pub fn load_manifest(path: &Path) -> Result<ToolRegistry, RegistryError> {
    if !path.exists() {
        warn!(
            path = %path.display(),
            "Tool manifest not found, starting with an empty registry"
        );
        return Ok(ToolRegistry::default());
    }

    let content = std::fs::read_to_string(path).map_err(|e| RegistryError::Read {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let entries: Vec<RawToolEntry> =
        serde_json::from_str(&content).map_err(|e| RegistryError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

    let total = entries.len();
    let tools: Vec<ToolDefinition> = entries
        .into_iter()
        .filter_map(|entry| match entry.validate() {
            Some(tool) => Some(tool),
            None => {
                warn!("Skipping invalid tool manifest entry");
                None
            }
        })
        .collect();

    if tools.len() != total {
        warn!(
            dropped = total - tools.len(),
            "Filtered out invalid tool definitions"
        );
    }
    info!(count = tools.len(), path = %path.display(), "Loaded tool registry");

    Ok(ToolRegistry::new(tools))
}
