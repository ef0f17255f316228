//! The read-only tool registry.
//!
//! Loaded once at startup and injected into the orchestrator; immutable
//! for the lifetime of the process.

use mindgate_core::tool::ToolDefinition;

/// An ordered, immutable set of available tools.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<ToolDefinition>,
}

impl ToolRegistry {
    pub fn new(tools: Vec<ToolDefinition>) -> Self {
        Self { tools }
    }

    /// Look up a tool by exact, case-sensitive name.
    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.iter().find(|t| t.name == name)
    }

    /// All tools, in manifest order.
    pub fn all(&self) -> &[ToolDefinition] {
        &self.tools
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weather_tool() -> ToolDefinition {
        ToolDefinition {
            name: "weather_current".into(),
            description: "Get current weather for a location".into(),
            parameters: serde_json::json!({"type": "object"}),
            endpoint: "http://n8n:5678/webhook/weather/current".into(),
        }
    }

    #[test]
    fn lookup_is_exact_and_case_sensitive() {
        let registry = ToolRegistry::new(vec![weather_tool()]);
        assert!(registry.get("weather_current").is_some());
        assert!(registry.get("Weather_Current").is_none());
        assert!(registry.get("weather").is_none());
    }

    #[test]
    fn preserves_manifest_order() {
        let mut second = weather_tool();
        second.name = "calendar_add".into();
        let registry = ToolRegistry::new(vec![weather_tool(), second]);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.all()[0].name, "weather_current");
        assert_eq!(registry.all()[1].name, "calendar_add");
    }
}
