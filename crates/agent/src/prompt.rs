//! System prompt rendering.
//!
//! The prompt describes the assistant persona, the available tools, and
//! the structured call format the model must use to invoke one, followed
//! by the literal user message. Nothing is escaped beyond JSON-serializing
//! the parameter schemas; a tool description that reads like instructions
//! will be seen by the model as instructions.

use mindgate_tools::ToolRegistry;

const PERSONA: &str = "You are a helpful AI assistant with access to external tools. ";

/// Render the complete prompt for one user message.
pub fn build_prompt(message: &str, registry: &ToolRegistry) -> String {
    let mut prompt = String::from(PERSONA);

    if registry.is_empty() {
        prompt.push_str("No tools are currently available.\n\n");
    } else {
        prompt.push_str("You can use the following tools:\n\n");

        for tool in registry.all() {
            prompt.push_str(&format!("Tool: {}\n", tool.name));
            prompt.push_str(&format!("Description: {}\n", tool.description));
            prompt.push_str(&format!(
                "Parameters: {}\n\n",
                serde_json::to_string_pretty(&tool.parameters).unwrap_or_default()
            ));
        }

        prompt.push_str("To use a tool, respond with a JSON object in the following format:\n");
        prompt.push_str(
            "{\"tool\": \"tool_name\", \"parameters\": {\"param1\": \"value1\", \"param2\": \"value2\"}}\n\n",
        );
    }

    prompt.push_str(message);
    prompt
}
