//! Capability functions exposed to the assistant during runs.
//!
//! Each capability implements the [`Tool`] trait; the [`ToolRegistry`] maps
//! tool names to implementations and produces the declarations the provider
//! needs when the assistant is configured.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use windward_core::config::Config;

pub mod weather;

/// Context provided to tools during execution.
#[derive(Clone)]
pub struct ToolContext {
    pub config: Arc<Config>,
}

/// The core tool trait.
///
/// `invoke` takes the already-parsed argument object and returns a
/// human-readable string. Implementations should convert expected upstream
/// failures (bad responses, missing data) into user-facing text themselves;
/// anything returned as `Err` is stringified by the event processor and fed
/// back to the assistant as the tool result.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name as declared to the assistant.
    fn name(&self) -> &str;

    /// Human-readable description for the assistant.
    fn description(&self) -> &str;

    /// JSON Schema describing the tool's parameters.
    fn parameters_schema(&self) -> Value;

    async fn invoke(
        &self,
        args: Map<String, Value>,
        context: &ToolContext,
    ) -> anyhow::Result<String>;
}

/// Registry of available tools.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.push(tool);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.iter().find(|t| t.name() == name).map(|t| t.as_ref())
    }

    pub fn list(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Tool declarations in the assistant-configuration wire shape.
    pub fn to_assistant_tools(&self) -> Vec<Value> {
        self.tools
            .iter()
            .map(|t| {
                serde_json::json!({
                    "type": "function",
                    "function": {
                        "name": t.name(),
                        "description": t.description(),
                        "parameters": t.parameters_schema(),
                    }
                })
            })
            .collect()
    }
}

/// Register the built-in tool set.
pub fn register_builtin_tools(registry: &mut ToolRegistry) {
    registry.register(Box::new(weather::WeatherTool));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup() {
        let mut registry = ToolRegistry::new();
        register_builtin_tools(&mut registry);
        assert!(registry.get("get_weather_information").is_some());
        assert!(registry.get("nope").is_none());
        assert_eq!(registry.list(), vec!["get_weather_information"]);
    }

    #[test]
    fn test_assistant_tools_wire_shape() {
        let mut registry = ToolRegistry::new();
        register_builtin_tools(&mut registry);
        let declared = registry.to_assistant_tools();
        assert_eq!(declared.len(), 1);
        assert_eq!(declared[0]["type"], "function");
        assert_eq!(declared[0]["function"]["name"], "get_weather_information");
        assert!(declared[0]["function"]["parameters"].is_object());
    }
}
