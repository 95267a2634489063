//! Tool registry - manages and dispatches tool calls
//!
//! Central hub for registering tools and routing tool calls to handlers.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::core::{ToolCall, ToolCategory, ToolDefinition, ToolResult};
use crate::tools::Tool;

/// Registry of available tools
#[derive(Default)]
pub struct ToolRegistry {
    /// Tool definitions indexed by name
    definitions: HashMap<String, ToolDefinition>,
    /// Tool categories
    categories: HashMap<String, ToolCategory>,
    /// Tool handlers
    handlers: HashMap<String, Arc<dyn Tool>>,
    /// Registration order, used for the declarations sent to the model
    order: Vec<String>,
}

impl ToolRegistry {
    /// Create an empty tool registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool; a tool with the same name replaces the earlier one
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let definition = tool.definition();
        let name = definition.name.clone();

        if self.handlers.contains_key(&name) {
            warn!("Tool '{}' registered twice, keeping the latest", name);
        } else {
            self.order.push(name.clone());
        }

        self.categories.insert(name.clone(), tool.category());
        self.definitions.insert(name.clone(), definition);
        self.handlers.insert(name, tool);
    }

    /// Builder-style registration
    pub fn with(mut self, tool: Arc<dyn Tool>) -> Self {
        self.register(tool);
        self
    }

    /// Get all tool definitions in registration order
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.order
            .iter()
            .filter_map(|name| self.definitions.get(name))
            .cloned()
            .collect()
    }

    /// Registered tool names in registration order
    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Execute a tool call
    ///
    /// Unknown tools and tool errors become failed results for the model.
    pub async fn execute(&self, tool_call: &ToolCall) -> ToolResult {
        let Some(tool) = self.handlers.get(&tool_call.name) else {
            warn!("Model requested unknown tool '{}'", tool_call.name);
            return ToolResult::failure(
                &tool_call.name,
                format!("Unknown tool: {}", tool_call.name),
            );
        };

        let category = self.categories.get(&tool_call.name).copied();
        info!(
            "Running {} tool {} {}",
            category.map(|c| c.to_string()).unwrap_or_default(),
            tool_call.name,
            tool_call.arguments
        );
        match tool.execute(tool_call).await {
            Ok(result) => result,
            Err(e) => ToolResult::failure(&tool_call.name, e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Result, TutorError};
    use async_trait::async_trait;
    use serde_json::json;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition::function("echo", "Echo the text", json!({"type": "object"}))
        }

        fn category(&self) -> ToolCategory {
            ToolCategory::Media
        }

        async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
            Ok(ToolResult::success(
                "echo",
                call.get_string("text").unwrap_or_default(),
            ))
        }
    }

    struct BrokenTool;

    #[async_trait]
    impl Tool for BrokenTool {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition::function("broken", "Always fails", json!({"type": "object"}))
        }

        fn category(&self) -> ToolCategory {
            ToolCategory::Quiz
        }

        async fn execute(&self, _call: &ToolCall) -> Result<ToolResult> {
            Err(TutorError::tool("boom"))
        }
    }

    #[tokio::test]
    async fn test_dispatch_by_name() {
        let registry = ToolRegistry::new()
            .with(Arc::new(EchoTool))
            .with(Arc::new(BrokenTool));

        let result = registry
            .execute(&ToolCall::new("echo", json!({"text": "hi"})))
            .await;
        assert!(result.success);
        assert_eq!(result.output, "hi");

        let result = registry.execute(&ToolCall::new("broken", json!({}))).await;
        assert!(!result.success);
        assert!(result.output.contains("boom"));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_a_failed_result() {
        let registry = ToolRegistry::new();
        let result = registry.execute(&ToolCall::new("nope", json!({}))).await;
        assert!(!result.success);
        assert_eq!(result.output, "Unknown tool: nope");
    }

    #[test]
    fn test_duplicate_registration_keeps_one_declaration() {
        let registry = ToolRegistry::new()
            .with(Arc::new(EchoTool))
            .with(Arc::new(BrokenTool))
            .with(Arc::new(EchoTool));

        assert_eq!(registry.len(), 2);
        let names: Vec<_> = registry.definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["echo", "broken"]);
        assert_eq!(registry.names(), ["echo", "broken"]);
    }
}
