//! Exposes an agent to another agent as a callable tool

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, error};

use crate::agent::llm_agent::{AgentEvent, LlmAgent};
use crate::core::{Message, Result, ToolCall, ToolCategory, ToolDefinition, ToolResult};
use crate::tools::Tool;

/// Wraps an [`LlmAgent`] so a parent agent can delegate to it
///
/// Every call runs the wrapped agent on a fresh conversation holding only the
/// `request` argument, and returns its final text.
pub struct AgentTool {
    agent: Arc<LlmAgent>,
}

impl AgentTool {
    pub fn new(agent: Arc<LlmAgent>) -> Self {
        Self { agent }
    }
}

#[async_trait]
impl Tool for AgentTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(
            self.agent.name(),
            self.agent.description(),
            json!({
                "type": "object",
                "properties": {
                    "request": {
                        "type": "string",
                        "description": "The question or task for this agent"
                    }
                },
                "required": ["request"]
            }),
        )
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Agent
    }

    async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
        let request = call.get_string("request").unwrap_or_default();
        let name = self.agent.name().to_string();
        debug!("Delegating to {}: {}", name, request);

        let mut history = vec![Message::user(request)];
        let trace_event = |event: AgentEvent| debug!("[{}] {:?}", name, event);

        match self.agent.run(&mut history, &trace_event).await {
            Ok(reply) => Ok(ToolResult::success(&name, reply)),
            Err(e) => {
                error!("Sub-agent {} failed: {}", name, e);
                Ok(ToolResult::failure(&name, e.to_string()))
            }
        }
    }
}
