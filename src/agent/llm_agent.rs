//! Model-driven agents
//!
//! An [`LlmAgent`] pairs an instruction with a tool registry and runs the
//! tool-calling loop: call the model, run whatever functions it asks for, feed
//! the results back, and stop once it answers in plain text.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::agent::loop_state::{AgentLoopState, Observation};
use crate::core::{Message, Result, ToolDefinition, TutorError};
use crate::llm::{ChatRequest, GenerateOptions, LLMProvider, LLMResponse};
use crate::tools::ToolRegistry;

/// Something that happened while an agent handled a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentEvent {
    /// A fragment of reply text
    Text(String),
    /// The model asked for a tool
    ToolCallStarted { name: String },
    /// A tool finished
    ToolCallFinished { name: String, success: bool },
    /// The agent produced its final reply for this message
    TurnComplete,
}

/// Callback receiving agent events as they happen
pub type EventCallback<'a> = &'a (dyn Fn(AgentEvent) + Send + Sync);

/// An agent backed by a language model and a set of tools
pub struct LlmAgent {
    name: String,
    description: String,
    model: String,
    instruction: String,
    tools: Arc<ToolRegistry>,
    provider: Arc<dyn LLMProvider>,
    max_turns: usize,
    streaming: bool,
    options: GenerateOptions,
}

/// Builder for creating LlmAgents
pub struct LlmAgentBuilder {
    name: String,
    description: Option<String>,
    model: Option<String>,
    instruction: Option<String>,
    tools: Option<Arc<ToolRegistry>>,
    provider: Option<Arc<dyn LLMProvider>>,
    max_turns: usize,
    streaming: bool,
    options: GenerateOptions,
}

impl LlmAgentBuilder {
    /// Create a new builder with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            model: None,
            instruction: None,
            tools: None,
            provider: None,
            max_turns: 10,
            streaming: false,
            options: GenerateOptions::default(),
        }
    }

    /// Set the description shown to agents that call this one
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the model to use
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the system instruction
    pub fn instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = Some(instruction.into());
        self
    }

    /// Set the tool registry
    pub fn tools(mut self, tools: Arc<ToolRegistry>) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Set the LLM provider
    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set maximum model calls per message
    pub fn max_turns(mut self, max: usize) -> Self {
        self.max_turns = max.max(1);
        self
    }

    /// Stream reply text as it is generated
    pub fn streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    /// Set sampling temperature
    pub fn temperature(mut self, temperature: Option<f32>) -> Self {
        self.options.temperature = temperature;
        self
    }

    /// Build the LlmAgent
    pub fn build(self) -> Result<LlmAgent> {
        let provider = self.provider.ok_or_else(|| {
            TutorError::config(format!("Agent '{}' has no model provider", self.name))
        })?;
        let model = self
            .model
            .ok_or_else(|| TutorError::config(format!("Agent '{}' has no model", self.name)))?;

        Ok(LlmAgent {
            description: self.description.unwrap_or_default(),
            instruction: self.instruction.unwrap_or_default(),
            tools: self.tools.unwrap_or_default(),
            name: self.name,
            model,
            provider,
            max_turns: self.max_turns,
            streaming: self.streaming,
            options: self.options,
        })
    }
}

impl LlmAgent {
    /// Create a builder
    pub fn builder(name: impl Into<String>) -> LlmAgentBuilder {
        LlmAgentBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Handle the newest message in `history`
    ///
    /// Model turns and tool responses are appended to `history` as they happen.
    /// Returns the final reply text, or [`TutorError::MaxTurnsExceeded`] when
    /// the model is still calling tools after `max_turns` calls.
    pub async fn run(&self, history: &mut Vec<Message>, on_event: EventCallback<'_>) -> Result<String> {
        let tool_defs = self.tools.definitions();
        let mut state = AgentLoopState::new(self.max_turns);

        while state.should_continue() {
            state.next_turn();
            debug!("[{}] model call {}/{}", self.name, state.turn, state.max_turns);

            let response = self.call_model(history, &tool_defs, on_event).await?;

            if !response.has_tool_calls() {
                history.push(Message::model(response.content.clone()));
                state.final_answer = Some(response.content);
                break;
            }

            history.push(Message::model_with_tools(
                response.content,
                response.tool_calls.clone(),
            ));

            let mut results = Vec::with_capacity(response.tool_calls.len());
            for call in &response.tool_calls {
                on_event(AgentEvent::ToolCallStarted {
                    name: call.name.clone(),
                });
                let result = self.tools.execute(call).await;
                on_event(AgentEvent::ToolCallFinished {
                    name: result.tool_name.clone(),
                    success: result.success,
                });
                results.push(result);
            }

            state.add_observations(results.iter().map(Observation::from).collect());
            history.push(Message::tool_results(results));
        }

        let Some(answer) = state.final_answer.take() else {
            warn!(
                "[{}] still calling tools after {} model calls",
                self.name, state.max_turns
            );
            return Err(TutorError::MaxTurnsExceeded {
                agent: self.name.clone(),
                max_turns: state.max_turns,
            });
        };

        if !state.failed_tools().is_empty() {
            debug!("[{}] failed tools: {:?}", self.name, state.failed_tools());
        }
        info!(
            "[{}] replied after {} model call(s), {} tool call(s)",
            self.name,
            state.turn,
            state.observations.len()
        );
        on_event(AgentEvent::TurnComplete);
        Ok(answer)
    }

    async fn call_model(
        &self,
        history: &[Message],
        tool_defs: &[ToolDefinition],
        on_event: EventCallback<'_>,
    ) -> Result<LLMResponse> {
        let request = ChatRequest {
            model: &self.model,
            system_instruction: &self.instruction,
            messages: history,
            tools: tool_defs,
            options: &self.options,
        };

        if self.streaming {
            let forward = |fragment: &str| on_event(AgentEvent::Text(fragment.to_string()));
            self.provider.chat_stream(&request, &forward).await
        } else {
            let response = self.provider.chat_with_tools(&request).await?;
            if !response.content.is_empty() {
                on_event(AgentEvent::Text(response.content.clone()));
            }
            Ok(response)
        }
    }
}
