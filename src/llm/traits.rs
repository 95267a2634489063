//! LLM Provider trait for abstracting different backends
//!
//! The agent runtime only talks to this trait, so tests can script model
//! behaviour without a network.

use async_trait::async_trait;

use crate::core::{Message, Result, ToolCall, ToolDefinition};

/// Response from an LLM provider
#[derive(Debug, Clone, Default)]
pub struct LLMResponse {
    /// Text content of the response
    pub content: String,
    /// Any tool calls the model wants to make
    pub tool_calls: Vec<ToolCall>,
    /// Token usage information
    pub usage: Option<TokenUsage>,
    /// Model that generated the response
    pub model: String,
}

impl LLMResponse {
    /// A plain text response
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    /// A response that only requests tool calls
    pub fn tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Default::default()
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Token usage information
#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Options for LLM generation
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Temperature for sampling (0.0 - 2.0)
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
}

/// Everything a provider needs for one model call
#[derive(Debug, Clone, Copy)]
pub struct ChatRequest<'a> {
    /// Model name
    pub model: &'a str,
    /// System instruction for the agent
    pub system_instruction: &'a str,
    /// Conversation so far
    pub messages: &'a [Message],
    /// Tools the model may call
    pub tools: &'a [ToolDefinition],
    /// Sampling options
    pub options: &'a GenerateOptions,
}

/// Callback invoked for each streamed text fragment
pub type TokenCallback<'a> = &'a (dyn Fn(&str) + Send + Sync);

/// Trait for LLM providers
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate a complete response, possibly containing tool calls
    async fn chat_with_tools(&self, request: &ChatRequest<'_>) -> Result<LLMResponse>;

    /// Generate a streaming response, calling `on_token` for each text fragment
    ///
    /// The returned response holds the accumulated text and all tool calls.
    async fn chat_stream(
        &self,
        request: &ChatRequest<'_>,
        on_token: TokenCallback<'_>,
    ) -> Result<LLMResponse> {
        let response = self.chat_with_tools(request).await?;
        if !response.content.is_empty() {
            on_token(&response.content);
        }
        Ok(response)
    }

    /// Get the provider name
    fn name(&self) -> &str;
}
