//! LLM module - Language Model integrations
//!
//! Provides the provider abstraction plus the Vertex AI Gemini backend, its
//! access tokens, and the HTTP retry policy.

pub mod auth;
pub mod provider;
pub mod retry;
pub mod traits;

pub use auth::AccessTokenSource;
pub use provider::{create_provider, gemini::GeminiProvider};
pub use traits::{
    ChatRequest, GenerateOptions, LLMProvider, LLMResponse, TokenCallback, TokenUsage,
};
