//! LLM Provider implementations and factory
//!
//! Gemini on Vertex AI is the only backend; the factory keeps construction in
//! one place so callers only see `Arc<dyn LLMProvider>`.

pub mod gemini;

use std::sync::Arc;

use crate::core::config::Config;
use crate::core::Result;
use crate::llm::auth::AccessTokenSource;
use crate::llm::traits::LLMProvider;

use self::gemini::GeminiProvider;

/// Create a new LLM provider based on configuration
pub fn create_provider(
    config: &Config,
    tokens: Arc<AccessTokenSource>,
) -> Result<Arc<dyn LLMProvider>> {
    let provider: Arc<dyn LLMProvider> = Arc::new(GeminiProvider::from_config(config, tokens)?);
    Ok(provider)
}
