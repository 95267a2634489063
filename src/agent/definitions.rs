//! The tutor's agents
//!
//! `cali_driver_researcher` answers handbook questions with `search_handbook`.
//! `driving_tutor` runs the lesson, owns the quiz and video tools, and
//! delegates handbook questions to the researcher.

use std::sync::Arc;

use crate::agent::agent_tool::AgentTool;
use crate::agent::llm_agent::LlmAgent;
use crate::agent::scorekeeper::SharedScorekeeper;
use crate::core::{Config, Prompts, Result};
use crate::llm::{AccessTokenSource, LLMProvider};
use crate::tools::{
    HandbookSearchTool, RecordQuizResultTool, SetQuizLimitTool, Tool, ToolRegistry,
    VideoSearchTool,
};

pub const RESEARCHER_NAME: &str = "cali_driver_researcher";
pub const TUTOR_NAME: &str = "driving_tutor";

/// Tools that reach external services
pub struct LookupTools {
    pub handbook: Arc<dyn Tool>,
    pub video: Arc<dyn Tool>,
}

impl LookupTools {
    pub fn from_config(config: &Config, tokens: Arc<AccessTokenSource>) -> Self {
        Self {
            handbook: Arc::new(HandbookSearchTool::from_config(config, tokens)),
            video: Arc::new(VideoSearchTool::from_config(&config.video)),
        }
    }
}

/// Build the handbook research agent
pub fn build_researcher(
    config: &Config,
    instruction: &str,
    provider: Arc<dyn LLMProvider>,
    handbook: Arc<dyn Tool>,
) -> Result<LlmAgent> {
    let tools = ToolRegistry::new().with(handbook);

    LlmAgent::builder(RESEARCHER_NAME)
        .description(
            "Looks up facts in the California Driver's Handbook. \
             Send it a specific question and it returns what the handbook says.",
        )
        .model(&config.model.name)
        .instruction(instruction)
        .tools(Arc::new(tools))
        .provider(provider)
        .max_turns(config.agent.max_turns)
        .temperature(config.model.temperature)
        .build()
}

/// Build the root tutor agent with the researcher wired in as a tool
pub fn build_tutor(
    config: &Config,
    prompts: &Prompts,
    provider: Arc<dyn LLMProvider>,
    lookups: &LookupTools,
    scores: SharedScorekeeper,
) -> Result<LlmAgent> {
    let researcher = build_researcher(
        config,
        &prompts.rag,
        provider.clone(),
        lookups.handbook.clone(),
    )?;

    let tools = ToolRegistry::new()
        .with(lookups.video.clone())
        .with(Arc::new(RecordQuizResultTool::new(scores.clone())))
        .with(Arc::new(SetQuizLimitTool::new(scores)))
        .with(Arc::new(AgentTool::new(Arc::new(researcher))));

    LlmAgent::builder(TUTOR_NAME)
        .description("California driver's license exam tutor")
        .model(&config.model.name)
        .instruction(&prompts.root)
        .tools(Arc::new(tools))
        .provider(provider)
        .max_turns(config.agent.max_turns)
        .streaming(config.streaming.enabled)
        .temperature(config.model.temperature)
        .build()
}
