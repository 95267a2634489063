//! Runner - drives the tutor agent for one session
//!
//! Holds the root agent and the session, and commits each exchange to the
//! conversation only after the agent finished it. A failed turn leaves the
//! history and the quiz score as they were before the message.

use std::sync::Arc;

use tracing::{info, warn};

use crate::agent::definitions::{build_tutor, LookupTools};
use crate::agent::llm_agent::{EventCallback, LlmAgent};
use crate::agent::scorekeeper::ScoreSummary;
use crate::agent::session::TutorSession;
use crate::core::{Config, Message, Prompts, Result};
use crate::llm::{create_provider, AccessTokenSource, LLMProvider};

/// Scripted request that makes the tutor introduce itself
pub const STARTUP_MESSAGE: &str =
    "System: Begin session. Introduce yourself exactly as defined in PHASE 1 of your instructions.";

/// Runs the tutor agent against one session
pub struct Runner {
    agent: LlmAgent,
    session: TutorSession,
}

impl Runner {
    /// Create a runner talking to Vertex AI
    pub fn from_config(config: &Config) -> Result<Self> {
        let tokens = Arc::new(AccessTokenSource::from_config(config));
        let provider = create_provider(config, tokens.clone())?;
        let lookups = LookupTools::from_config(config, tokens);
        Self::with_parts(config, provider, lookups)
    }

    /// Create a runner from explicit parts
    pub fn with_parts(
        config: &Config,
        provider: Arc<dyn LLMProvider>,
        lookups: LookupTools,
    ) -> Result<Self> {
        let prompts = Prompts::load(&config.agent.prompts_dir);
        let session = TutorSession::new(config);
        let agent = build_tutor(config, &prompts, provider, &lookups, session.scores())?;

        info!(
            "Session {} created for {} ({})",
            session.session_id, session.user_id, session.app_name
        );
        Ok(Self { agent, session })
    }

    /// Ask the tutor to introduce itself
    pub async fn start(&mut self, on_event: EventCallback<'_>) -> Result<String> {
        self.send(STARTUP_MESSAGE, on_event).await
    }

    /// Send one user message and return the tutor's reply
    ///
    /// A failed turn is undone as a whole: the conversation and the score go
    /// back to what they were before the message, so quiz tools that already
    /// ran are not counted for an exchange the model no longer sees.
    pub async fn send(&mut self, text: &str, on_event: EventCallback<'_>) -> Result<String> {
        let scores = self.session.scores();
        let snapshot = scores.lock().await.clone();

        let mut history = self.session.conversation.messages();
        let committed = history.len();
        history.push(Message::user(text));

        let reply = match self.agent.run(&mut history, on_event).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Turn failed, restoring score and history: {}", e);
                *scores.lock().await = snapshot;
                return Err(e);
            }
        };

        self.session
            .conversation
            .extend(history.into_iter().skip(committed));
        Ok(reply)
    }

    /// Current quiz score
    pub async fn score(&self) -> ScoreSummary {
        self.session.scores().lock().await.summary()
    }

    /// Clear the conversation and the score
    pub async fn reset(&mut self) {
        self.session.reset().await;
        info!("Session {} reset", self.session.session_id);
    }

    pub fn session(&self) -> &TutorSession {
        &self.session
    }

    pub fn agent(&self) -> &LlmAgent {
        &self.agent
    }
}
