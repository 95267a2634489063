//! Tutoring session state
//!
//! One session per process: identifiers, the conversation so far, and the
//! quiz score.

use uuid::Uuid;

use crate::agent::conversation::Conversation;
use crate::agent::scorekeeper::{Scorekeeper, SharedScorekeeper};
use crate::core::Config;

/// A single student's tutoring session
pub struct TutorSession {
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
    pub conversation: Conversation,
    scores: SharedScorekeeper,
}

impl TutorSession {
    pub fn new(config: &Config) -> Self {
        Self {
            app_name: config.agent.app_name.clone(),
            user_id: config.agent.user_id.clone(),
            session_id: Uuid::new_v4().to_string(),
            conversation: Conversation::new(config.agent.max_history),
            scores: Scorekeeper::shared(),
        }
    }

    /// Handle to the scorekeeper, shared with the quiz tools
    pub fn scores(&self) -> SharedScorekeeper {
        self.scores.clone()
    }

    /// Forget the conversation and the score, keeping the session identity
    pub async fn reset(&mut self) {
        self.conversation.clear();
        self.scores.lock().await.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Message;
    use serde_json::json;

    #[tokio::test]
    async fn test_reset_clears_history_and_score() {
        let mut session = TutorSession::new(&Config::default());
        assert_eq!(session.app_name, "driver-prep-app");
        assert!(Uuid::parse_str(&session.session_id).is_ok());

        session.conversation.push(Message::user("hi"));
        {
            let scores = session.scores();
            let mut sk = scores.lock().await;
            sk.set_limit(&json!(2));
            sk.record("correct", "Parking");
        }

        let id = session.session_id.clone();
        session.reset().await;

        assert!(session.conversation.is_empty());
        assert_eq!(session.scores().lock().await.summary().total, 0);
        assert_eq!(session.session_id, id);
    }
}
