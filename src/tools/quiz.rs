//! Quiz tools: set_quiz_limit and record_quiz_result

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use crate::agent::scorekeeper::SharedScorekeeper;
use crate::core::{Result, ToolCall, ToolCategory, ToolDefinition, ToolResult};
use crate::tools::Tool;

/// Sets how many questions make up one quiz batch
pub struct SetQuizLimitTool {
    scores: SharedScorekeeper,
}

impl SetQuizLimitTool {
    pub fn new(scores: SharedScorekeeper) -> Self {
        Self { scores }
    }
}

#[async_trait]
impl Tool for SetQuizLimitTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(
            "set_quiz_limit",
            "Sets the number of questions for the current quiz session.",
            json!({
                "type": "object",
                "properties": {
                    "number": {
                        "type": "integer",
                        "description": "How many questions to ask before pausing for a summary"
                    }
                },
                "required": ["number"]
            }),
        )
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Quiz
    }

    async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
        let number = call.get_value("number").cloned().unwrap_or(Value::Null);
        let reply = self.scores.lock().await.set_limit(&number);
        Ok(ToolResult::success("set_quiz_limit", reply))
    }
}

/// Records one answer and reports batch progress
pub struct RecordQuizResultTool {
    scores: SharedScorekeeper,
}

impl RecordQuizResultTool {
    pub fn new(scores: SharedScorekeeper) -> Self {
        Self { scores }
    }
}

#[async_trait]
impl Tool for RecordQuizResultTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(
            "record_quiz_result",
            "Records the user's success/failure on a question and tells you if the batch is done. \
             Call this immediately after evaluating the user's answer.",
            json!({
                "type": "object",
                "properties": {
                    "outcome": {
                        "type": "string",
                        "description": "'correct' or 'incorrect'"
                    },
                    "topic": {
                        "type": "string",
                        "description": "The subject of the question (e.g., 'Parking')"
                    }
                },
                "required": ["outcome", "topic"]
            }),
        )
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Quiz
    }

    async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
        let Some(outcome) = call.get_string("outcome") else {
            return Ok(ToolResult::failure(
                "record_quiz_result",
                "Missing required argument: outcome",
            ));
        };
        let Some(topic) = call.get_string("topic") else {
            return Ok(ToolResult::failure(
                "record_quiz_result",
                "Missing required argument: topic",
            ));
        };

        let recorded = self.scores.lock().await.record(&outcome, &topic);
        if recorded.is_batch_complete() {
            info!("Quiz batch complete");
        }
        Ok(ToolResult::success("record_quiz_result", recorded.to_string()))
    }
}
