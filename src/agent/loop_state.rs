//! Agent loop state management
//!
//! Tracks one user turn of the tool-calling loop: how many model calls were
//! made and what each tool returned.

use serde::{Deserialize, Serialize};

use crate::core::ToolResult;

/// State of the agent tool-calling loop
#[derive(Debug, Clone)]
pub struct AgentLoopState {
    /// Model calls made so far
    pub turn: usize,
    /// Maximum allowed model calls
    pub max_turns: usize,
    /// Observations collected from tool executions
    pub observations: Vec<Observation>,
    /// Final answer once the model stops calling tools
    pub final_answer: Option<String>,
}

impl AgentLoopState {
    /// Create a new loop state with the given max turns
    pub fn new(max_turns: usize) -> Self {
        Self {
            turn: 0,
            max_turns,
            observations: Vec::new(),
            final_answer: None,
        }
    }

    /// Check if the loop should continue
    pub fn should_continue(&self) -> bool {
        self.turn < self.max_turns && self.final_answer.is_none()
    }

    /// Add observations from a batch of tool executions
    pub fn add_observations(&mut self, observations: Vec<Observation>) {
        self.observations.extend(observations);
    }

    /// Increment the turn counter
    pub fn next_turn(&mut self) {
        self.turn += 1;
    }

    /// Names of the tools that failed during this turn
    pub fn failed_tools(&self) -> Vec<&str> {
        self.observations
            .iter()
            .filter(|o| !o.success)
            .map(|o| o.tool_name.as_str())
            .collect()
    }
}

/// An observation from a tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    /// Name of the tool that produced this observation
    pub tool_name: String,
    /// Whether the tool execution was successful
    pub success: bool,
    /// Output from the tool
    pub output: String,
}

impl From<&ToolResult> for Observation {
    fn from(result: &ToolResult) -> Self {
        Self {
            tool_name: result.tool_name.clone(),
            success: result.success,
            output: result.output.clone(),
        }
    }
}
