//! Agent module - agents, sessions and the tool-calling loop
//!
//! Contains the agent runtime that coordinates model calls and tool execution,
//! the tutor's agent definitions, and per-session state.

pub mod agent_tool;
pub mod conversation;
pub mod definitions;
pub mod llm_agent;
pub mod loop_state;
pub mod runner;
pub mod scorekeeper;
pub mod session;

pub use agent_tool::AgentTool;
pub use conversation::Conversation;
pub use definitions::{build_researcher, build_tutor, LookupTools, RESEARCHER_NAME, TUTOR_NAME};
pub use llm_agent::{AgentEvent, EventCallback, LlmAgent, LlmAgentBuilder};
pub use loop_state::{AgentLoopState, Observation};
pub use runner::{Runner, STARTUP_MESSAGE};
pub use scorekeeper::{RecordOutcome, ScoreSummary, Scorekeeper, SharedScorekeeper};
pub use session::TutorSession;
