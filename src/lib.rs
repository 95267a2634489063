//! dmv-tutor - California driver's license exam tutor
//!
//! A console tutor backed by Gemini on Vertex AI. The tutor agent quizzes the
//! student, keeps score, finds instructional videos on YouTube, and delegates
//! handbook questions to a research agent that searches a Vertex AI RAG
//! corpus of the driver's handbook.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, prompts, and error handling
//! - **LLM**: Provider abstraction with the Vertex AI Gemini implementation
//! - **Tools**: Quiz, video, and handbook tools plus the registry
//! - **Agent**: Tool-calling loop, agent definitions, and session state
//! - **CLI**: Interactive console
//!
//! # Usage
//!
//! ```rust,no_run
//! use dmv_tutor::{Config, Runner};
//!
//! #[tokio::main]
//! async fn main() -> dmv_tutor::Result<()> {
//!     let config = Config::load()?;
//!     let mut runner = Runner::from_config(&config)?;
//!
//!     let reply = runner.send("Quiz me on parking rules", &|_event| {}).await?;
//!     println!("{}", reply);
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod core;
pub mod llm;
pub mod tools;

// Re-export commonly used items
pub use agent::{AgentEvent, Runner};
pub use cli::Repl;
pub use core::{Config, Result, TutorError};
