//! Custom error types for the tutor
//!
//! Provides a unified error handling system across all modules.

use thiserror::Error;

/// Main error type for tutor operations
#[derive(Error, Debug)]
pub enum TutorError {
    /// Configuration errors (missing env vars, bad config file)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Access token acquisition failures
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Gemini / Vertex AI model API errors
    #[error("Model API error: {0}")]
    Model(String),

    /// Handbook retrieval errors
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// YouTube search errors
    #[error("Video search error: {0}")]
    Video(String),

    /// Tool execution errors
    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    /// The model kept calling tools past the turn limit
    #[error("Agent '{agent}' exceeded maximum tool turns ({max_turns})")]
    MaxTurnsExceeded { agent: String, max_turns: usize },

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for tutor operations
pub type Result<T> = std::result::Result<T, TutorError>;

impl TutorError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// Create a model API error
    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    /// Create a retrieval error
    pub fn retrieval(msg: impl Into<String>) -> Self {
        Self::Retrieval(msg.into())
    }

    /// Create a video search error
    pub fn video(msg: impl Into<String>) -> Self {
        Self::Video(msg.into())
    }

    /// Create a tool execution error
    pub fn tool(msg: impl Into<String>) -> Self {
        Self::ToolExecution(msg.into())
    }
}
