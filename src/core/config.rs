//! Configuration management for the tutor
//!
//! Supports a `.env` file, environment variables, a TOML config file, and
//! runtime overrides. Environment variables always win over the file.
//!
//! Config file location: ~/.config/dmv-tutor/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

use crate::core::error::{Result, TutorError};

/// Main configuration for the tutor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Google Cloud project settings
    pub google: GoogleConfig,
    /// Gemini model settings
    pub model: ModelConfig,
    /// Handbook retrieval settings
    pub handbook: HandbookConfig,
    /// YouTube search settings
    pub video: VideoConfig,
    /// Agent behavior settings
    pub agent: AgentConfig,
    /// Streaming configuration
    pub streaming: StreamingConfig,
}

/// Google Cloud project configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    /// Project id (GOOGLE_CLOUD_PROJECT), required
    pub project_id: Option<String>,
    /// Region (GOOGLE_CLOUD_REGION)
    pub location: String,
    /// Pre-minted OAuth access token (GOOGLE_OAUTH_ACCESS_TOKEN); gcloud is used otherwise
    #[serde(skip)]
    pub access_token: Option<String>,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            location: "us-central1".to_string(),
            access_token: None,
        }
    }
}

/// Gemini model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model name on Vertex AI
    pub name: String,
    /// Sampling temperature, model default when unset
    pub temperature: Option<f32>,
    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
    /// Override for the Vertex AI base URL
    pub endpoint: Option<String>,
    /// Retry policy for model requests
    pub retry: RetryConfig,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "gemini-2.5-flash".to_string(),
            temperature: None,
            timeout_secs: 120,
            endpoint: None,
            retry: RetryConfig::default(),
        }
    }
}

/// HTTP retry policy for the model client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts including the first one
    pub attempts: u32,
    /// Delay before the first retry, in seconds
    pub initial_delay_secs: f64,
    /// Multiplier applied to the delay after each retry
    pub exp_base: f64,
    /// Upper bound on a single delay, in seconds
    pub max_delay_secs: f64,
    /// Status codes that trigger a retry
    pub http_status_codes: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 5,
            initial_delay_secs: 1.0,
            exp_base: 7.0,
            max_delay_secs: 60.0,
            http_status_codes: vec![429, 500, 503, 504],
        }
    }
}

impl RetryConfig {
    /// Whether a response status should be retried
    pub fn is_retryable(&self, status: u16) -> bool {
        self.http_status_codes.contains(&status)
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_secs_f64(self.initial_delay_secs.max(0.0))
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_secs_f64(self.max_delay_secs.max(0.0))
    }
}

/// Handbook retrieval (Vertex AI RAG Engine) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HandbookConfig {
    /// Full corpus resource name (RAG_CORPUS_NAME), required
    pub corpus_name: Option<String>,
    /// Number of contexts to retrieve
    pub top_k: u32,
    /// Override for the Vertex AI base URL
    pub endpoint: Option<String>,
}

impl Default for HandbookConfig {
    fn default() -> Self {
        Self {
            corpus_name: None,
            top_k: 7,
            endpoint: None,
        }
    }
}

/// YouTube Data API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// API key (YOUTUBE_API_KEY); the video tool reports unavailable without it
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Base URL of the YouTube Data API
    pub endpoint: String,
    /// Search query template, `{topic}` is substituted
    pub query_template: String,
    /// `videoDuration` filter
    pub video_duration: String,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: "https://www.googleapis.com/youtube/v3".to_string(),
            query_template: "how to {topic} california dmv driving test".to_string(),
            video_duration: "medium".to_string(),
        }
    }
}

/// Agent behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Maximum model calls per user turn before giving up
    pub max_turns: usize,
    /// Maximum conversation history length
    pub max_history: usize,
    /// Directory holding root_prompt.txt and rag_prompt.txt
    pub prompts_dir: PathBuf,
    /// Application name recorded on the session
    pub app_name: String,
    /// User id recorded on the session
    pub user_id: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_turns: 10,
            max_history: 200,
            prompts_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/prompts")),
            app_name: "driver-prep-app".to_string(),
            user_id: "local-student".to_string(),
        }
    }
}

/// Streaming configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Whether to stream responses in real-time
    pub enabled: bool,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn env_flag(key: &str) -> Option<bool> {
    env::var(key).ok().map(|v| v == "true" || v == "1")
}

fn env_non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dmv-tutor")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load and validate configuration from `.env`, file, and environment
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load and validate configuration, reading an explicit config file if given
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        // A missing .env file is fine
        let _ = dotenvy::dotenv();

        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None if Self::config_file().exists() => Self::load_from_file(&Self::config_file())?,
            None => Self::default(),
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file only
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            TutorError::config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Overlay environment variables onto the current values
    pub fn apply_env_overrides(&mut self) {
        if let Some(project) = env_non_empty("GOOGLE_CLOUD_PROJECT") {
            self.google.project_id = Some(project);
        }
        if let Some(region) = env_non_empty("GOOGLE_CLOUD_REGION") {
            self.google.location = region;
        }
        if let Some(token) = env_non_empty("GOOGLE_OAUTH_ACCESS_TOKEN") {
            self.google.access_token = Some(token);
        }
        if let Some(corpus) = env_non_empty("RAG_CORPUS_NAME") {
            self.handbook.corpus_name = Some(corpus);
        }
        if let Some(key) = env_non_empty("YOUTUBE_API_KEY") {
            self.video.api_key = Some(key);
        }
        if let Some(model) = env_non_empty("DMV_TUTOR_MODEL") {
            self.model.name = model;
        }
        if let Some(dir) = env_non_empty("DMV_TUTOR_PROMPTS_DIR") {
            self.agent.prompts_dir = PathBuf::from(dir);
        }
        if let Some(streaming) = env_flag("DMV_TUTOR_STREAMING") {
            self.streaming.enabled = streaming;
        }
    }

    /// Fail fast when required values are missing
    pub fn validate(&self) -> Result<()> {
        let missing_project = self.google.project_id.as_deref().map_or(true, str::is_empty);
        let missing_corpus = self.handbook.corpus_name.as_deref().map_or(true, str::is_empty);

        if missing_project || missing_corpus {
            return Err(TutorError::config(
                "Missing critical environment variables (GOOGLE_CLOUD_PROJECT or RAG_CORPUS_NAME).",
            ));
        }
        if self.model.retry.attempts == 0 {
            return Err(TutorError::config("model.retry.attempts must be at least 1"));
        }

        let endpoints = [
            ("model.endpoint", self.model.endpoint.as_deref()),
            ("handbook.endpoint", self.handbook.endpoint.as_deref()),
            ("video.endpoint", Some(self.video.endpoint.as_str())),
        ];
        for (key, endpoint) in endpoints {
            if let Some(endpoint) = endpoint {
                Url::parse(endpoint).map_err(|e| {
                    TutorError::config(format!("{} is not a valid URL ({}): {}", key, endpoint, e))
                })?;
            }
        }
        Ok(())
    }

    /// Project id, empty when unset (only reachable before validation)
    pub fn project_id(&self) -> &str {
        self.google.project_id.as_deref().unwrap_or_default()
    }

    /// Corpus resource name, empty when unset (only reachable before validation)
    pub fn corpus_name(&self) -> &str {
        self.handbook.corpus_name.as_deref().unwrap_or_default()
    }

    /// Vertex AI base URL for model calls
    pub fn model_base_url(&self) -> String {
        self.model
            .endpoint
            .clone()
            .unwrap_or_else(|| self.default_vertex_url())
    }

    /// Vertex AI base URL for RAG calls
    pub fn handbook_base_url(&self) -> String {
        self.handbook
            .endpoint
            .clone()
            .unwrap_or_else(|| self.default_vertex_url())
    }

    fn default_vertex_url(&self) -> String {
        format!("https://{}-aiplatform.googleapis.com", self.google.location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ENV_KEYS: &[&str] = &[
        "GOOGLE_CLOUD_PROJECT",
        "GOOGLE_CLOUD_REGION",
        "GOOGLE_OAUTH_ACCESS_TOKEN",
        "RAG_CORPUS_NAME",
        "YOUTUBE_API_KEY",
        "DMV_TUTOR_MODEL",
        "DMV_TUTOR_PROMPTS_DIR",
        "DMV_TUTOR_STREAMING",
    ];

    fn clear_env() {
        for key in ENV_KEYS {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.model.name, "gemini-2.5-flash");
        assert_eq!(config.google.location, "us-central1");
        assert_eq!(config.handbook.top_k, 7);
        assert_eq!(config.agent.max_turns, 10);
        assert!(config.streaming.enabled);
        assert!(config.agent.prompts_dir.ends_with("prompts"));
    }

    #[test]
    fn test_default_retry_policy() {
        let retry = RetryConfig::default();
        assert_eq!(retry.attempts, 5);
        assert_eq!(retry.exp_base, 7.0);
        assert_eq!(retry.initial_delay(), Duration::from_secs(1));
        for status in [429, 500, 503, 504] {
            assert!(retry.is_retryable(status));
        }
        assert!(!retry.is_retryable(400));
        assert!(!retry.is_retryable(502));
    }

    #[test]
    fn test_validate_requires_project_and_corpus() {
        let mut config = Config::default();
        assert!(matches!(config.validate(), Err(TutorError::Config(_))));

        config.google.project_id = Some("my-project".to_string());
        assert!(config.validate().is_err());

        config.handbook.corpus_name =
            Some("projects/my-project/locations/us-central1/ragCorpora/123".to_string());
        assert!(config.validate().is_ok());

        config.google.project_id = Some(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_endpoint() {
        let mut config = Config::default();
        config.google.project_id = Some("p".to_string());
        config.handbook.corpus_name = Some("c".to_string());
        config.model.endpoint = Some("not a url".to_string());

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("model.endpoint"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [model]
            name = "gemini-2.5-pro"

            [model.retry]
            attempts = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.model.name, "gemini-2.5-pro");
        assert_eq!(config.model.retry.attempts, 3);
        assert_eq!(config.model.retry.exp_base, 7.0);
        assert_eq!(config.handbook.top_k, 7);
    }

    #[test]
    fn test_vertex_urls() {
        let mut config = Config::default();
        config.google.location = "europe-west4".to_string();
        assert_eq!(
            config.model_base_url(),
            "https://europe-west4-aiplatform.googleapis.com"
        );

        config.handbook.endpoint = Some("http://127.0.0.1:9000".to_string());
        assert_eq!(config.handbook_base_url(), "http://127.0.0.1:9000");
    }

    #[test]
    #[serial]
    fn test_env_overrides_file_values() {
        clear_env();
        env::set_var("GOOGLE_CLOUD_PROJECT", "env-project");
        env::set_var("RAG_CORPUS_NAME", "env-corpus");
        env::set_var("DMV_TUTOR_STREAMING", "0");

        let mut config = Config::from_toml(
            r#"
            [google]
            project_id = "file-project"
            location = "us-east4"
            "#,
        )
        .unwrap();
        config.apply_env_overrides();

        assert_eq!(config.project_id(), "env-project");
        assert_eq!(config.google.location, "us-east4");
        assert_eq!(config.corpus_name(), "env-corpus");
        assert!(!config.streaming.enabled);
        assert!(config.video.api_key.is_none());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_load_from_file_fails_fast_without_required_values() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[agent]\nmax_turns = 4\n").unwrap();

        let result = Config::load_from(Some(&path));
        assert!(matches!(result, Err(TutorError::Config(_))));

        env::set_var("GOOGLE_CLOUD_PROJECT", "p");
        env::set_var("RAG_CORPUS_NAME", "c");
        let config = Config::load_from(Some(&path)).unwrap();
        assert_eq!(config.agent.max_turns, 4);

        clear_env();
    }

    #[test]
    fn test_api_key_is_not_serialized() {
        let mut config = Config::default();
        config.video.api_key = Some("secret".to_string());
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(!toml_str.contains("secret"));
        assert!(toml_str.contains("query_template"));
    }
}
