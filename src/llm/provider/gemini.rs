//! Google Gemini on Vertex AI
//!
//! Talks to `generateContent` / `streamGenerateContent` with function calling.
//! Thought parts are dropped from visible text, and thought signatures on
//! function calls are echoed back on the next request.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::StreamExt;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, trace};

use crate::core::config::RetryConfig;
use crate::core::{Config, Message, Result, ToolCall, ToolDefinition, TutorError};
use crate::llm::auth::AccessTokenSource;
use crate::llm::retry::send_with_retry;
use crate::llm::traits::{ChatRequest, LLMProvider, LLMResponse, TokenCallback, TokenUsage};

/// Gemini provider backed by the Vertex AI REST API
pub struct GeminiProvider {
    client: Client,
    base_url: String,
    project_id: String,
    location: String,
    tokens: Arc<AccessTokenSource>,
    retry: RetryConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<GeminiTool<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiTool<'a> {
    function_declarations: &'a [ToolDefinition],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    candidate_count: u32,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thought: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thought_signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<FunctionResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct FunctionResponse {
    name: String,
    response: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Content,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

/// Collects text, tool calls and usage across one or more response chunks
struct ResponseAccumulator {
    content: String,
    tool_calls: Vec<ToolCall>,
    usage: Option<TokenUsage>,
    model: String,
}

impl ResponseAccumulator {
    fn new(model: &str) -> Self {
        Self {
            content: String::new(),
            tool_calls: Vec::new(),
            usage: None,
            model: model.to_string(),
        }
    }

    fn absorb(&mut self, chunk: GenerateContentResponse, on_token: Option<TokenCallback<'_>>) {
        if let Some(version) = chunk.model_version {
            self.model = version;
        }
        if let Some(usage) = chunk.usage_metadata {
            self.usage = Some(TokenUsage {
                prompt_tokens: usage.prompt_token_count,
                completion_tokens: usage.candidates_token_count,
                total_tokens: usage.total_token_count,
            });
        }

        let Some(candidate) = chunk.candidates.into_iter().next() else {
            return;
        };
        if let Some(reason) = candidate.finish_reason {
            trace!("Gemini finish reason: {}", reason);
        }

        for part in candidate.content.parts {
            if part.thought == Some(true) {
                continue;
            }
            if let Some(call) = part.function_call {
                self.tool_calls.push(ToolCall {
                    name: call.name,
                    arguments: call.args,
                    thought_signature: part.thought_signature,
                });
            } else if let Some(text) = part.text {
                if text.is_empty() {
                    continue;
                }
                if let Some(callback) = on_token {
                    callback(&text);
                }
                self.content.push_str(&text);
            }
        }
    }

    fn finish(self) -> LLMResponse {
        LLMResponse {
            content: self.content,
            tool_calls: self.tool_calls,
            usage: self.usage,
            model: self.model,
        }
    }
}

impl GeminiProvider {
    /// Create a provider from configuration
    pub fn from_config(config: &Config, tokens: Arc<AccessTokenSource>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.model.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.model_base_url(),
            project_id: config.project_id().to_string(),
            location: config.google.location.clone(),
            tokens,
            retry: config.model.retry.clone(),
        })
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!(
            "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:{}",
            self.base_url.trim_end_matches('/'),
            self.project_id,
            self.location,
            model,
            method
        )
    }

    /// Convert internal Message to Gemini content
    fn to_content(msg: &Message) -> Content {
        let mut parts = Vec::new();

        if !msg.content.is_empty() {
            parts.push(Part {
                text: Some(msg.content.clone()),
                ..Default::default()
            });
        }

        for call in &msg.tool_calls {
            parts.push(Part {
                thought_signature: call.thought_signature.clone(),
                function_call: Some(FunctionCall {
                    name: call.name.clone(),
                    args: call.arguments.clone(),
                }),
                ..Default::default()
            });
        }

        for result in &msg.tool_results {
            let response = if result.success {
                json!({ "result": result.output })
            } else {
                json!({ "error": result.output })
            };
            parts.push(Part {
                function_response: Some(FunctionResponse {
                    name: result.tool_name.clone(),
                    response,
                }),
                ..Default::default()
            });
        }

        Content {
            role: Some(msg.role.to_string()),
            parts,
        }
    }

    fn build_body<'a>(request: &ChatRequest<'a>) -> GenerateContentRequest<'a> {
        let contents = request
            .messages
            .iter()
            .map(Self::to_content)
            .filter(|c| !c.parts.is_empty())
            .collect();

        let system_instruction = (!request.system_instruction.is_empty()).then(|| Content {
            role: None,
            parts: vec![Part {
                text: Some(request.system_instruction.to_string()),
                ..Default::default()
            }],
        });

        let tools = if request.tools.is_empty() {
            Vec::new()
        } else {
            vec![GeminiTool {
                function_declarations: request.tools,
            }]
        };

        GenerateContentRequest {
            contents,
            system_instruction,
            tools,
            generation_config: Some(GenerationConfig {
                temperature: request.options.temperature,
                max_output_tokens: request.options.max_tokens,
                candidate_count: 1,
            }),
        }
    }

    async fn post(&self, url: &str, body: &GenerateContentRequest<'_>) -> Result<Response> {
        let token = self.tokens.token().await?;
        debug!("POST {}", url);
        trace!("Gemini request: {}", serde_json::to_string(body)?);

        let response =
            send_with_retry(&self.retry, || self.client.post(url).bearer_auth(&token).json(body))
                .await?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        if status.as_u16() == 401 {
            self.tokens.invalidate().await;
        }
        let error_text = response.text().await.unwrap_or_default();
        Err(TutorError::model(format!(
            "Gemini API error ({}): {}",
            status, error_text
        )))
    }
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    async fn chat_with_tools(&self, request: &ChatRequest<'_>) -> Result<LLMResponse> {
        let body = Self::build_body(request);
        let url = self.model_url(request.model, "generateContent");

        let response = self.post(&url, &body).await?;
        let parsed: GenerateContentResponse = response.json().await?;

        let mut acc = ResponseAccumulator::new(request.model);
        acc.absorb(parsed, None);
        Ok(acc.finish())
    }

    async fn chat_stream(
        &self,
        request: &ChatRequest<'_>,
        on_token: TokenCallback<'_>,
    ) -> Result<LLMResponse> {
        let body = Self::build_body(request);
        let url = format!(
            "{}?alt=sse",
            self.model_url(request.model, "streamGenerateContent")
        );

        let response = self.post(&url, &body).await?;
        let mut events = response.bytes_stream().eventsource();
        let mut acc = ResponseAccumulator::new(request.model);

        while let Some(event) = events.next().await {
            let event =
                event.map_err(|e| TutorError::model(format!("Stream error: {}", e)))?;
            if event.data.trim().is_empty() {
                continue;
            }
            let chunk: GenerateContentResponse = serde_json::from_str(&event.data)?;
            acc.absorb(chunk, Some(on_token));
        }

        Ok(acc.finish())
    }

    fn name(&self) -> &str {
        "vertex_gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ToolResult;
    use crate::llm::traits::GenerateOptions;
    use std::sync::Mutex;

    const MODEL_PATH: &str =
        "/v1/projects/test-project/locations/us-central1/publishers/google/models/gemini-2.5-flash";

    fn provider(base_url: &str) -> GeminiProvider {
        let mut config = Config::default();
        config.google.project_id = Some("test-project".to_string());
        config.model.retry.attempts = 1;
        config.model.endpoint = Some(base_url.to_string());
        GeminiProvider::from_config(&config, Arc::new(AccessTokenSource::fixed("token"))).unwrap()
    }

    #[test]
    fn test_tool_round_trip_content() {
        let mut call = ToolCall::new("set_quiz_limit", json!({"limit": 5}));
        call.thought_signature = Some("sig".to_string());

        let model_msg = GeminiProvider::to_content(&Message::model_with_tools("", vec![call]));
        let value = serde_json::to_value(&model_msg).unwrap();
        assert_eq!(value["role"], "model");
        assert_eq!(value["parts"][0]["functionCall"]["name"], "set_quiz_limit");
        assert_eq!(value["parts"][0]["thoughtSignature"], "sig");

        let results = Message::tool_results(vec![
            ToolResult::success("set_quiz_limit", "ok"),
            ToolResult::failure("missing", "unknown tool"),
        ]);
        let value = serde_json::to_value(GeminiProvider::to_content(&results)).unwrap();
        assert_eq!(value["role"], "user");
        assert_eq!(value["parts"][0]["functionResponse"]["response"]["result"], "ok");
        assert_eq!(
            value["parts"][1]["functionResponse"]["response"]["error"],
            "unknown tool"
        );
    }

    #[test]
    fn test_body_includes_system_instruction_and_tools() {
        let messages = vec![Message::user("hi")];
        let tools = vec![ToolDefinition::function(
            "search_handbook",
            "Search",
            json!({"type": "object"}),
        )];
        let options = GenerateOptions::default();
        let request = ChatRequest {
            model: "gemini-2.5-flash",
            system_instruction: "Be a tutor",
            messages: &messages,
            tools: &tools,
            options: &options,
        };

        let value = serde_json::to_value(GeminiProvider::build_body(&request)).unwrap();
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "Be a tutor");
        assert_eq!(
            value["tools"][0]["functionDeclarations"][0]["name"],
            "search_handbook"
        );
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hi");
    }

    #[tokio::test]
    async fn test_generate_content_parses_function_call() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", format!("{}:generateContent", MODEL_PATH).as_str())
            .match_header("authorization", "Bearer token")
            .with_status(200)
            .with_body(
                json!({
                    "candidates": [{
                        "content": {"role": "model", "parts": [
                            {"text": "thinking...", "thought": true},
                            {"functionCall": {"name": "find_instructional_video", "args": {"topic": "parallel park"}},
                             "thoughtSignature": "abc"}
                        ]},
                        "finishReason": "STOP"
                    }],
                    "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 3, "totalTokenCount": 13}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let messages = vec![Message::user("show me")];
        let options = GenerateOptions::default();
        let request = ChatRequest {
            model: "gemini-2.5-flash",
            system_instruction: "",
            messages: &messages,
            tools: &[],
            options: &options,
        };
        let response = provider(&server.url()).chat_with_tools(&request).await.unwrap();

        assert!(response.content.is_empty());
        assert_eq!(response.tool_calls.len(), 1);
        assert_eq!(
            response.tool_calls[0].get_string("topic").as_deref(),
            Some("parallel park")
        );
        assert_eq!(response.tool_calls[0].thought_signature.as_deref(), Some("abc"));
        assert_eq!(response.usage.unwrap().total_tokens, 13);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_stream_emits_text_fragments() {
        let mut server = mockito::Server::new_async().await;
        let body = concat!(
            "data: {\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"text\":\"Hel\"}]}}]}\n\n",
            "data: {\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"text\":\"plan\",\"thought\":true}]}}]}\n\n",
            "data: {\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"text\":\"lo\"}]}}]}\n\n",
        );
        let mock = server
            .mock(
                "POST",
                mockito::Matcher::Regex(":streamGenerateContent".to_string()),
            )
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(body)
            .create_async()
            .await;

        let messages = vec![Message::user("hi")];
        let options = GenerateOptions::default();
        let request = ChatRequest {
            model: "gemini-2.5-flash",
            system_instruction: "",
            messages: &messages,
            tools: &[],
            options: &options,
        };

        let seen = Mutex::new(Vec::new());
        let on_token = |t: &str| seen.lock().unwrap().push(t.to_string());
        let response = provider(&server.url())
            .chat_stream(&request, &on_token)
            .await
            .unwrap();

        assert_eq!(response.content, "Hello");
        assert_eq!(*seen.lock().unwrap(), vec!["Hel", "lo"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", format!("{}:generateContent", MODEL_PATH).as_str())
            .with_status(400)
            .with_body("bad request")
            .create_async()
            .await;

        let messages = vec![Message::user("hi")];
        let options = GenerateOptions::default();
        let request = ChatRequest {
            model: "gemini-2.5-flash",
            system_instruction: "",
            messages: &messages,
            tools: &[],
            options: &options,
        };
        let err = provider(&server.url())
            .chat_with_tools(&request)
            .await
            .unwrap_err();

        assert!(matches!(err, TutorError::Model(_)));
        assert!(err.to_string().contains("bad request"));
    }
}
