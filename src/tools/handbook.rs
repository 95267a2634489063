//! Handbook search via Vertex AI RAG Engine `retrieveContexts`

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, error, info};

use crate::core::{Config, Result, ToolCall, ToolCategory, ToolDefinition, ToolResult, TutorError};
use crate::llm::auth::AccessTokenSource;
use crate::tools::Tool;

const NO_RESULTS: &str = "No information found in the handbook.";

/// Retrieves handbook passages from the configured RAG corpus
pub struct HandbookSearchTool {
    client: Client,
    base_url: String,
    project_id: String,
    location: String,
    corpus_name: String,
    top_k: u32,
    tokens: Arc<AccessTokenSource>,
}

/// Pull the passage texts out of either response shape
///
/// Newer responses nest the list as `{"contexts": {"contexts": [...]}}`,
/// older ones return `{"contexts": [...]}`.
pub fn extract_contexts(response: &Value) -> Vec<String> {
    let list = match response.get("contexts") {
        Some(Value::Object(inner)) => inner.get("contexts").and_then(Value::as_array),
        Some(Value::Array(list)) => Some(list),
        _ => None,
    };

    list.map(|items| {
        items
            .iter()
            .filter_map(|item| item.get("text").and_then(Value::as_str))
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Render passages as the bulleted fact list handed to the model
pub fn format_facts(contexts: &[String]) -> String {
    if contexts.is_empty() {
        return NO_RESULTS.to_string();
    }

    let mut facts = String::from("FACTS FROM HANDBOOK:\n");
    for text in contexts {
        facts.push_str("- ");
        facts.push_str(text);
        facts.push('\n');
    }
    facts
}

impl HandbookSearchTool {
    pub fn from_config(config: &Config, tokens: Arc<AccessTokenSource>) -> Self {
        Self {
            client: Client::new(),
            base_url: config.handbook_base_url(),
            project_id: config.project_id().to_string(),
            location: config.google.location.clone(),
            corpus_name: config.corpus_name().to_string(),
            top_k: config.handbook.top_k,
            tokens,
        }
    }

    async fn retrieve(&self, query: &str) -> Result<Vec<String>> {
        let url = format!(
            "{}/v1/projects/{}/locations/{}:retrieveContexts",
            self.base_url.trim_end_matches('/'),
            self.project_id,
            self.location
        );
        let body = json!({
            "vertexRagStore": {
                "ragResources": [{ "ragCorpus": self.corpus_name }]
            },
            "query": {
                "text": query,
                "ragRetrievalConfig": { "topK": self.top_k }
            }
        });

        let token = self.tokens.token().await?;
        debug!("POST {}", url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .timeout(Duration::from_secs(30))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(TutorError::retrieval(format!("{}: {}", status, text)));
        }

        let data: Value = response.json().await?;
        Ok(extract_contexts(&data))
    }
}

#[async_trait]
impl Tool for HandbookSearchTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(
            "search_handbook",
            "Searches the California Driver's Handbook for facts relevant to a query.",
            json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "What to look up in the handbook"
                    }
                },
                "required": ["query"]
            }),
        )
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Retrieval
    }

    async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
        let query = call.get_string("query").unwrap_or_default();
        info!("Querying RAG corpus for: '{}'", query);

        let reply = match self.retrieve(&query).await {
            Ok(contexts) => format_facts(&contexts),
            Err(e) => {
                error!("RAG error: {}", e);
                format!("Error accessing handbook: {}", e)
            }
        };
        Ok(ToolResult::success("search_handbook", reply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_shapes_give_same_facts() {
        let nested = json!({"contexts": {"contexts": [
            {"sourceUri": "gs://dmv/handbook.pdf", "text": "Stop at a red light."},
            {"text": "Yield to pedestrians."}
        ]}});
        let flat = json!({"contexts": [
            {"text": "Stop at a red light."},
            {"text": "Yield to pedestrians."}
        ]});

        let expected = "FACTS FROM HANDBOOK:\n- Stop at a red light.\n- Yield to pedestrians.\n";
        assert_eq!(format_facts(&extract_contexts(&nested)), expected);
        assert_eq!(format_facts(&extract_contexts(&flat)), expected);
    }

    #[test]
    fn test_missing_or_empty_contexts() {
        for response in [json!({}), json!({"contexts": {}}), json!({"contexts": []})] {
            assert_eq!(format_facts(&extract_contexts(&response)), NO_RESULTS);
        }
    }
}
