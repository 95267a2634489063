//! Instructional video lookup via the YouTube Data API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info};

use crate::core::config::VideoConfig;
use crate::core::{Result, ToolCall, ToolCategory, ToolDefinition, ToolResult, TutorError};
use crate::tools::Tool;

const MISSING_KEY: &str = "Video tool unavailable (Missing API Key).";
const SEARCH_FAILED: &str = "Error searching YouTube.";

/// Finds one instructional video for a driving topic
pub struct VideoSearchTool {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
    query_template: String,
    video_duration: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: VideoId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoId {
    video_id: String,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    title: String,
    thumbnails: Thumbnails,
}

#[derive(Debug, Deserialize)]
struct Thumbnails {
    high: Thumbnail,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

impl VideoSearchTool {
    pub fn from_config(config: &VideoConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            query_template: config.query_template.clone(),
            video_duration: config.video_duration.clone(),
        }
    }

    /// Run the search, returning the reply text for the model
    async fn search(&self, api_key: &str, topic: &str) -> Result<String> {
        let query = self.query_template.replace("{topic}", topic);
        debug!("YouTube query: {}", query);

        let response = self
            .client
            .get(format!("{}/search", self.endpoint))
            .query(&[
                ("part", "snippet"),
                ("maxResults", "1"),
                ("q", query.as_str()),
                ("type", "video"),
                ("videoDuration", self.video_duration.as_str()),
                ("key", api_key),
            ])
            .timeout(Duration::from_secs(15))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TutorError::video(format!(
                "YouTube API returned {}: {}",
                status, body
            )));
        }

        let data: SearchResponse = response.json().await?;
        let Some(video) = data.items.into_iter().next() else {
            return Ok(format!("No videos found for '{}'.", topic));
        };

        Ok(format!(
            "I found a video for **{topic}**:\n\n**{title}**\n[![Watch Video]({thumb})](https://www.youtube.com/watch?v={id})",
            topic = topic,
            title = video.snippet.title,
            thumb = video.snippet.thumbnails.high.url,
            id = video.id.video_id,
        ))
    }
}

#[async_trait]
impl Tool for VideoSearchTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(
            "find_instructional_video",
            "Searches YouTube for an instructional video on a driving topic.",
            json!({
                "type": "object",
                "properties": {
                    "topic": {
                        "type": "string",
                        "description": "Driving maneuver or rule, e.g. 'parallel park'"
                    }
                },
                "required": ["topic"]
            }),
        )
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Media
    }

    async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
        let topic = call.get_string("topic").unwrap_or_default();
        info!("Searching YouTube for topic: {}", topic);

        let Some(ref api_key) = self.api_key else {
            return Ok(ToolResult::success("find_instructional_video", MISSING_KEY));
        };

        let reply = match self.search(api_key, &topic).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("YouTube error: {}", e);
                SEARCH_FAILED.to_string()
            }
        };
        Ok(ToolResult::success("find_instructional_video", reply))
    }
}
