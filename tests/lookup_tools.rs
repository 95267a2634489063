//! Lookup tools against mock YouTube and RAG servers

use std::sync::Arc;

use mockito::Matcher;
use serde_json::json;

use dmv_tutor::core::config::VideoConfig;
use dmv_tutor::core::{Config, ToolCall};
use dmv_tutor::llm::AccessTokenSource;
use dmv_tutor::tools::{HandbookSearchTool, Tool, VideoSearchTool};

fn video_tool(endpoint: String, api_key: Option<&str>) -> VideoSearchTool {
    VideoSearchTool::from_config(&VideoConfig {
        api_key: api_key.map(str::to_string),
        endpoint,
        ..VideoConfig::default()
    })
}

fn topic(name: &str) -> ToolCall {
    ToolCall::new("find_instructional_video", json!({ "topic": name }))
}

#[tokio::test]
async fn test_video_search_returns_markdown() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("part".into(), "snippet".into()),
            Matcher::UrlEncoded("maxResults".into(), "1".into()),
            Matcher::UrlEncoded(
                "q".into(),
                "how to parallel park california dmv driving test".into(),
            ),
            Matcher::UrlEncoded("type".into(), "video".into()),
            Matcher::UrlEncoded("videoDuration".into(), "medium".into()),
            Matcher::UrlEncoded("key".into(), "yt-key".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"items": [{
                "id": {"kind": "youtube#video", "videoId": "abc123"},
                "snippet": {
                    "title": "Parallel Parking Made Easy",
                    "thumbnails": {"high": {"url": "https://i.ytimg.com/vi/abc123/hq.jpg"}}
                }
            }]})
            .to_string(),
        )
        .create_async()
        .await;

    let tool = video_tool(server.url(), Some("yt-key"));
    let result = tool.execute(&topic("parallel park")).await.unwrap();

    mock.assert_async().await;
    assert!(result.success);
    assert_eq!(
        result.output,
        "I found a video for **parallel park**:\n\n**Parallel Parking Made Easy**\n\
         [![Watch Video](https://i.ytimg.com/vi/abc123/hq.jpg)](https://www.youtube.com/watch?v=abc123)"
    );
}

#[tokio::test]
async fn test_video_search_without_results() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/search")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"items": []}"#)
        .create_async()
        .await;

    let tool = video_tool(server.url(), Some("yt-key"));
    let result = tool.execute(&topic("three-point turn")).await.unwrap();
    assert_eq!(result.output, "No videos found for 'three-point turn'.");
}

#[tokio::test]
async fn test_video_search_api_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/search")
        .match_query(Matcher::Any)
        .with_status(403)
        .with_body(r#"{"error": {"message": "quotaExceeded"}}"#)
        .create_async()
        .await;

    let tool = video_tool(server.url(), Some("yt-key"));
    let result = tool.execute(&topic("merging")).await.unwrap();
    assert!(result.success);
    assert_eq!(result.output, "Error searching YouTube.");
}

#[tokio::test]
async fn test_video_search_without_key_skips_request() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let tool = video_tool(server.url(), None);
    let result = tool.execute(&topic("lane change")).await.unwrap();

    mock.assert_async().await;
    assert_eq!(result.output, "Video tool unavailable (Missing API Key).");
}

const RAG_PATH: &str = "/v1/projects/test-project/locations/us-central1:retrieveContexts";

fn handbook_tool(endpoint: String) -> HandbookSearchTool {
    let mut config = Config::default();
    config.google.project_id = Some("test-project".to_string());
    config.google.location = "us-central1".to_string();
    config.handbook.corpus_name =
        Some("projects/test-project/locations/us-central1/ragCorpora/42".to_string());
    config.handbook.top_k = 3;
    config.handbook.endpoint = Some(endpoint);

    HandbookSearchTool::from_config(&config, Arc::new(AccessTokenSource::fixed("rag-token")))
}

fn query(text: &str) -> ToolCall {
    ToolCall::new("search_handbook", json!({ "query": text }))
}

#[tokio::test]
async fn test_handbook_search_sends_corpus_and_query() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", RAG_PATH)
        .match_header("authorization", "Bearer rag-token")
        .match_body(Matcher::Json(json!({
            "vertexRagStore": {
                "ragResources": [{
                    "ragCorpus": "projects/test-project/locations/us-central1/ragCorpora/42"
                }]
            },
            "query": {
                "text": "right of way at a four-way stop",
                "ragRetrievalConfig": {"topK": 3}
            }
        })))
        .with_status(200)
        .with_body(
            json!({"contexts": {"contexts": [
                {"sourceUri": "gs://dmv/handbook.pdf", "text": "The first vehicle to stop goes first."},
                {"text": "If two arrive together, yield to the driver on your right."}
            ]}})
            .to_string(),
        )
        .create_async()
        .await;

    let tool = handbook_tool(server.url());
    let result = tool
        .execute(&query("right of way at a four-way stop"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert!(result.success);
    assert_eq!(
        result.output,
        "FACTS FROM HANDBOOK:\n\
         - The first vehicle to stop goes first.\n\
         - If two arrive together, yield to the driver on your right.\n"
    );
}

#[tokio::test]
async fn test_handbook_search_flat_response() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", RAG_PATH)
        .with_status(200)
        .with_body(r#"{"contexts": [{"text": "Headlights on from sunset to sunrise."}]}"#)
        .create_async()
        .await;

    let tool = handbook_tool(server.url());
    let result = tool.execute(&query("headlights")).await.unwrap();
    assert_eq!(
        result.output,
        "FACTS FROM HANDBOOK:\n- Headlights on from sunset to sunrise.\n"
    );
}

#[tokio::test]
async fn test_handbook_search_no_matches() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", RAG_PATH)
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let tool = handbook_tool(server.url());
    let result = tool.execute(&query("jet skis")).await.unwrap();
    assert_eq!(result.output, "No information found in the handbook.");
}

#[tokio::test]
async fn test_handbook_search_error_is_reported_to_model() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", RAG_PATH)
        .with_status(404)
        .with_body("corpus not found")
        .create_async()
        .await;

    let tool = handbook_tool(server.url());
    let result = tool.execute(&query("speed limits")).await.unwrap();

    assert!(result.success);
    assert!(result.output.starts_with("Error accessing handbook:"));
    assert!(result.output.contains("corpus not found"));
}
