//! End-to-end coverage of the `/slack/commands` → immediate ack →
//! background `response_url` callback flow for `/miq-help`.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use miq_core::config::Settings;
use miq_gateway::router::NullLlmClient;
use miq_gateway::{AppState, ConversationManager, Router};
use miq_orchestrator::OrchestratorHandle;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tower::util::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn build_state(memory_root: &std::path::Path) -> AppState {
    let mut settings = Settings::default();
    settings.memory_root = memory_root.to_string_lossy().to_string();
    let settings = Arc::new(settings);

    let router = Arc::new(Router::new(Arc::new(NullLlmClient), Vec::new()));
    let conversations = Arc::new(ConversationManager::new(20, 30));
    let agents: HashMap<miq_core::types::AgentKey, Arc<miq_core::agent::AgentRuntime>> = HashMap::new();
    let orchestrator = OrchestratorHandle::new(agents, Arc::clone(&settings));

    AppState { router, conversations, orchestrator, settings }
}

#[tokio::test]
async fn help_command_acks_immediately_then_posts_help_text_to_response_url() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/r"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let state = build_state(dir.path());
    let app = miq_gateway::build_router(state);

    let response_url = format!("{}/r", mock_server.uri());
    let body = serde_urlencoded::to_string([
        ("command", "/miq-help"),
        ("text", ""),
        ("user_id", "U1"),
        ("channel_id", "C1"),
        ("response_url", response_url.as_str()),
    ])
    .unwrap();

    let request = Request::builder()
        .method("POST")
        .uri("/slack/commands")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let ack: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(ack["response_type"], "ephemeral");
    assert!(ack["text"].as_str().unwrap().contains("Running /miq-help"));

    // Give the spawned background dispatch time to hit the mock response_url.
    for _ in 0..20 {
        if !mock_server.received_requests().await.unwrap().is_empty() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    let received = mock_server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    let posted: Value = serde_json::from_slice(&received[0].body).unwrap();
    let text = posted["blocks"][0]["text"]["text"].as_str().unwrap();
    assert!(text.contains("Slash Commands"));
    assert!(text.contains("/miq-caption"));
}
