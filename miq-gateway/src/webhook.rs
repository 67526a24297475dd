//! Axum routes for the chat-platform webhooks: Slack events/commands/
//! actions, Teams messages, and a gateway health check.
//!
//! HMAC verification is grounded on `verify_signature` in
//! `rustant-core/src/scheduler/webhook.rs`; the `v0:<timestamp>:<body>`
//! signing base and the 300-second replay window are grounded on
//! `_verify_slack_signature` in `original_source/gateway/webhook_handler.py`.

use crate::conversation::{ConversationManager, SessionKey};
use crate::formatter::parse_button_id;
use crate::router::Router;
use axum::extract::{Form, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router as AxumRouter};
use std::collections::HashMap;
use hmac::{Hmac, Mac};
use miq_core::config::Settings;
use miq_core::error::GatewayError;
use miq_core::types::{Priority, Task, TaskInput};
use miq_orchestrator::OrchestratorHandle;
use serde_json::{json, Value};
use sha2::Sha256;
use std::sync::Arc;

type HmacSha256 = Hmac<Sha256>;

#[derive(Clone)]
pub struct AppState {
    pub router: Arc<Router>,
    pub conversations: Arc<ConversationManager>,
    pub orchestrator: OrchestratorHandle,
    pub settings: Arc<Settings>,
}

pub fn build_router(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/slack/events", post(slack_events))
        .route("/slack/commands", post(slack_commands))
        .route("/slack/actions", post(slack_actions))
        .route("/teams/messages", post(teams_messages))
        .route("/gateway/health", get(gateway_health))
        .with_state(state)
}

/// Verify `v0:<timestamp>:<body>` signed with `signing_secret`, rejecting
/// requests outside `replay_window_secs` of now.
pub fn verify_slack_signature(
    signing_secret: &str,
    timestamp_header: &str,
    body: &str,
    signature_header: &str,
    replay_window_secs: i64,
) -> Result<(), GatewayError> {
    let timestamp: i64 = timestamp_header
        .parse()
        .map_err(|_| GatewayError::MalformedPayload { message: "invalid timestamp header".to_string() })?;

    let now = chrono::Utc::now().timestamp();
    let age = (now - timestamp).abs();
    if age > replay_window_secs {
        return Err(GatewayError::ReplayWindowExceeded { age_secs: age, max_secs: replay_window_secs });
    }

    let signature_hex = signature_header
        .strip_prefix("v0=")
        .ok_or_else(|| GatewayError::SignatureInvalid { message: "missing v0= prefix".to_string() })?;
    let signature_bytes = hex::decode(signature_hex)
        .map_err(|e| GatewayError::SignatureInvalid { message: e.to_string() })?;

    let base = format!("v0:{timestamp}:{body}");
    let mut mac = HmacSha256::new_from_slice(signing_secret.as_bytes())
        .map_err(|e| GatewayError::SignatureInvalid { message: e.to_string() })?;
    mac.update(base.as_bytes());
    mac.verify_slice(&signature_bytes)
        .map_err(|_| GatewayError::SignatureInvalid { message: "signature mismatch".to_string() })
}

fn slack_headers<'a>(headers: &'a HeaderMap) -> Option<(&'a str, &'a str)> {
    let timestamp = headers.get("X-Slack-Request-Timestamp")?.to_str().ok()?;
    let signature = headers.get("X-Slack-Signature")?.to_str().ok()?;
    Some((timestamp, signature))
}

const HELP_TEXT: &str = "*MediaAgentIQ — Available Commands*\n\n\
*Slash Commands (power users):*\n\
• `/miq-caption [url]` — Generate captions\n\
• `/miq-compliance [url]` — FCC compliance scan\n\
• `/miq-clip [url]` — Detect viral moments\n\
• `/miq-trending [--live] [--topic=X]` — Trending topics\n\
• `/miq-deepfake [url]` — Deepfake detection\n\
• `/miq-factcheck [text]` — Fact-check a claim\n\
• `/miq-status` — Agent health dashboard\n\
• `/miq-connectors` — Connector status\n\n\
*Natural language — just ask:*\n\
• \"Check compliance on today's 6pm newscast\"\n\
• \"What's trending right now?\"\n\
• \"Translate this clip to Spanish\"";

async fn handle_system_command(command: Option<&str>, state: &AppState) -> Value {
    match command {
        Some("/miq-help") => json!({"blocks": [{"type": "section", "text": {"type": "mrkdwn", "text": HELP_TEXT}}]}),
        Some("/miq-status") => {
            let stats = state.orchestrator.stats().await;
            json!({"text": format!(
                "processed {} · failed {} · events emitted {}",
                stats.tasks_processed, stats.tasks_failed, stats.events_emitted
            )})
        }
        Some("/miq-connectors") => {
            let settings = &state.settings;
            json!({"text": format!(
                "openai {} · slack {} · teams {}",
                if settings.is_openai_configured() { "configured" } else { "not configured" },
                if settings.is_slack_configured() { "configured" } else { "not configured" },
                if settings.is_teams_configured() { "configured" } else { "not configured" },
            )})
        }
        Some(other) => json!({"text": format!("unsupported system command: {other}")}),
        None => json!({"text": "unrecognized system command"}),
    }
}

async fn dispatch(state: &AppState, session: SessionKey, message: &str) -> Value {
    let intent = state.router.route(message).await;

    if intent.is_system_command {
        state.conversations.record_turn(&session, message, intent.agent_key.clone()).await;
        return handle_system_command(intent.system_command.as_deref(), state).await;
    }

    let Some(agent_key) = intent.agent_key.clone() else {
        state.conversations.record_turn(&session, message, None).await;
        return json!({"text": "Sorry, I couldn't work out which agent handles that."});
    };

    let params = state.conversations.resolve_params(&session, intent.params.clone()).await;
    state.conversations.record_turn_with_params(&session, message, Some(agent_key.clone()), &params).await;

    let input = if params.is_empty() {
        TaskInput::Text(message.to_string())
    } else {
        TaskInput::Structured(params)
    };

    let task = Task::new(agent_key, input, Priority::Normal);
    match state.orchestrator.submit_task(task).await {
        Ok(task_id) => json!({"task_id": task_id, "status": "queued"}),
        Err(err) => json!({"error": err.to_string()}),
    }
}

async fn slack_events(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    if let Some(secret) = state.settings.slack_signing_secret.as_deref() {
        let Some((ts, sig)) = slack_headers(&headers) else {
            return (StatusCode::UNAUTHORIZED, "missing signature headers").into_response();
        };
        if verify_slack_signature(secret, ts, &body, sig, state.settings.webhook_replay_window_seconds).is_err() {
            return (StatusCode::UNAUTHORIZED, "signature verification failed").into_response();
        }
    }

    let parsed: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    if let Some(challenge) = parsed.get("challenge").and_then(Value::as_str) {
        return Json(json!({"challenge": challenge})).into_response();
    }

    let event = parsed.get("event").cloned().unwrap_or(Value::Null);
    let text = event.get("text").and_then(Value::as_str).unwrap_or_default().to_string();
    let channel = event.get("channel").and_then(Value::as_str).unwrap_or("unknown").to_string();
    let user = event.get("user").and_then(Value::as_str).unwrap_or("unknown").to_string();

    tokio::spawn(async move {
        let session = SessionKey::new("slack", channel, user);
        let result = dispatch(&state, session, &text).await;
        tracing::debug!(?result, "slack event dispatched");
    });

    StatusCode::OK.into_response()
}

/// Slack enforces a 3-second response budget on slash commands. Acknowledge
/// immediately with an ephemeral "running" message, then dispatch in the
/// background and deliver the real result to `response_url`.
async fn slack_commands(State(state): State<AppState>, Form(params): Form<HashMap<String, String>>) -> impl IntoResponse {
    let text = params.get("text").cloned().unwrap_or_default();
    let command = params.get("command").cloned().unwrap_or_default();
    let channel = params.get("channel_id").cloned().unwrap_or_else(|| "unknown".to_string());
    let user = params.get("user_id").cloned().unwrap_or_else(|| "unknown".to_string());
    let response_url = params.get("response_url").cloned();

    let full_message = format!("{command} {text}").trim().to_string();

    tokio::spawn(async move {
        let session = SessionKey::new("slack", channel, user);
        let result = dispatch(&state, session, &full_message).await;

        let Some(response_url) = response_url.filter(|url| !url.is_empty()) else {
            return;
        };
        let mut payload = result;
        if let Value::Object(ref mut map) = payload {
            map.insert("response_type".to_string(), json!("in_channel"));
        }
        let client = reqwest::Client::new();
        if let Err(err) = client.post(&response_url).json(&payload).send().await {
            tracing::warn!(%err, "failed to post slash command result to response_url");
        }
    });

    Json(json!({"response_type": "ephemeral", "text": format!("_Running {command}..._  ⏳")}))
}

async fn slack_actions(State(state): State<AppState>, Form(params): Form<HashMap<String, String>>) -> impl IntoResponse {
    let Some(payload_raw) = params.get("payload") else {
        return (StatusCode::BAD_REQUEST, "missing payload").into_response();
    };
    let payload: Value = match serde_json::from_str(payload_raw) {
        Ok(v) => v,
        Err(_) => return (StatusCode::BAD_REQUEST, "malformed payload").into_response(),
    };

    let action_id = payload["actions"][0]["action_id"].as_str().unwrap_or_default();
    let Some((verb, agent_key)) = parse_button_id(action_id) else {
        return (StatusCode::OK, Json(json!({"text": "unrecognized action"}))).into_response();
    };

    if verb == "rerun" {
        let task = Task::new(agent_key, TaskInput::Text("rerun".to_string()), Priority::Normal);
        let _ = state.orchestrator.submit_task(task).await;
    }

    (StatusCode::OK, Json(json!({"acknowledged": true}))).into_response()
}

async fn teams_messages(State(state): State<AppState>, Json(payload): Json<Value>) -> impl IntoResponse {
    if !state.settings.is_teams_configured() {
        return (StatusCode::SERVICE_UNAVAILABLE, "teams integration not configured").into_response();
    }

    let text = payload.get("text").and_then(Value::as_str).unwrap_or_default().to_string();
    let conversation_id = payload["conversation"]["id"].as_str().unwrap_or("unknown").to_string();
    let user_id = payload["from"]["id"].as_str().unwrap_or("unknown").to_string();

    let session = SessionKey::new("teams", conversation_id, user_id);
    let result = dispatch(&state, session, &text).await;
    (StatusCode::OK, Json(result)).into_response()
}

async fn gateway_health(State(state): State<AppState>) -> impl IntoResponse {
    let stats = state.orchestrator.stats().await;
    let pending = state.orchestrator.pending_count().await;
    let sessions = state.conversations.session_count().await;
    Json(json!({
        "status": "ok",
        "pending_tasks": pending,
        "tasks_processed": stats.tasks_processed,
        "tasks_failed": stats.tasks_failed,
        "active_sessions": sessions,
        "slack_configured": state.settings.is_slack_configured(),
        "teams_configured": state.settings.is_teams_configured(),
    }))
}
