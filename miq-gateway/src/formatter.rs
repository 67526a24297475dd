//! Turns an agent result envelope into a chat-platform card payload, plus
//! the `miq_<verb>_<agent_key>` interactive button id grammar.
//!
//! Grounded on the per-agent `format_*` functions in
//! `original_source/gateway/formatter.py`.

use miq_core::types::{AgentKey, Envelope};
use serde_json::{json, Value};

pub fn button_id(verb: &str, agent_key: &AgentKey) -> String {
    format!("miq_{verb}_{}", agent_key.as_str())
}

pub fn parse_button_id(id: &str) -> Option<(&str, AgentKey)> {
    let rest = id.strip_prefix("miq_")?;
    let (verb, key) = rest.split_once('_')?;
    Some((verb, AgentKey::parse(key)))
}

/// Render a Slack-Block-Kit-shaped card for a completed task. The same
/// shape is reused (with a thinner envelope) for Teams adaptive cards by the
/// webhook handler, matching the source's single-formatter-per-agent
/// approach rather than one renderer per platform.
pub fn format_card(envelope: &Envelope) -> Value {
    let title = format!("{} — {}", title_case(&envelope.agent), if envelope.success { "Completed" } else { "Failed" });
    let body = if envelope.success {
        format_success_body(&envelope.agent, envelope.data.as_ref().unwrap_or(&Value::Null))
    } else {
        envelope.error.clone().unwrap_or_else(|| "unknown error".to_string())
    };

    let agent_key = AgentKey::parse(&envelope.agent);
    json!({
        "blocks": [
            {"type": "header", "text": {"type": "plain_text", "text": title}},
            {"type": "section", "text": {"type": "mrkdwn", "text": body}},
            {"type": "context", "elements": [
                {"type": "mrkdwn", "text": format!("mode: {} · {}", envelope.mode, envelope.timestamp.to_rfc3339())},
            ]},
            {"type": "actions", "elements": [
                {"type": "button", "text": {"type": "plain_text", "text": "Re-run"}, "action_id": button_id("rerun", &agent_key)},
                {"type": "button", "text": {"type": "plain_text", "text": "Dismiss"}, "action_id": button_id("dismiss", &agent_key)},
            ]},
        ]
    })
}

fn format_success_body(agent: &str, data: &Value) -> String {
    match AgentKey::parse(agent) {
        AgentKey::Caption => format!(
            "Captions ready in *{}* ({} words, QA score {}).",
            data.get("language").and_then(Value::as_str).unwrap_or("unknown"),
            data.get("word_count").and_then(Value::as_u64).unwrap_or(0),
            data.get("qa_score").and_then(Value::as_f64).unwrap_or(0.0),
        ),
        AgentKey::Compliance => format!(
            "Compliance scan: {} violation(s), {} critical.",
            data.get("violations").and_then(Value::as_u64).unwrap_or(0),
            data.get("critical_count").and_then(Value::as_u64).unwrap_or(0),
        ),
        AgentKey::Trending => format!(
            "Top topic: *{}* (velocity {}).",
            data.get("top_topic").and_then(Value::as_str).unwrap_or("n/a"),
            data.get("velocity_score").and_then(Value::as_f64).unwrap_or(0.0),
        ),
        AgentKey::Rights => format!(
            "{} license(s) expiring soon.",
            data.get("expiring_soon").and_then(Value::as_array).map(|a| a.len()).unwrap_or(0),
        ),
        _ => format!("```{}```", serde_json::to_string_pretty(data).unwrap_or_default()),
    }
}

fn title_case(agent_key: &str) -> String {
    agent_key
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
