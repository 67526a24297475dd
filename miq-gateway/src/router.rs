//! Three-tier message routing: a deterministic slash-command parser, a
//! keyword-regex table, and an LLM fallback, in that order of precedence.
//!
//! Grounded on `_parse_slash_command`/`_route_by_keywords`/`_route_by_llm`
//! and the `_KEYWORD_MAP`/`_SLASH_MAP` tables in
//! `original_source/gateway/router.py`.

use async_trait::async_trait;
use miq_core::types::{AgentKey, RoutedIntent, ToolDefinition};
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;

/// LLM-backed last-resort router. Returns `None` to mean "could not route",
/// never panics or propagates a transport error up to the caller.
#[async_trait]
pub trait RouterLlmClient: Send + Sync {
    async fn route(&self, message: &str, tools: &[ToolDefinition]) -> Option<RoutedIntent>;
}

/// Always defers — used when `Settings::is_openai_configured()` is false.
pub struct NullLlmClient;

#[async_trait]
impl RouterLlmClient for NullLlmClient {
    async fn route(&self, _message: &str, _tools: &[ToolDefinition]) -> Option<RoutedIntent> {
        None
    }
}

/// An OpenAI-compatible chat-completions client used as the router's
/// fallback tier when no slash command or keyword pattern matches.
pub struct OpenAiRouterClient {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiRouterClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self { api_key: api_key.into(), model: model.into(), client: reqwest::Client::new() }
    }
}

#[async_trait]
impl RouterLlmClient for OpenAiRouterClient {
    async fn route(&self, message: &str, tools: &[ToolDefinition]) -> Option<RoutedIntent> {
        let agent_names: Vec<&str> = tools.iter().map(|t| t.connector_id.as_str()).collect();
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": format!(
                    "Pick the single best agent key for this request from: {}. Reply with only the key, or NONE.",
                    agent_names.join(", ")
                )},
                {"role": "user", "content": message},
            ],
        });

        let response = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .ok()?;

        let parsed: serde_json::Value = response.json().await.ok()?;
        let text = parsed["choices"][0]["message"]["content"].as_str()?.trim();
        if text.eq_ignore_ascii_case("none") || text.is_empty() {
            return None;
        }

        Some(RoutedIntent {
            agent_key: Some(AgentKey::parse(text)),
            params: HashMap::new(),
            is_system_command: false,
            system_command: None,
            confidence: 0.5,
            original_message: message.to_string(),
        })
    }
}

/// Ordered, most-specific-first keyword table. Agents added for the widened
/// key set (`ingest_transcode`, `signal_quality`, `playout`, `ott`,
/// `newsroom`) are checked before the original eight so their more specific
/// phrasing ("ingest", "playout schedule") wins over a broader match.
fn keyword_table() -> Vec<(Regex, AgentKey)> {
    let entries: &[(&str, AgentKey)] = &[
        (r"(?i)\bingest|transcode|encode\b", AgentKey::IngestTranscode),
        (r"(?i)\bsignal quality|snr|dropped frames\b", AgentKey::SignalQuality),
        (r"(?i)\bplayout|air schedule|broadcast schedule\b", AgentKey::Playout),
        (r"(?i)\bott|streaming platform|concurrent viewers\b", AgentKey::Ott),
        (r"(?i)\bnewsroom|assignment desk|story list\b", AgentKey::Newsroom),
        (r"(?i)\bcaption|subtitle|srt|vtt\b", AgentKey::Caption),
        (r"(?i)\bclip|highlight\b", AgentKey::Clip),
        (r"(?i)\barchive|cold storage|retention\b", AgentKey::Archive),
        (r"(?i)\bcompliance|violation|regulation\b", AgentKey::Compliance),
        (r"(?i)\bsocial media|post to (twitter|instagram|tiktok)\b", AgentKey::Social),
        (r"(?i)\blocaliz|translat|subtitle language\b", AgentKey::Localization),
        (r"(?i)\brights|licens|territory\b", AgentKey::Rights),
        (r"(?i)\btrending|viral|velocity\b", AgentKey::Trending),
        (r"(?i)\bdeepfake|synthetic media\b", AgentKey::Deepfake),
        (r"(?i)\bfact.?check|verify claim\b", AgentKey::FactCheck),
        (r"(?i)\baudience|sentiment|reach\b", AgentKey::Audience),
        (r"(?i)\bproduction director|greenlight|editorial decision\b", AgentKey::ProductionDirector),
        (r"(?i)\bbrand safety|advertiser safe\b", AgentKey::BrandSafety),
        (r"(?i)\bcarbon|co2|emissions\b", AgentKey::Carbon),
    ];

    entries
        .iter()
        .map(|(pattern, key)| (Regex::new(pattern).expect("keyword pattern is a compile-time constant"), key.clone()))
        .collect()
}

fn slash_table() -> HashMap<&'static str, AgentKey> {
    [
        ("/miq-caption", AgentKey::Caption),
        ("/miq-clip", AgentKey::Clip),
        ("/miq-archive", AgentKey::Archive),
        ("/miq-compliance", AgentKey::Compliance),
        ("/miq-social", AgentKey::Social),
        ("/miq-localization", AgentKey::Localization),
        ("/miq-rights", AgentKey::Rights),
        ("/miq-trending", AgentKey::Trending),
        ("/miq-deepfake", AgentKey::Deepfake),
        ("/miq-factcheck", AgentKey::FactCheck),
        ("/miq-audience", AgentKey::Audience),
        ("/miq-director", AgentKey::ProductionDirector),
        ("/miq-brandsafety", AgentKey::BrandSafety),
        ("/miq-carbon", AgentKey::Carbon),
        ("/miq-ingest", AgentKey::IngestTranscode),
        ("/miq-signal", AgentKey::SignalQuality),
        ("/miq-playout", AgentKey::Playout),
        ("/miq-ott", AgentKey::Ott),
        ("/miq-newsroom", AgentKey::Newsroom),
    ]
    .into_iter()
    .collect()
}

const SYSTEM_COMMANDS: &[&str] =
    &["/miq-status", "/miq-connectors", "/miq-help", "/miq-cancel", "/miq-history"];

/// Parses `/miq-compliance https://cdn.example/clip.mp4`,
/// `/miq-trending --live --topic=elections`, `/miq-caption --url=https://... --language=en`
/// and `/miq-factcheck The president said X` into agent key plus params, following the
/// same token-by-token flag/positional split as `_parse_slash_command`.
fn parse_slash_command(text: &str) -> Option<RoutedIntent> {
    let trimmed = text.trim();
    if !trimmed.starts_with('/') {
        return None;
    }
    let mut parts = trimmed.split_whitespace();
    let command = parts.next().unwrap_or_default();

    if let Some(system_command) = SYSTEM_COMMANDS.iter().find(|c| **c == command) {
        return Some(RoutedIntent {
            agent_key: None,
            params: HashMap::new(),
            is_system_command: true,
            system_command: Some(system_command.to_string()),
            confidence: 1.0,
            original_message: text.to_string(),
        });
    }

    let table = slash_table();
    let agent_key = table.get(command)?.clone();

    let mut params = HashMap::new();
    let mut positional: Vec<&str> = Vec::new();
    for part in parts {
        if let Some(flag) = part.strip_prefix("--") {
            if let Some((key, value)) = flag.split_once('=') {
                params.insert(key.to_string(), serde_json::Value::String(value.to_string()));
            } else {
                params.insert(flag.to_string(), serde_json::Value::Bool(true));
            }
        } else {
            positional.push(part);
        }
    }
    if !positional.is_empty() {
        let joined = positional.join(" ");
        if positional[0].starts_with("http") {
            params.insert("url".to_string(), serde_json::Value::String(joined));
        } else {
            params.insert("text".to_string(), serde_json::Value::String(joined));
        }
    }

    Some(RoutedIntent {
        agent_key: Some(agent_key),
        params,
        is_system_command: false,
        system_command: None,
        confidence: 1.0,
        original_message: text.to_string(),
    })
}

fn extract_url(text: &str) -> Option<String> {
    static URL_PATTERN: &str = r"https?://\S+";
    Regex::new(URL_PATTERN).ok()?.find(text).map(|m| m.as_str().to_string())
}

fn extract_quoted(text: &str) -> Option<String> {
    static QUOTE_PATTERN: &str = r#""([^"]+)""#;
    Regex::new(QUOTE_PATTERN).ok()?.captures(text).map(|c| c[1].to_string())
}

fn route_by_keywords(text: &str) -> Option<RoutedIntent> {
    for (pattern, agent_key) in keyword_table() {
        if pattern.is_match(text) {
            let mut params = HashMap::new();
            params.insert("input".to_string(), serde_json::Value::String(text.to_string()));
            if let Some(url) = extract_url(text) {
                params.insert("url".to_string(), serde_json::Value::String(url));
            }
            if let Some(quoted) = extract_quoted(text) {
                params.insert("text".to_string(), serde_json::Value::String(quoted));
            } else {
                params.insert("text".to_string(), serde_json::Value::String(text.to_string()));
            }
            return Some(RoutedIntent {
                agent_key: Some(agent_key),
                params,
                is_system_command: false,
                system_command: None,
                confidence: 0.85,
                original_message: text.to_string(),
            });
        }
    }

    natural_language_system_command(text).map(|system_command| RoutedIntent {
        agent_key: None,
        params: HashMap::new(),
        is_system_command: true,
        system_command: Some(system_command.to_string()),
        confidence: 0.85,
        original_message: text.to_string(),
    })
}

/// Recognizes `status`/`connectors`/`help` system commands typed as plain
/// language instead of a `/miq-*` slash command, e.g. "what can you do" or
/// "show connectors". Tried after every keyword pattern has failed to match.
fn natural_language_system_command(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    const STATUS: &str = r"\b(status|health|agents)\b";
    const CONNECTORS: &str = r"\b(connector|integration|connected)\b";
    const HELP: &str = r"\b(help|what can|commands?|how to)\b";

    if Regex::new(STATUS).expect("system command pattern is a compile-time constant").is_match(&lower) {
        Some("/miq-status")
    } else if Regex::new(CONNECTORS).expect("system command pattern is a compile-time constant").is_match(&lower) {
        Some("/miq-connectors")
    } else if Regex::new(HELP).expect("system command pattern is a compile-time constant").is_match(&lower) {
        Some("/miq-help")
    } else {
        None
    }
}

/// The gateway's message router. Tries the slash-command parser, then the
/// keyword table, then the configured LLM client, and finally returns an
/// unrecognized intent rather than failing.
pub struct Router {
    llm_client: Arc<dyn RouterLlmClient>,
    tools: Vec<ToolDefinition>,
}

impl Router {
    pub fn new(llm_client: Arc<dyn RouterLlmClient>, tools: Vec<ToolDefinition>) -> Self {
        Self { llm_client, tools }
    }

    pub async fn route(&self, message: &str) -> RoutedIntent {
        if let Some(intent) = parse_slash_command(message) {
            return intent;
        }
        if let Some(intent) = route_by_keywords(message) {
            return intent;
        }
        if let Some(intent) = self.llm_client.route(message, &self.tools).await {
            return intent;
        }
        RoutedIntent::unrecognized(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn slash_command_takes_precedence_over_keywords() {
        let router = Router::new(Arc::new(NullLlmClient), Vec::new());
        let intent = router.route("/miq-caption this video please").await;
        assert_eq!(intent.agent_key, Some(AgentKey::Caption));
        assert_eq!(intent.confidence, 1.0);
    }

    #[tokio::test]
    async fn system_command_is_flagged() {
        let router = Router::new(Arc::new(NullLlmClient), Vec::new());
        let intent = router.route("/miq-status").await;
        assert!(intent.is_system_command);
        assert_eq!(intent.system_command.as_deref(), Some("/miq-status"));
    }

    #[tokio::test]
    async fn keyword_table_routes_plain_text() {
        let router = Router::new(Arc::new(NullLlmClient), Vec::new());
        let intent = router.route("can you add captions to this clip?").await;
        assert_eq!(intent.agent_key, Some(AgentKey::Caption));
    }

    #[tokio::test]
    async fn ingest_keyword_wins_over_broader_patterns() {
        let router = Router::new(Arc::new(NullLlmClient), Vec::new());
        let intent = router.route("please transcode this ingest feed").await;
        assert_eq!(intent.agent_key, Some(AgentKey::IngestTranscode));
    }

    #[tokio::test]
    async fn keyword_routing_extracts_url_and_text_params() {
        let router = Router::new(Arc::new(NullLlmClient), Vec::new());
        let intent = router.route("check compliance on https://cdn.example/clip.mp4").await;
        assert_eq!(intent.agent_key, Some(AgentKey::Compliance));
        assert_eq!(
            intent.params.get("url").and_then(|v| v.as_str()),
            Some("https://cdn.example/clip.mp4")
        );
    }

    #[tokio::test]
    async fn keyword_routing_prefers_quoted_text_over_the_full_message() {
        let router = Router::new(Arc::new(NullLlmClient), Vec::new());
        let intent = router.route(r#"please fact-check "the moon landing was staged""#).await;
        assert_eq!(intent.agent_key, Some(AgentKey::FactCheck));
        assert_eq!(
            intent.params.get("text").and_then(|v| v.as_str()),
            Some("the moon landing was staged")
        );
    }

    #[tokio::test]
    async fn unmatched_message_falls_through_to_unrecognized() {
        let router = Router::new(Arc::new(NullLlmClient), Vec::new());
        let intent = router.route("what's the weather like today").await;
        assert!(intent.agent_key.is_none());
        assert_eq!(intent.confidence, 0.0);
    }

    #[tokio::test]
    async fn keyword_routing_confidence_meets_the_dispatch_threshold() {
        let router = Router::new(Arc::new(NullLlmClient), Vec::new());
        let intent = router.route("add captions to this clip").await;
        assert_eq!(intent.confidence, 0.85);
    }

    #[tokio::test]
    async fn slash_command_parses_flags_and_url_positional() {
        let router = Router::new(Arc::new(NullLlmClient), Vec::new());
        let intent = router.route("/miq-trending --live --topic=elections").await;
        assert_eq!(intent.agent_key, Some(AgentKey::Trending));
        assert_eq!(intent.params.get("live").and_then(|v| v.as_bool()), Some(true));
        assert_eq!(intent.params.get("topic").and_then(|v| v.as_str()), Some("elections"));
    }

    #[tokio::test]
    async fn slash_command_url_positional_goes_to_url_param() {
        let router = Router::new(Arc::new(NullLlmClient), Vec::new());
        let intent = router.route("/miq-compliance https://cdn.example.com/clip.mp4").await;
        assert_eq!(intent.agent_key, Some(AgentKey::Compliance));
        assert_eq!(
            intent.params.get("url").and_then(|v| v.as_str()),
            Some("https://cdn.example.com/clip.mp4")
        );
        assert!(intent.params.get("text").is_none());
    }

    #[tokio::test]
    async fn slash_command_free_text_positional_goes_to_text_param() {
        let router = Router::new(Arc::new(NullLlmClient), Vec::new());
        let intent = router.route("/miq-factcheck The president said X").await;
        assert_eq!(intent.agent_key, Some(AgentKey::FactCheck));
        assert_eq!(intent.params.get("text").and_then(|v| v.as_str()), Some("The president said X"));
    }

    #[tokio::test]
    async fn natural_language_status_is_flagged_as_a_system_command() {
        let router = Router::new(Arc::new(NullLlmClient), Vec::new());
        let intent = router.route("show me the agent health dashboard").await;
        assert!(intent.is_system_command);
        assert_eq!(intent.system_command.as_deref(), Some("/miq-status"));
    }

    #[tokio::test]
    async fn natural_language_connectors_is_flagged_as_a_system_command() {
        let router = Router::new(Arc::new(NullLlmClient), Vec::new());
        let intent = router.route("are the connectors still connected?").await;
        assert!(intent.is_system_command);
        assert_eq!(intent.system_command.as_deref(), Some("/miq-connectors"));
    }

    #[tokio::test]
    async fn natural_language_help_is_flagged_as_a_system_command() {
        let router = Router::new(Arc::new(NullLlmClient), Vec::new());
        let intent = router.route("what can you do?").await;
        assert!(intent.is_system_command);
        assert_eq!(intent.system_command.as_deref(), Some("/miq-help"));
    }

    #[tokio::test]
    async fn miq_connectors_slash_command_is_a_system_command() {
        let router = Router::new(Arc::new(NullLlmClient), Vec::new());
        let intent = router.route("/miq-connectors").await;
        assert!(intent.is_system_command);
        assert_eq!(intent.system_command.as_deref(), Some("/miq-connectors"));
    }
}
