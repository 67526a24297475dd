//! Per-(platform, channel, user) conversation sessions with bounded history,
//! a pending-action slot for multi-step interactions (e.g. confirming a
//! button click), and idle-TTL expiry.

use chrono::{DateTime, Duration, Utc};
use miq_core::types::AgentKey;
use std::collections::HashMap;
use tokio::sync::Mutex;

pub const DEFAULT_HISTORY_LIMIT: usize = 20;
pub const DEFAULT_IDLE_TTL_MINUTES: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub platform: String,
    pub channel: String,
    pub user: String,
}

impl SessionKey {
    pub fn new(platform: impl Into<String>, channel: impl Into<String>, user: impl Into<String>) -> Self {
        Self { platform: platform.into(), channel: channel.into(), user: user.into() }
    }
}

#[derive(Debug, Clone)]
pub struct HistoryTurn {
    pub message: String,
    pub agent_key: Option<AgentKey>,
    pub timestamp: DateTime<Utc>,
}

/// An action awaiting user confirmation, e.g. a card button the user must
/// still click, or a slash command missing a required argument.
#[derive(Debug, Clone)]
pub struct PendingAction {
    pub action_id: String,
    pub agent_key: AgentKey,
    pub params: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ConversationSession {
    pub key: SessionKey,
    pub history: Vec<HistoryTurn>,
    pub pending_action: Option<PendingAction>,
    pub last_active: DateTime<Utc>,
    /// Last media URL mentioned in this session, carried into a follow-up
    /// request that omits it (e.g. "now translate it to Spanish").
    pub last_url: Option<String>,
}

impl ConversationSession {
    fn new(key: SessionKey) -> Self {
        Self { key, history: Vec::new(), pending_action: None, last_active: Utc::now(), last_url: None }
    }

    fn record(&mut self, turn: HistoryTurn, history_limit: usize) {
        self.history.push(turn);
        if self.history.len() > history_limit {
            let drop = self.history.len() - history_limit;
            self.history.drain(0..drop);
        }
        self.last_active = Utc::now();
    }

    fn is_idle(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.last_active > ttl
    }
}

/// Owns every active conversation session, sweeping idle ones on access.
pub struct ConversationManager {
    sessions: Mutex<HashMap<SessionKey, ConversationSession>>,
    history_limit: usize,
    idle_ttl: Duration,
}

impl ConversationManager {
    pub fn new(history_limit: usize, idle_ttl_minutes: i64) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            history_limit,
            idle_ttl: Duration::minutes(idle_ttl_minutes),
        }
    }

    /// Record a turn, creating the session if it doesn't exist yet, and
    /// sweeping any session that has gone idle past the TTL.
    pub async fn record_turn(&self, key: &SessionKey, message: &str, agent_key: Option<AgentKey>) {
        self.record_turn_with_params(key, message, agent_key, &HashMap::new()).await;
    }

    /// Like [`Self::record_turn`], additionally remembering any `url` found
    /// in `params` so a later turn missing one can inherit it.
    pub async fn record_turn_with_params(
        &self,
        key: &SessionKey,
        message: &str,
        agent_key: Option<AgentKey>,
        params: &HashMap<String, serde_json::Value>,
    ) {
        let mut sessions = self.sessions.lock().await;
        self.sweep_locked(&mut sessions);
        let session = sessions.entry(key.clone()).or_insert_with(|| ConversationSession::new(key.clone()));
        if let Some(url) = params.get("url").and_then(serde_json::Value::as_str) {
            session.last_url = Some(url.to_string());
        }
        session.record(
            HistoryTurn { message: message.to_string(), agent_key, timestamp: Utc::now() },
            self.history_limit,
        );
    }

    /// Fill a missing `url` param from the session's last-known URL.
    pub async fn resolve_params(
        &self,
        key: &SessionKey,
        mut params: HashMap<String, serde_json::Value>,
    ) -> HashMap<String, serde_json::Value> {
        let sessions = self.sessions.lock().await;
        if !params.contains_key("url") {
            if let Some(last_url) = sessions.get(key).and_then(|s| s.last_url.clone()) {
                params.insert("url".to_string(), serde_json::Value::String(last_url));
            }
        }
        params
    }

    pub async fn set_pending_action(&self, key: &SessionKey, action: PendingAction) {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.entry(key.clone()).or_insert_with(|| ConversationSession::new(key.clone()));
        session.pending_action = Some(action);
        session.last_active = Utc::now();
    }

    pub async fn take_pending_action(&self, key: &SessionKey) -> Option<PendingAction> {
        let mut sessions = self.sessions.lock().await;
        sessions.get_mut(key).and_then(|s| s.pending_action.take())
    }

    pub async fn history(&self, key: &SessionKey) -> Vec<HistoryTurn> {
        self.sessions.lock().await.get(key).map(|s| s.history.clone()).unwrap_or_default()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    fn sweep_locked(&self, sessions: &mut HashMap<SessionKey, ConversationSession>) {
        let now = Utc::now();
        sessions.retain(|_, session| !session.is_idle(now, self.idle_ttl));
    }
}

impl Default for ConversationManager {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT, DEFAULT_IDLE_TTL_MINUTES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn record_turn_creates_and_bounds_history() {
        let manager = ConversationManager::new(2, 30);
        let key = SessionKey::new("slack", "C1", "U1");
        manager.record_turn(&key, "one", None).await;
        manager.record_turn(&key, "two", None).await;
        manager.record_turn(&key, "three", None).await;

        let history = manager.history(&key).await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].message, "two");
        assert_eq!(history[1].message, "three");
    }

    #[tokio::test]
    async fn pending_action_round_trips_once() {
        let manager = ConversationManager::new(20, 30);
        let key = SessionKey::new("slack", "C1", "U1");
        manager
            .set_pending_action(
                &key,
                PendingAction {
                    action_id: "confirm-archive".to_string(),
                    agent_key: AgentKey::Archive,
                    params: serde_json::json!({}),
                    created_at: Utc::now(),
                },
            )
            .await;

        assert!(manager.take_pending_action(&key).await.is_some());
        assert!(manager.take_pending_action(&key).await.is_none());
    }

    #[tokio::test]
    async fn resolve_params_fills_in_the_last_known_url() {
        let manager = ConversationManager::new(20, 30);
        let key = SessionKey::new("slack", "C1", "U1");

        let mut first_params = HashMap::new();
        first_params.insert("url".to_string(), serde_json::json!("https://cdn.example/clip.mp4"));
        manager.record_turn_with_params(&key, "check compliance", Some(AgentKey::Compliance), &first_params).await;

        let mut follow_up = HashMap::new();
        follow_up.insert("text".to_string(), serde_json::json!("translate to Spanish"));
        let resolved = manager.resolve_params(&key, follow_up).await;
        assert_eq!(resolved.get("url").and_then(serde_json::Value::as_str), Some("https://cdn.example/clip.mp4"));
    }

    #[tokio::test]
    async fn resolve_params_leaves_an_explicit_url_untouched() {
        let manager = ConversationManager::new(20, 30);
        let key = SessionKey::new("slack", "C1", "U1");

        let mut first_params = HashMap::new();
        first_params.insert("url".to_string(), serde_json::json!("https://cdn.example/clip.mp4"));
        manager.record_turn_with_params(&key, "check compliance", Some(AgentKey::Compliance), &first_params).await;

        let mut new_params = HashMap::new();
        new_params.insert("url".to_string(), serde_json::json!("https://cdn.example/other.mp4"));
        let resolved = manager.resolve_params(&key, new_params).await;
        assert_eq!(resolved.get("url").and_then(serde_json::Value::as_str), Some("https://cdn.example/other.mp4"));
    }

    #[tokio::test]
    async fn idle_sessions_are_swept() {
        let manager = ConversationManager::new(20, -1);
        let key = SessionKey::new("slack", "C1", "U1");
        manager.record_turn(&key, "hello", None).await;
        manager.record_turn(&SessionKey::new("slack", "C2", "U2"), "trigger sweep", None).await;

        assert!(manager.history(&key).await.is_empty());
    }
}
