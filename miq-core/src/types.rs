//! Core data model: agents, tasks, events, and the routed-intent / envelope
//! types shared across the orchestrator, gateway, and connector crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// The full set of agent keys the platform knows about.
///
/// Grounded on `original_source/orchestrator.py`'s `AgentType` enum: the
/// original 8 agents plus the 6 "future-ready" agents and the 5 Phase 1
/// pipeline agents. `Other` carries any dynamically-registered key that
/// isn't part of this closed set (the core only needs a tagged enum for the
/// keys it routes statically; connectors and tool names stay string-keyed).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AgentKey {
    Caption,
    Clip,
    Archive,
    Compliance,
    Social,
    Localization,
    Rights,
    Trending,
    Deepfake,
    FactCheck,
    Audience,
    ProductionDirector,
    BrandSafety,
    Carbon,
    IngestTranscode,
    SignalQuality,
    Playout,
    Ott,
    Newsroom,
    Other(String),
}

impl Serialize for AgentKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AgentKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(AgentKey::parse(&s))
    }
}

impl AgentKey {
    pub fn as_str(&self) -> &str {
        match self {
            AgentKey::Caption => "caption",
            AgentKey::Clip => "clip",
            AgentKey::Archive => "archive",
            AgentKey::Compliance => "compliance",
            AgentKey::Social => "social",
            AgentKey::Localization => "localization",
            AgentKey::Rights => "rights",
            AgentKey::Trending => "trending",
            AgentKey::Deepfake => "deepfake",
            AgentKey::FactCheck => "fact_check",
            AgentKey::Audience => "audience",
            AgentKey::ProductionDirector => "production_director",
            AgentKey::BrandSafety => "brand_safety",
            AgentKey::Carbon => "carbon",
            AgentKey::IngestTranscode => "ingest_transcode",
            AgentKey::SignalQuality => "signal_quality",
            AgentKey::Playout => "playout",
            AgentKey::Ott => "ott",
            AgentKey::Newsroom => "newsroom",
            AgentKey::Other(s) => s.as_str(),
        }
    }

    /// Parse a slash-command suffix or keyword-routing key into an `AgentKey`.
    pub fn parse(key: &str) -> Self {
        match key {
            "caption" => AgentKey::Caption,
            "clip" => AgentKey::Clip,
            "archive" => AgentKey::Archive,
            "compliance" => AgentKey::Compliance,
            "social" => AgentKey::Social,
            "localization" => AgentKey::Localization,
            "rights" => AgentKey::Rights,
            "trending" => AgentKey::Trending,
            "deepfake" => AgentKey::Deepfake,
            "fact_check" => AgentKey::FactCheck,
            "audience" => AgentKey::Audience,
            "production_director" => AgentKey::ProductionDirector,
            "brand_safety" => AgentKey::BrandSafety,
            "carbon" => AgentKey::Carbon,
            "ingest_transcode" => AgentKey::IngestTranscode,
            "signal_quality" => AgentKey::SignalQuality,
            "playout" => AgentKey::Playout,
            "ott" => AgentKey::Ott,
            "newsroom" => AgentKey::Newsroom,
            other => AgentKey::Other(other.to_string()),
        }
    }
}

impl fmt::Display for AgentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Dispatch priority. Ordering matters: `Critical` sorts before `High`
/// before `Normal` before `Low` (derived `Ord` on declaration order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Critical,
    High,
    Normal,
    Low,
}

/// Task lifecycle status. Monotonic except `Pending -> Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Cancelled
        )
    }
}

/// Opaque input payload accepted by an agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskInput {
    Text(String),
    Path(String),
    Structured(HashMap<String, serde_json::Value>),
}

impl TaskInput {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            TaskInput::Text(s) | TaskInput::Path(s) => Some(s),
            TaskInput::Structured(_) => None,
        }
    }
}

/// What caused a task to be submitted — a parent task, a schedule, or an
/// event — enabling causal audit per spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggeredBy {
    Task(String),
    Schedule(String),
    Event(String),
}

impl fmt::Display for TriggeredBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggeredBy::Task(id) => write!(f, "task:{id}"),
            TriggeredBy::Schedule(id) => write!(f, "schedule:{id}"),
            TriggeredBy::Event(kind) => write!(f, "event:{kind}"),
        }
    }
}

/// The canonical result envelope returned by every agent invocation and
/// every connector tool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,
    pub agent: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub mode: ExecutionMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Envelope {
    pub fn success(agent: impl Into<String>, mode: ExecutionMode, data: serde_json::Value) -> Self {
        Self {
            success: true,
            agent: agent.into(),
            timestamp: Utc::now(),
            data: Some(data),
            error: None,
            mode,
            metadata: None,
        }
    }

    pub fn failure(agent: impl Into<String>, mode: ExecutionMode, error: impl Into<String>) -> Self {
        Self {
            success: false,
            agent: agent.into(),
            timestamp: Utc::now(),
            data: None,
            error: Some(error.into()),
            mode,
            metadata: None,
        }
    }

    /// Fetch `data.<key>` for completion-hook rule evaluation and journal
    /// high-value-key extraction.
    pub fn data_field(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.as_ref().and_then(|d| d.get(key))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    Demo,
    Production,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Demo => write!(f, "demo"),
            ExecutionMode::Production => write!(f, "production"),
        }
    }
}

/// A unit of work submitted to the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub agent_key: AgentKey,
    pub input: TaskInput,
    pub priority: Priority,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub result: Option<Envelope>,
    pub triggered_by: Option<TriggeredBy>,
}

impl Task {
    pub fn new(agent_key: AgentKey, input: TaskInput, priority: Priority) -> Self {
        Self {
            id: short_id(),
            agent_key,
            input,
            priority,
            status: TaskStatus::Pending,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            result: None,
            triggered_by: None,
        }
    }

    pub fn with_triggered_by(mut self, triggered_by: TriggeredBy) -> Self {
        self.triggered_by = Some(triggered_by);
        self
    }

    /// Count the `task:` hops in the `triggered_by` chain. Only the
    /// immediate parent is stored on the task itself; the orchestrator
    /// tracks chain depth separately (see `miq-orchestrator::hops`).
    pub fn parent_task_id(&self) -> Option<&str> {
        match &self.triggered_by {
            Some(TriggeredBy::Task(id)) => Some(id.as_str()),
            _ => None,
        }
    }
}

/// An 8-character opaque id, matching the source's `str(uuid4())[:8]` style
/// while staying collision-resistant enough for a single-process control
/// plane.
pub fn short_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// A recurring job definition held by the scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledJob {
    pub id: String,
    pub agent_key: AgentKey,
    pub input: TaskInput,
    pub interval: chrono::Duration,
    pub enabled: bool,
    pub last_run: Option<DateTime<Utc>>,
    pub next_run: DateTime<Utc>,
    pub run_count: u64,
}

impl ScheduledJob {
    pub fn new(id: impl Into<String>, agent_key: AgentKey, input: TaskInput, interval: chrono::Duration) -> Self {
        Self {
            id: id.into(),
            agent_key,
            input,
            interval,
            enabled: true,
            last_run: None,
            next_run: Utc::now(),
            run_count: 0,
        }
    }
}

/// The typed event kinds recognized by the static subscription table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    NewContent,
    CaptionComplete,
    ClipDetected,
    ComplianceAlert,
    TrendingSpike,
    LicenseExpiring,
    ViolationDetected,
    BreakingNews,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::NewContent => "new_content",
            EventKind::CaptionComplete => "caption_complete",
            EventKind::ClipDetected => "clip_detected",
            EventKind::ComplianceAlert => "compliance_alert",
            EventKind::TrendingSpike => "trending_spike",
            EventKind::LicenseExpiring => "license_expiring",
            EventKind::ViolationDetected => "violation_detected",
            EventKind::BreakingNews => "breaking_news",
        }
    }

    /// Events that dispatch their subscribers at `High` priority per spec §4.5.
    pub fn dispatch_priority(&self) -> Priority {
        match self {
            EventKind::ComplianceAlert | EventKind::BreakingNews | EventKind::ViolationDetected => {
                Priority::High
            }
            _ => Priority::Normal,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A typed signal published on the event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    pub data: serde_json::Value,
    pub source_agent: String,
    pub timestamp: DateTime<Utc>,
}

impl Event {
    pub fn new(kind: EventKind, source_agent: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            kind,
            data,
            source_agent: source_agent.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Router output: which agent to call, with what parameters.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RoutedIntent {
    pub agent_key: Option<AgentKey>,
    pub params: HashMap<String, serde_json::Value>,
    pub is_system_command: bool,
    pub system_command: Option<String>,
    pub confidence: f32,
    pub original_message: String,
}

impl RoutedIntent {
    pub fn unrecognized(original_message: impl Into<String>) -> Self {
        Self {
            agent_key: None,
            params: HashMap::new(),
            is_system_command: false,
            system_command: None,
            confidence: 0.0,
            original_message: original_message.into(),
        }
    }
}

/// Broad category a connector belongs to, used by the gateway's LLM-fallback
/// tier and the registry's `get_by_category` lookups.
///
/// Grounded on `ConnectorCategory` in `original_source/connectors/base_connector.py`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorCategory {
    Storage,
    Channel,
    Mam,
    Cdn,
    Newsroom,
    BroadcastControl,
}

impl fmt::Display for ConnectorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectorCategory::Storage => "storage",
            ConnectorCategory::Channel => "channel",
            ConnectorCategory::Mam => "mam",
            ConnectorCategory::Cdn => "cdn",
            ConnectorCategory::Newsroom => "newsroom",
            ConnectorCategory::BroadcastControl => "broadcast_control",
        };
        write!(f, "{s}")
    }
}

/// A single named, schema-described tool exposed by a connector, aggregated
/// by the registry into one namespace for the router's LLM-fallback tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub connector_id: String,
    pub description: String,
    pub parameters_schema: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_ordering_is_dispatch_order() {
        let mut v = vec![Priority::Low, Priority::Normal, Priority::Critical, Priority::High];
        v.sort();
        assert_eq!(v, vec![Priority::Critical, Priority::High, Priority::Normal, Priority::Low]);
    }

    #[test]
    fn task_status_terminal_states() {
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
        assert!(TaskStatus::Cancelled.is_terminal());
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::Running.is_terminal());
    }

    #[test]
    fn agent_key_round_trips_through_parse() {
        for key in ["caption", "production_director", "ingest_transcode", "custom_key"] {
            assert_eq!(AgentKey::parse(key).as_str(), key);
        }
    }

    #[test]
    fn event_kind_dispatch_priority_matches_spec() {
        assert_eq!(EventKind::ComplianceAlert.dispatch_priority(), Priority::High);
        assert_eq!(EventKind::BreakingNews.dispatch_priority(), Priority::High);
        assert_eq!(EventKind::ViolationDetected.dispatch_priority(), Priority::High);
        assert_eq!(EventKind::CaptionComplete.dispatch_priority(), Priority::Normal);
    }

    #[test]
    fn triggered_by_display_matches_audit_format() {
        assert_eq!(TriggeredBy::Schedule("job1".into()).to_string(), "schedule:job1");
        assert_eq!(TriggeredBy::Event("breaking_news".into()).to_string(), "event:breaking_news");
    }
}
