//! Layered configuration: defaults → TOML file → environment, producing a
//! typed [`Settings`] with `is_*_configured()` predicates, mirroring
//! `original_source/settings.py`'s pydantic `Settings` model.

use crate::error::ConfigError;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub production_mode: bool,

    pub openai_api_key: Option<String>,
    pub openai_model: String,

    pub slack_bot_token: Option<String>,
    pub slack_signing_secret: Option<String>,
    pub slack_default_channel: Option<String>,

    pub teams_app_id: Option<String>,
    pub teams_app_password: Option<String>,
    pub teams_tenant_id: Option<String>,

    pub host: String,
    pub port: u16,
    pub debug: bool,

    pub api_timeout_seconds: u64,

    /// Root of the persisted memory tree (`memory/agents/*.md`, etc.).
    pub memory_root: String,

    /// Per-agent journal entries kept before a trim is triggered.
    pub memory_max_entries_per_agent: usize,
    /// Per-agent journal entries kept *after* a trim fires — a gap below
    /// `memory_max_entries_per_agent` so trimming isn't re-triggered on the
    /// very next save.
    pub memory_trim_to: usize,
    /// How many of an agent's most recent journal entries are pulled back in
    /// as context for that agent's next run.
    pub memory_recent_context_entries: usize,

    /// Replay window for webhook signature verification, in seconds.
    pub webhook_replay_window_seconds: i64,

    /// Maximum `triggered_by` chain depth before a task is refused.
    pub max_event_chain_hops: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            production_mode: false,
            openai_api_key: None,
            openai_model: "gpt-4o-mini".to_string(),
            slack_bot_token: None,
            slack_signing_secret: None,
            slack_default_channel: None,
            teams_app_id: None,
            teams_app_password: None,
            teams_tenant_id: None,
            host: "0.0.0.0".to_string(),
            port: 8080,
            debug: false,
            api_timeout_seconds: 30,
            memory_root: "memory".to_string(),
            memory_max_entries_per_agent: 2000,
            memory_trim_to: 1800,
            memory_recent_context_entries: 10,
            webhook_replay_window_seconds: 300,
            max_event_chain_hops: 8,
        }
    }
}

impl Settings {
    /// Load configuration from defaults, an optional TOML file, then
    /// environment variables (`MIQ_*` prefix), in that precedence order.
    pub fn load(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("MIQ_").split("_").lowercase(false));

        figment
            .extract()
            .map_err(|e| ConfigError::Invalid { message: e.to_string() })
    }

    pub fn is_openai_configured(&self) -> bool {
        self.openai_api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    pub fn is_slack_configured(&self) -> bool {
        self.slack_bot_token.as_deref().is_some_and(|v| !v.is_empty())
            && self.slack_signing_secret.as_deref().is_some_and(|v| !v.is_empty())
    }

    pub fn is_teams_configured(&self) -> bool {
        self.teams_app_id.as_deref().is_some_and(|v| !v.is_empty())
            && self.teams_app_password.as_deref().is_some_and(|v| !v.is_empty())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
