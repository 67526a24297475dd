//! The dual-mode agent contract: every concrete agent implements demo and
//! production code paths, and the runtime wrapper decides which one runs and
//! falls back to demo on missing integrations or a production-time error.
//!
//! Grounded on the settings-aware `BaseAgent` form in
//! `original_source/agents/ai_production_director_agent.py` (resolves the
//! spec's Open Question in favor of the settings-aware contract).

use crate::config::Settings;
use crate::types::{AgentKey, Envelope, ExecutionMode, TaskInput};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// A concrete media/broadcast operation, implemented once per agent key.
#[async_trait]
pub trait Agent: Send + Sync {
    fn key(&self) -> AgentKey;

    /// Names of the `Settings::is_*_configured()` integrations this agent
    /// needs before its production path can run, e.g. `["openai"]`.
    fn required_integrations(&self) -> &'static [&'static str] {
        &[]
    }

    fn validate_input(&self, input: &TaskInput) -> Result<(), String> {
        if input.as_text().map(str::is_empty).unwrap_or(false) {
            return Err("input must not be empty".to_string());
        }
        Ok(())
    }

    async fn demo_process(&self, input: &TaskInput) -> Result<serde_json::Value, String>;

    /// Real integration path. The default implementation reports that no
    /// production path exists, which always falls back to demo.
    async fn production_process(&self, _input: &TaskInput) -> Result<serde_json::Value, String> {
        Err("no production implementation".to_string())
    }
}

/// Internal-only outcome of attempting the production path. Never surfaced
/// past [`AgentRuntime::run`] — a `ProductionNotReady` outcome always falls
/// back to the demo path instead of becoming a visible error, per the
/// resolved Open Question.
enum ModeOutcome {
    Ran(serde_json::Value, ExecutionMode),
    ProductionNotReady(String),
}

/// Wraps an [`Agent`] with the settings-driven mode selection and
/// demo fallback behavior common to every agent invocation.
pub struct AgentRuntime {
    agent: Arc<dyn Agent>,
    settings: Arc<Settings>,
}

impl AgentRuntime {
    pub fn new(agent: Arc<dyn Agent>, settings: Arc<Settings>) -> Self {
        Self { agent, settings }
    }

    pub fn key(&self) -> AgentKey {
        self.agent.key()
    }

    fn integration_status(&self) -> HashMap<String, bool> {
        self.agent
            .required_integrations()
            .iter()
            .map(|name| (name.to_string(), self.is_configured(name)))
            .collect()
    }

    fn is_configured(&self, name: &str) -> bool {
        match name {
            "openai" => self.settings.is_openai_configured(),
            "slack" => self.settings.is_slack_configured(),
            "teams" => self.settings.is_teams_configured(),
            _ => false,
        }
    }

    fn missing_integrations(&self) -> Vec<String> {
        self.integration_status()
            .into_iter()
            .filter(|(_, configured)| !configured)
            .map(|(name, _)| name)
            .collect()
    }

    /// Run the agent against `input`, validating first, then attempting the
    /// production path when `Settings::production_mode` is set and every
    /// required integration is configured, falling back to demo otherwise
    /// or when the production path itself errors.
    pub async fn run(&self, input: &TaskInput) -> Envelope {
        let agent_name = self.agent.key().to_string();

        if let Err(message) = self.agent.validate_input(input) {
            return Envelope::failure(agent_name, ExecutionMode::Demo, message);
        }

        let outcome = if self.settings.production_mode {
            let missing = self.missing_integrations();
            if !missing.is_empty() {
                ModeOutcome::ProductionNotReady(format!(
                    "missing integrations: {}",
                    missing.join(", ")
                ))
            } else {
                match self.agent.production_process(input).await {
                    Ok(data) => ModeOutcome::Ran(data, ExecutionMode::Production),
                    Err(message) => ModeOutcome::ProductionNotReady(message),
                }
            }
        } else {
            ModeOutcome::ProductionNotReady("production mode disabled".to_string())
        };

        match outcome {
            ModeOutcome::Ran(data, mode) => Envelope::success(agent_name, mode, data),
            ModeOutcome::ProductionNotReady(reason) => {
                tracing::debug!(agent = %self.agent.key(), %reason, "falling back to demo mode");
                match self.agent.demo_process(input).await {
                    Ok(data) => Envelope::success(agent_name, ExecutionMode::Demo, data),
                    Err(message) => Envelope::failure(agent_name, ExecutionMode::Demo, message),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoAgent;

    #[async_trait]
    impl Agent for EchoAgent {
        fn key(&self) -> AgentKey {
            AgentKey::Caption
        }

        async fn demo_process(&self, input: &TaskInput) -> Result<serde_json::Value, String> {
            Ok(json!({"echo": input.as_text().unwrap_or_default()}))
        }
    }

    struct ProductionReadyAgent;

    #[async_trait]
    impl Agent for ProductionReadyAgent {
        fn key(&self) -> AgentKey {
            AgentKey::Trending
        }

        fn required_integrations(&self) -> &'static [&'static str] {
            &["openai"]
        }

        async fn demo_process(&self, _input: &TaskInput) -> Result<serde_json::Value, String> {
            Ok(json!({"mode": "demo"}))
        }

        async fn production_process(&self, _input: &TaskInput) -> Result<serde_json::Value, String> {
            Ok(json!({"mode": "production"}))
        }
    }

    #[tokio::test]
    async fn demo_mode_by_default() {
        let runtime = AgentRuntime::new(Arc::new(EchoAgent), Arc::new(Settings::default()));
        let result = runtime.run(&TaskInput::Text("hello".into())).await;
        assert!(result.success);
        assert_eq!(result.mode, ExecutionMode::Demo);
    }

    #[tokio::test]
    async fn production_mode_falls_back_without_integration() {
        let mut settings = Settings::default();
        settings.production_mode = true;
        let runtime = AgentRuntime::new(Arc::new(ProductionReadyAgent), Arc::new(settings));
        let result = runtime.run(&TaskInput::Text("x".into())).await;
        assert!(result.success);
        assert_eq!(result.mode, ExecutionMode::Demo);
    }

    #[tokio::test]
    async fn production_mode_runs_when_configured() {
        let mut settings = Settings::default();
        settings.production_mode = true;
        settings.openai_api_key = Some("sk-test".to_string());
        let runtime = AgentRuntime::new(Arc::new(ProductionReadyAgent), Arc::new(settings));
        let result = runtime.run(&TaskInput::Text("x".into())).await;
        assert!(result.success);
        assert_eq!(result.mode, ExecutionMode::Production);
    }

    #[tokio::test]
    async fn empty_input_fails_validation() {
        let runtime = AgentRuntime::new(Arc::new(EchoAgent), Arc::new(Settings::default()));
        let result = runtime.run(&TaskInput::Text(String::new())).await;
        assert!(!result.success);
    }
}
