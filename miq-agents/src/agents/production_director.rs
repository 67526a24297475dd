//! The editorial decision-making agent: recommends what to greenlight, cut,
//! or escalate across the other agents' outputs.
//!
//! Grounded on the settings-aware `BaseAgent` form and
//! `_get_required_integrations`/`_production_process` fallback pattern in
//! `original_source/agents/ai_production_director_agent.py`.

use async_trait::async_trait;
use miq_core::agent::Agent;
use miq_core::types::{AgentKey, TaskInput};
use serde_json::{json, Value};

pub struct ProductionDirectorAgent {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
}

impl ProductionDirectorAgent {
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), api_key, model: model.into() }
    }
}

#[async_trait]
impl Agent for ProductionDirectorAgent {
    fn key(&self) -> AgentKey {
        AgentKey::ProductionDirector
    }

    fn required_integrations(&self) -> &'static [&'static str] {
        &["openai"]
    }

    async fn demo_process(&self, input: &TaskInput) -> Result<Value, String> {
        let context = input.as_text().unwrap_or("pending editorial review").to_string();
        Ok(json!({
            "decision": format!("hold for human review: {context}"),
            "affected_agents": ["compliance", "brand_safety"],
            "urgency": "normal",
        }))
    }

    async fn production_process(&self, input: &TaskInput) -> Result<Value, String> {
        let api_key = self.api_key.as_deref().ok_or("missing openai api key")?;
        let context = input.as_text().unwrap_or_default();

        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": "You are an editorial production director for a broadcast newsroom."},
                {"role": "user", "content": context},
            ],
        });

        let response = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let parsed: Value = response.json().await.map_err(|e| e.to_string())?;
        let decision = parsed["choices"][0]["message"]["content"]
            .as_str()
            .ok_or("malformed openai response")?
            .to_string();

        Ok(json!({
            "decision": decision,
            "affected_agents": [],
            "urgency": "normal",
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn demo_process_holds_for_review() {
        let agent = ProductionDirectorAgent::new(None, "gpt-4o-mini");
        let result = agent.demo_process(&TaskInput::Text("segment A vs segment B".into())).await.unwrap();
        assert!(result["decision"].as_str().unwrap().contains("hold for human review"));
    }

    #[tokio::test]
    async fn production_process_without_key_errors() {
        let agent = ProductionDirectorAgent::new(None, "gpt-4o-mini");
        assert!(agent.production_process(&TaskInput::Text("x".into())).await.is_err());
    }
}
