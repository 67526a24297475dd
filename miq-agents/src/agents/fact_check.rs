use async_trait::async_trait;
use miq_core::agent::Agent;
use miq_core::types::{AgentKey, TaskInput};
use serde_json::{json, Value};

/// Live fact-checking of claims surfaced during breaking coverage.
pub struct FactCheckAgent;

#[async_trait]
impl Agent for FactCheckAgent {
    fn key(&self) -> AgentKey {
        AgentKey::FactCheck
    }

    async fn demo_process(&self, input: &TaskInput) -> Result<Value, String> {
        let claim = input.as_text().unwrap_or("claim").to_string();
        Ok(json!({
            "claim": claim,
            "claims_checked": 1,
            "disputed_count": 0,
            "sources": ["wire-service-a", "wire-service-b"],
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_at_least_one_source() {
        let agent = FactCheckAgent;
        let result = agent.demo_process(&TaskInput::Text("claim".into())).await.unwrap();
        assert!(!result["sources"].as_array().unwrap().is_empty());
    }
}
