use async_trait::async_trait;
use miq_core::agent::Agent;
use miq_core::types::{AgentKey, TaskInput};
use serde_json::{json, Value};

/// Audience sentiment and reach estimation.
pub struct AudienceAgent;

#[async_trait]
impl Agent for AudienceAgent {
    fn key(&self) -> AgentKey {
        AgentKey::Audience
    }

    async fn demo_process(&self, input: &TaskInput) -> Result<Value, String> {
        let segment = input.as_text().unwrap_or("general").to_string();
        Ok(json!({
            "segment": segment,
            "sentiment_score": 0.55,
            "reach_estimate": 120_000,
        }))
    }
}
