use async_trait::async_trait;
use miq_core::agent::Agent;
use miq_core::types::{AgentKey, TaskInput};
use serde_json::{json, Value};

/// Schedule-adherence monitoring for the broadcast playout chain.
pub struct PlayoutAgent;

#[async_trait]
impl Agent for PlayoutAgent {
    fn key(&self) -> AgentKey {
        AgentKey::Playout
    }

    async fn demo_process(&self, input: &TaskInput) -> Result<Value, String> {
        let channel = input.as_text().unwrap_or("CH1").to_string();
        Ok(json!({
            "channel": channel,
            "next_event": "station-id-break",
            "schedule_drift_seconds": 0,
        }))
    }
}
