use async_trait::async_trait;
use miq_core::agent::Agent;
use miq_core::types::{AgentKey, TaskInput};
use serde_json::{json, Value};

/// Streaming-platform health and concurrency monitoring.
pub struct OttAgent;

#[async_trait]
impl Agent for OttAgent {
    fn key(&self) -> AgentKey {
        AgentKey::Ott
    }

    async fn demo_process(&self, input: &TaskInput) -> Result<Value, String> {
        let platform = input.as_text().unwrap_or("web").to_string();
        Ok(json!({
            "platform": platform,
            "stream_health": "healthy",
            "concurrent_viewers": 48_210,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_viewer_counts() {
        let agent = OttAgent;
        let result = agent.demo_process(&TaskInput::Text("roku".into())).await.unwrap();
        assert!(result["concurrent_viewers"].as_u64().unwrap() > 0);
    }
}
