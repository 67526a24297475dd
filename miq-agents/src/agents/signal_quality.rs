use async_trait::async_trait;
use miq_core::agent::Agent;
use miq_core::types::{AgentKey, TaskInput};
use serde_json::{json, Value};

/// Monitors incoming feed health (SNR, dropped frames) for broadcast control.
pub struct SignalQualityAgent;

#[async_trait]
impl Agent for SignalQualityAgent {
    fn key(&self) -> AgentKey {
        AgentKey::SignalQuality
    }

    async fn demo_process(&self, input: &TaskInput) -> Result<Value, String> {
        let feed = input.as_text().unwrap_or("feed-1").to_string();
        let dropped_frames = if feed.to_lowercase().contains("degraded") { 42 } else { 0 };
        let alert_level = if dropped_frames > 0 { "warning" } else { "nominal" };
        Ok(json!({
            "snr_db": if dropped_frames > 0 { 18.5 } else { 46.2 },
            "dropped_frames": dropped_frames,
            "alert_level": alert_level,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn degraded_feed_raises_an_alert() {
        let agent = SignalQualityAgent;
        let result = agent.demo_process(&TaskInput::Text("feed-3 degraded".into())).await.unwrap();
        assert_eq!(result["alert_level"], json!("warning"));
    }

    #[tokio::test]
    async fn healthy_feed_is_nominal() {
        let agent = SignalQualityAgent;
        let result = agent.demo_process(&TaskInput::Text("feed-1".into())).await.unwrap();
        assert_eq!(result["alert_level"], json!("nominal"));
    }
}
