use async_trait::async_trait;
use miq_core::agent::Agent;
use miq_core::types::{AgentKey, TaskInput};
use serde_json::{json, Value};

/// Synthetic-media detection on newly ingested content.
pub struct DeepfakeAgent;

#[async_trait]
impl Agent for DeepfakeAgent {
    fn key(&self) -> AgentKey {
        AgentKey::Deepfake
    }

    async fn demo_process(&self, input: &TaskInput) -> Result<Value, String> {
        let asset = input.as_text().unwrap_or("asset").to_string();
        let flagged = asset.to_lowercase().contains("synthetic");
        Ok(json!({
            "asset": asset,
            "confidence": if flagged { 0.92 } else { 0.04 },
            "flagged": flagged,
            "analysis_method": "frame-consistency-heuristic",
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unflagged_asset_has_low_confidence() {
        let agent = DeepfakeAgent;
        let result = agent.demo_process(&TaskInput::Text("interview.mp4".into())).await.unwrap();
        assert_eq!(result["flagged"], json!(false));
    }
}
