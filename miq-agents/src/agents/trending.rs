use async_trait::async_trait;
use miq_core::agent::Agent;
use miq_core::types::{AgentKey, TaskInput};
use serde_json::{json, Value};

/// Tracks topic velocity and flags breaking-news-worthy spikes.
///
/// Grounded on the `trending`/`breaking_news` derivation rules in
/// `original_source/orchestrator.py` (lines ~667-677): `velocity_score` is a
/// 0-100 scale, and a velocity spike and breaking news are independent,
/// non-exclusive signals from the same scan.
pub struct TrendingAgent;

#[async_trait]
impl Agent for TrendingAgent {
    fn key(&self) -> AgentKey {
        AgentKey::Trending
    }

    async fn demo_process(&self, input: &TaskInput) -> Result<Value, String> {
        let topic = input.as_text().unwrap_or("scan").to_string();
        let velocity_score = ((topic.len() % 10) as f64) * 3.0 + 65.0;
        let breaking_news = topic.to_lowercase().contains("breaking");

        Ok(json!({
            "top_topic": topic,
            "trends": [topic],
            "velocity_score": velocity_score,
            "breaking_news": breaking_news,
        }))
    }
}
