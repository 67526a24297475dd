use async_trait::async_trait;
use miq_core::agent::Agent;
use miq_core::types::{AgentKey, TaskInput};
use serde_json::{json, Value};

/// Schedules social-media distribution across configured platforms.
pub struct SocialAgent;

#[async_trait]
impl Agent for SocialAgent {
    fn key(&self) -> AgentKey {
        AgentKey::Social
    }

    async fn demo_process(&self, input: &TaskInput) -> Result<Value, String> {
        let content = input.as_text().unwrap_or("post").to_string();
        Ok(json!({
            "content": content,
            "platforms": ["twitter", "instagram"],
            "posts_scheduled": 2,
            "engagement_forecast": 0.6,
        }))
    }
}
