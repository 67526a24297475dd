use async_trait::async_trait;
use miq_core::agent::Agent;
use miq_core::types::{AgentKey, TaskInput};
use serde_json::{json, Value};

/// Newsroom assignment-desk triage: ranks incoming stories by priority.
pub struct NewsroomAgent;

#[async_trait]
impl Agent for NewsroomAgent {
    fn key(&self) -> AgentKey {
        AgentKey::Newsroom
    }

    async fn demo_process(&self, input: &TaskInput) -> Result<Value, String> {
        let lead_story = input.as_text().unwrap_or("untitled story").to_string();
        Ok(json!({
            "story_count": 1,
            "assignment_desk": "national",
            "priority_story": lead_story,
        }))
    }
}
