use async_trait::async_trait;
use miq_core::agent::Agent;
use miq_core::types::{AgentKey, TaskInput};
use serde_json::{json, Value};

/// Broadcast standards and regulatory compliance scanning.
///
/// Grounded on the compliance scan described in `original_source/orchestrator.py`'s
/// `_handle_task_completion` rules for `ComplianceAlert`/`ViolationDetected`.
pub struct ComplianceAgent;

const FLAGGED_TERMS: &[&str] = &["profanity", "nudity", "unlicensed_music"];

#[async_trait]
impl Agent for ComplianceAgent {
    fn key(&self) -> AgentKey {
        AgentKey::Compliance
    }

    async fn demo_process(&self, input: &TaskInput) -> Result<Value, String> {
        let content = input.as_text().unwrap_or_default().to_lowercase();
        let issues: Vec<&str> = FLAGGED_TERMS.iter().filter(|term| content.contains(*term)).copied().collect();
        let critical_count = issues.iter().filter(|i| **i == "nudity").count();

        Ok(json!({
            "issues": issues,
            "violations": issues.len(),
            "critical_count": critical_count,
            "score": 1.0 - (issues.len() as f64 * 0.2),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn clean_content_has_no_violations() {
        let agent = ComplianceAgent;
        let result = agent.demo_process(&TaskInput::Text("family friendly segment".into())).await.unwrap();
        assert_eq!(result["violations"], json!(0));
    }

    #[tokio::test]
    async fn flagged_term_raises_violation_count() {
        let agent = ComplianceAgent;
        let result = agent.demo_process(&TaskInput::Text("contains profanity in dialogue".into())).await.unwrap();
        assert_eq!(result["violations"], json!(1));
        assert_eq!(result["critical_count"], json!(0));
    }

    #[tokio::test]
    async fn nudity_flag_is_critical() {
        let agent = ComplianceAgent;
        let result = agent.demo_process(&TaskInput::Text("scene flagged for nudity".into())).await.unwrap();
        assert_eq!(result["critical_count"], json!(1));
    }
}
