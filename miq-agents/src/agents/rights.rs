use async_trait::async_trait;
use miq_core::agent::Agent;
use miq_core::types::{AgentKey, TaskInput};
use serde_json::{json, Value};

/// Licensing and territory-rights checks, plus unauthorized-usage monitoring.
///
/// Grounded on `_check_expiring_licenses`/`_check_unauthorized_usage` in
/// `original_source/agents/rights_agent.py`: `expiring_soon` feeds
/// `LICENSE_EXPIRING` and `violations` feeds `VIOLATION_DETECTED`.
pub struct RightsAgent;

#[async_trait]
impl Agent for RightsAgent {
    fn key(&self) -> AgentKey {
        AgentKey::Rights
    }

    async fn demo_process(&self, input: &TaskInput) -> Result<Value, String> {
        let asset = input.as_text().unwrap_or("check").to_string();
        let lower = asset.to_lowercase();

        let expiring_soon: Vec<Value> = if lower.contains("expiring") {
            vec![json!({"id": "license-7421", "days_until_expiry": 14})]
        } else {
            Vec::new()
        };

        let violations: Vec<Value> = if lower.contains("unauthorized") || lower.contains("violation") {
            vec![json!({"id": "vio-4821", "type": "unauthorized_rebroadcast", "severity": "high"})]
        } else {
            Vec::new()
        };

        Ok(json!({
            "asset": asset,
            "licenses_checked": 1,
            "expiring_soon": expiring_soon,
            "violations": violations,
            "blocked_territories": [],
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_no_expiring_licenses_or_violations_by_default() {
        let agent = RightsAgent;
        let result = agent.demo_process(&TaskInput::Text("check".into())).await.unwrap();
        assert!(result["expiring_soon"].as_array().unwrap().is_empty());
        assert!(result["violations"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn flags_expiring_license_when_mentioned() {
        let agent = RightsAgent;
        let result = agent.demo_process(&TaskInput::Text("asset expiring next week".into())).await.unwrap();
        assert!(!result["expiring_soon"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn flags_unauthorized_usage_as_a_violation() {
        let agent = RightsAgent;
        let result = agent.demo_process(&TaskInput::Text("unauthorized rebroadcast detected".into())).await.unwrap();
        assert!(!result["violations"].as_array().unwrap().is_empty());
    }
}
