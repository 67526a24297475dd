use async_trait::async_trait;
use miq_core::agent::Agent;
use miq_core::types::{AgentKey, TaskInput};
use serde_json::{json, Value};

const RISK_TERMS: &[&str] = &["violence", "profanity", "graphic", "lawsuit"];

/// Advertiser-safety scoring for content adjacent to paid placements.
pub struct BrandSafetyAgent;

#[async_trait]
impl Agent for BrandSafetyAgent {
    fn key(&self) -> AgentKey {
        AgentKey::BrandSafety
    }

    async fn demo_process(&self, input: &TaskInput) -> Result<Value, String> {
        let text = input.as_text().unwrap_or_default().to_lowercase();
        let flagged: Vec<&str> = RISK_TERMS.iter().filter(|t| text.contains(**t)).copied().collect();
        let risk_level = match flagged.len() {
            0 => "low",
            1 => "medium",
            _ => "high",
        };
        Ok(json!({
            "risk_level": risk_level,
            "flagged_terms": flagged,
            "advertiser_safe": flagged.is_empty(),
        }))
    }
}
