use async_trait::async_trait;
use miq_core::agent::Agent;
use miq_core::types::{AgentKey, TaskInput};
use serde_json::{json, Value};

const KWH_PER_MINUTE: f64 = 0.8;
const KG_CO2_PER_KWH: f64 = 0.4;

/// Estimates the energy and carbon footprint of a production or transcode job.
pub struct CarbonAgent;

#[async_trait]
impl Agent for CarbonAgent {
    fn key(&self) -> AgentKey {
        AgentKey::Carbon
    }

    async fn demo_process(&self, input: &TaskInput) -> Result<Value, String> {
        let minutes: f64 = input
            .as_text()
            .and_then(|t| t.split_whitespace().find_map(|w| w.parse::<f64>().ok()))
            .unwrap_or(30.0);
        let kwh = minutes * KWH_PER_MINUTE;
        let co2_kg = kwh * KG_CO2_PER_KWH;
        Ok(json!({
            "estimated_kwh": kwh,
            "co2_kg": co2_kg,
            "offset_recommendation": if co2_kg > 20.0 { "purchase carbon offset" } else { "within baseline" },
        }))
    }
}
