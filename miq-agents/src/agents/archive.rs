use async_trait::async_trait;
use miq_core::agent::Agent;
use miq_core::types::{AgentKey, TaskInput};
use serde_json::{json, Value};

/// Archival tiering and retention bookkeeping for long-term storage.
pub struct ArchiveAgent;

#[async_trait]
impl Agent for ArchiveAgent {
    fn key(&self) -> AgentKey {
        AgentKey::Archive
    }

    async fn demo_process(&self, input: &TaskInput) -> Result<Value, String> {
        let asset = input.as_text().unwrap_or("unknown asset");
        Ok(json!({
            "asset": asset,
            "archived_assets": 1,
            "storage_tier": "cold",
            "retention_days": 2555,
        }))
    }
}
