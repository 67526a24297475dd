use async_trait::async_trait;
use miq_core::agent::Agent;
use miq_core::types::{AgentKey, TaskInput};
use serde_json::{json, Value};

/// Mock ingest/transcode pipeline: produces the standard mezzanine and
/// delivery renditions for an incoming asset.
pub struct IngestTranscodeAgent;

#[async_trait]
impl Agent for IngestTranscodeAgent {
    fn key(&self) -> AgentKey {
        AgentKey::IngestTranscode
    }

    async fn demo_process(&self, input: &TaskInput) -> Result<Value, String> {
        let asset = input.as_text().unwrap_or("asset").to_string();
        Ok(json!({
            "profiles": ["1080p-h264", "720p-h264", "audio-only-aac"],
            "duration_seconds": 1800,
            "bitrate_kbps": 6000,
            "asset": asset,
        }))
    }
}
