use async_trait::async_trait;
use miq_core::agent::Agent;
use miq_core::types::{AgentKey, TaskInput};
use serde_json::{json, Value};

/// Translates captions/metadata into target-market languages.
pub struct LocalizationAgent;

#[async_trait]
impl Agent for LocalizationAgent {
    fn key(&self) -> AgentKey {
        AgentKey::Localization
    }

    async fn demo_process(&self, input: &TaskInput) -> Result<Value, String> {
        let source = input.as_text().unwrap_or("caption").to_string();
        let targets = vec!["es", "fr", "pt"];
        Ok(json!({
            "source": source,
            "target_languages": targets,
            "translated_count": targets.len(),
            "glossary_hits": 0,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn translates_into_every_target_language() {
        let agent = LocalizationAgent;
        let result = agent.demo_process(&TaskInput::Text("hello".into())).await.unwrap();
        assert_eq!(result["translated_count"], json!(3));
    }
}
