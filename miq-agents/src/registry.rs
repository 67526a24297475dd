//! Builds the full set of [`AgentRuntime`]s the orchestrator dispatches
//! tasks to, one per [`AgentKey`].

use crate::agents::*;
use miq_core::agent::AgentRuntime;
use miq_core::config::Settings;
use miq_core::types::AgentKey;
use std::collections::HashMap;
use std::sync::Arc;

/// Construct every concrete agent, wrapped in its [`AgentRuntime`], keyed by
/// [`AgentKey`]. This is the map `miq-cli` feeds into the orchestrator.
pub fn build_agent_runtimes(settings: Arc<Settings>) -> HashMap<AgentKey, Arc<AgentRuntime>> {
    let mut runtimes = HashMap::new();

    macro_rules! register {
        ($key:expr, $agent:expr) => {
            runtimes.insert(
                $key,
                Arc::new(AgentRuntime::new(Arc::new($agent), Arc::clone(&settings))),
            );
        };
    }

    register!(AgentKey::Caption, CaptionAgent);
    register!(AgentKey::Clip, ClipAgent);
    register!(AgentKey::Archive, ArchiveAgent);
    register!(AgentKey::Compliance, ComplianceAgent);
    register!(AgentKey::Social, SocialAgent);
    register!(AgentKey::Localization, LocalizationAgent);
    register!(AgentKey::Rights, RightsAgent);
    register!(AgentKey::Trending, TrendingAgent);
    register!(AgentKey::Deepfake, DeepfakeAgent);
    register!(AgentKey::FactCheck, FactCheckAgent);
    register!(AgentKey::Audience, AudienceAgent);
    register!(
        AgentKey::ProductionDirector,
        ProductionDirectorAgent::new(settings.openai_api_key.clone(), settings.openai_model.clone())
    );
    register!(AgentKey::BrandSafety, BrandSafetyAgent);
    register!(AgentKey::Carbon, CarbonAgent);
    register!(AgentKey::IngestTranscode, IngestTranscodeAgent);
    register!(AgentKey::SignalQuality, SignalQualityAgent);
    register!(AgentKey::Playout, PlayoutAgent);
    register!(AgentKey::Ott, OttAgent);
    register!(AgentKey::Newsroom, NewsroomAgent);

    runtimes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_all_nineteen_agents() {
        let runtimes = build_agent_runtimes(Arc::new(Settings::default()));
        assert_eq!(runtimes.len(), 19);
        assert!(runtimes.contains_key(&AgentKey::ProductionDirector));
        assert!(runtimes.contains_key(&AgentKey::Newsroom));
    }
}
