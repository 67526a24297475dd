//! Static event-kind to subscriber-agent table and the in-process bus that
//! fans typed events out to their subscribers.
//!
//! Grounded verbatim on `event_subscriptions` in
//! `original_source/orchestrator.py`, including its own "Future-Ready"
//! widening of `NewContent`, `CaptionComplete`, and `BreakingNews` — this
//! table is not itself further widened.

use miq_core::types::{AgentKey, Event, EventKind};

/// The agents that react to a given event kind, in fan-out order.
pub fn subscribers(kind: EventKind) -> &'static [AgentKey] {
    use AgentKey::*;
    match kind {
        EventKind::NewContent => {
            const S: &[AgentKey] = &[Caption, Clip, Compliance, Archive, Deepfake, BrandSafety, Audience];
            S
        }
        EventKind::CaptionComplete => {
            const S: &[AgentKey] = &[Localization, Social, FactCheck];
            S
        }
        EventKind::ClipDetected => {
            const S: &[AgentKey] = &[Social];
            S
        }
        EventKind::ComplianceAlert => {
            const S: &[AgentKey] = &[Social];
            S
        }
        EventKind::TrendingSpike => {
            const S: &[AgentKey] = &[Social, Archive];
            S
        }
        EventKind::LicenseExpiring => {
            const S: &[AgentKey] = &[Rights];
            S
        }
        EventKind::ViolationDetected => {
            const S: &[AgentKey] = &[Rights];
            S
        }
        EventKind::BreakingNews => {
            const S: &[AgentKey] = &[Social, Trending, ProductionDirector, FactCheck];
            S
        }
    }
}

/// A thin publisher over the static subscription table. Holds no state of
/// its own; the orchestrator owns task creation for each subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct EventBus;

impl EventBus {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(&self, event: &Event) -> &'static [AgentKey] {
        subscribers(event.kind)
    }
}
