//! Completion-hook rules: a successfully completed task may itself cause one
//! or more typed events to be published, chaining further agent work.
//!
//! Grounded on the post-completion event-derivation branch in
//! `original_source/orchestrator.py` (the `trending`/`rights` `elif` arms
//! around lines 667-690).

use miq_core::types::{AgentKey, Envelope, Event, EventKind, Task};

/// Derive the events a completed task's result should publish, if any.
/// Only runs for successful, non-cancelled completions.
pub fn derive_events(task: &Task, envelope: &Envelope) -> Vec<Event> {
    if !envelope.success {
        return Vec::new();
    }

    let mut events = Vec::new();
    let source = task.agent_key.to_string();

    match task.agent_key {
        AgentKey::Caption => {
            events.push(Event::new(EventKind::CaptionComplete, source, caption_summary(envelope)));
        }
        AgentKey::Clip => {
            if envelope.data_field("clip_count").and_then(|v| v.as_u64()).unwrap_or(0) > 0 {
                events.push(Event::new(EventKind::ClipDetected, source, clip_summary(envelope)));
            }
        }
        AgentKey::Compliance => {
            let critical = envelope.data_field("critical_count").and_then(|v| v.as_u64()).unwrap_or(0);
            if critical > 0 {
                events.push(Event::new(EventKind::ComplianceAlert, source, compliance_summary(envelope)));
            }
        }
        AgentKey::Trending => {
            // Independent checks: a single trending scan can be both a velocity
            // spike and breaking news at once.
            let velocity_score = envelope.data_field("velocity_score").and_then(|v| v.as_f64()).unwrap_or(0.0);
            if velocity_score > 90.0 {
                events.push(Event::new(EventKind::TrendingSpike, source.clone(), trending_summary(envelope)));
            }
            let is_breaking = envelope
                .data_field("breaking_news")
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            if is_breaking {
                events.push(Event::new(EventKind::BreakingNews, source, trending_summary(envelope)));
            }
        }
        AgentKey::Rights => {
            let violations = envelope
                .data_field("violations")
                .map(|v| !matches!(v, serde_json::Value::Array(a) if a.is_empty()))
                .unwrap_or(false);
            if violations {
                events.push(Event::new(EventKind::ViolationDetected, source.clone(), rights_summary(envelope)));
            }
            let expiring = envelope
                .data_field("expiring_soon")
                .map(|v| !matches!(v, serde_json::Value::Array(a) if a.is_empty()))
                .unwrap_or(false);
            if expiring {
                events.push(Event::new(EventKind::LicenseExpiring, source, rights_summary(envelope)));
            }
        }
        _ => {}
    }

    events
}

fn caption_summary(envelope: &Envelope) -> serde_json::Value {
    serde_json::json!({
        "language": envelope.data_field("language"),
        "qa_score": envelope.data_field("qa_score"),
    })
}

fn clip_summary(envelope: &Envelope) -> serde_json::Value {
    serde_json::json!({
        "clip_count": envelope.data_field("clip_count"),
        "highlight_score": envelope.data_field("highlight_score"),
    })
}

fn compliance_summary(envelope: &Envelope) -> serde_json::Value {
    serde_json::json!({
        "violations": envelope.data_field("violations"),
        "critical_count": envelope.data_field("critical_count"),
        "score": envelope.data_field("score"),
    })
}

fn trending_summary(envelope: &Envelope) -> serde_json::Value {
    serde_json::json!({
        "top_topic": envelope.data_field("top_topic"),
        "velocity_score": envelope.data_field("velocity_score"),
    })
}

fn rights_summary(envelope: &Envelope) -> serde_json::Value {
    serde_json::json!({
        "violations": envelope.data_field("violations"),
        "expiring_soon": envelope.data_field("expiring_soon"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use miq_core::types::{ExecutionMode, Priority, TaskInput};
    use serde_json::json;

    fn task(key: AgentKey) -> Task {
        Task::new(key, TaskInput::Text("x".into()), Priority::Normal)
    }

    #[test]
    fn caption_completion_emits_caption_complete() {
        let envelope = Envelope::success("caption", ExecutionMode::Demo, json!({"language": "en", "qa_score": 0.9}));
        let events = derive_events(&task(AgentKey::Caption), &envelope);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::CaptionComplete);
    }

    #[test]
    fn compliance_critical_emits_compliance_alert() {
        let envelope =
            Envelope::success("compliance", ExecutionMode::Demo, json!({"critical_count": 1, "score": 0.4}));
        let events = derive_events(&task(AgentKey::Compliance), &envelope);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::ComplianceAlert);
    }

    #[test]
    fn compliance_without_critical_emits_nothing() {
        let envelope =
            Envelope::success("compliance", ExecutionMode::Demo, json!({"critical_count": 0, "score": 1.0}));
        assert!(derive_events(&task(AgentKey::Compliance), &envelope).is_empty());
    }

    #[test]
    fn trending_spike_and_breaking_news_both_emit_from_one_task() {
        let envelope = Envelope::success(
            "trending",
            ExecutionMode::Demo,
            json!({"breaking_news": true, "velocity_score": 95.0, "top_topic": "x"}),
        );
        let events = derive_events(&task(AgentKey::Trending), &envelope);
        assert_eq!(events.len(), 2);
        assert!(events.iter().any(|e| e.kind == EventKind::TrendingSpike));
        assert!(events.iter().any(|e| e.kind == EventKind::BreakingNews));
    }

    #[test]
    fn trending_spike_alone_does_not_emit_breaking_news() {
        let envelope = Envelope::success(
            "trending",
            ExecutionMode::Demo,
            json!({"breaking_news": false, "velocity_score": 95.0, "top_topic": "x"}),
        );
        let events = derive_events(&task(AgentKey::Trending), &envelope);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::TrendingSpike);
    }

    #[test]
    fn rights_violations_emit_violation_detected() {
        let envelope = Envelope::success(
            "rights",
            ExecutionMode::Demo,
            json!({"violations": [{"type": "unauthorized_rebroadcast"}], "expiring_soon": []}),
        );
        let events = derive_events(&task(AgentKey::Rights), &envelope);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::ViolationDetected);
    }

    #[test]
    fn rights_without_violations_or_expiring_emits_nothing() {
        let envelope =
            Envelope::success("rights", ExecutionMode::Demo, json!({"violations": [], "expiring_soon": []}));
        assert!(derive_events(&task(AgentKey::Rights), &envelope).is_empty());
    }

    #[test]
    fn failed_task_emits_nothing() {
        let envelope = Envelope::failure("caption", ExecutionMode::Demo, "boom");
        assert!(derive_events(&task(AgentKey::Caption), &envelope).is_empty());
    }
}
