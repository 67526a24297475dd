use crate::error::MemoryError;
use crate::types::{AgentKey, Envelope, Task};
use chrono::Utc;
use std::path::PathBuf;

const HEADER_MARK: &str = "<!-- miq:header -->";
const ENTRY_MARK: &str = "## Task ";

/// Per-agent append-only markdown journal under `<root>/agents/<key>.md`.
///
/// Each save rewrites the header block (last-updated timestamp, entry count)
/// and appends one entry per completed task. Trimming uses the same
/// two-watermark hysteresis as `_trim_if_needed` in
/// `original_source/memory/agent_memory.py`: the journal is left alone until
/// it exceeds `max_entries`, then cut down to `trim_to` — not re-trimmed to
/// the ceiling on every single append.
pub struct AgentMemoryJournal {
    root: PathBuf,
    agent_key: AgentKey,
    max_entries: usize,
    trim_to: usize,
}

impl AgentMemoryJournal {
    pub fn new(root: impl Into<PathBuf>, agent_key: AgentKey, max_entries: usize, trim_to: usize) -> Self {
        Self {
            root: root.into(),
            agent_key,
            max_entries,
            trim_to,
        }
    }

    pub fn path(&self) -> PathBuf {
        self.root.join("agents").join(format!("{}.md", self.agent_key.as_str()))
    }

    pub fn load(&self) -> Result<String, MemoryError> {
        let path = self.path();
        if !path.exists() {
            return Ok(String::new());
        }
        std::fs::read_to_string(&path).map_err(|e| MemoryError::ReadFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Append a completed task's summary, rewriting the header and trimming
    /// the body to the last `max_entries` entries.
    pub fn save_task(&self, task: &Task, envelope: &Envelope) -> Result<(), MemoryError> {
        let path = self.path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| MemoryError::WriteFailed {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        }

        let existing = self.load()?;
        let mut entries = split_entries(&existing);
        entries.push(render_entry(task, envelope));
        if entries.len() > self.max_entries {
            let drop = entries.len() - self.trim_to;
            entries.drain(0..drop);
        }

        let body = render_document(&self.agent_key, entries.len(), &entries);
        std::fs::write(&path, body).map_err(|e| MemoryError::WriteFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// The most recent `limit` entries, newest last — fed back to an agent
    /// as context for its next run, mirroring `_recent_context` in
    /// `original_source/memory/agent_memory.py`.
    pub fn recent_entries(&self, limit: usize) -> Result<Vec<String>, MemoryError> {
        let existing = self.load()?;
        let mut entries = split_entries(&existing);
        if entries.len() > limit {
            let drop = entries.len() - limit;
            entries.drain(0..drop);
        }
        Ok(entries)
    }

    /// Append a `triggered_by:` cross-reference line to the most recently
    /// written entry, used when a derived task later completes and the
    /// parent entry should note what it spawned.
    pub fn update_last_entry_triggered(&self, note: &str) -> Result<(), MemoryError> {
        let existing = self.load()?;
        let mut entries = split_entries(&existing);
        let Some(last) = entries.last_mut() else {
            return Ok(());
        };
        last.push_str(&format!("\n_derived: {note}_\n"));
        let body = render_document(&self.agent_key, entries.len(), &entries);
        std::fs::write(self.path(), body).map_err(|e| MemoryError::WriteFailed {
            path: self.path().display().to_string(),
            message: e.to_string(),
        })
    }
}

fn render_document(agent_key: &AgentKey, entry_count: usize, entries: &[String]) -> String {
    let mut out = String::new();
    out.push_str(HEADER_MARK);
    out.push('\n');
    out.push_str(&format!("# Agent Memory: {}\n\n", agent_key.as_str()));
    out.push_str(&format!("Last updated: {}\n", Utc::now().to_rfc3339()));
    out.push_str(&format!("Total entries: {entry_count}\n\n---\n\n"));
    for entry in entries {
        out.push_str(entry);
        out.push_str("\n\n");
    }
    out
}

fn render_entry(task: &Task, envelope: &Envelope) -> String {
    let mut out = String::new();
    out.push_str(&format!("{ENTRY_MARK}{} — {}\n\n", task.id, task.created_at.to_rfc3339()));
    out.push_str(&format!("**Status:** {:?}\n", task.status));
    out.push_str(&format!("**Mode:** {}\n\n", envelope.mode));
    out.push_str("**Summary:**\n");
    for key in output_summary_keys(&task.agent_key) {
        if let Some(value) = envelope.data_field(key) {
            out.push_str(&format!("- {key}: {value}\n"));
        }
    }
    if let Some(err) = &envelope.error {
        out.push_str(&format!("- error: {err}\n"));
    }
    out
}

fn split_entries(document: &str) -> Vec<String> {
    let body = match document.find("---\n\n") {
        Some(idx) => &document[idx + 5..],
        None => document,
    };
    if body.trim().is_empty() {
        return Vec::new();
    }
    let mut entries = Vec::new();
    let mut current = String::new();
    for line in body.lines() {
        if line.starts_with(ENTRY_MARK) && !current.is_empty() {
            entries.push(current.trim_end().to_string());
            current = String::new();
        }
        current.push_str(line);
        current.push('\n');
    }
    if !current.trim().is_empty() {
        entries.push(current.trim_end().to_string());
    }
    entries
}

/// The high-value output keys summarized in each agent's journal row.
///
/// Grounded on `_OUTPUT_KEY_MAP` in `original_source/memory/agent_memory.py`.
pub fn output_summary_keys(agent_key: &AgentKey) -> &'static [&'static str] {
    match agent_key {
        AgentKey::Caption => &["language", "duration_seconds", "word_count", "qa_score"],
        AgentKey::Clip => &["clip_count", "highlight_score", "duration_seconds"],
        AgentKey::Archive => &["archived_assets", "storage_tier", "retention_days"],
        AgentKey::Compliance => &["issues", "violations", "score", "critical_count"],
        AgentKey::Social => &["platforms", "posts_scheduled", "engagement_forecast"],
        AgentKey::Localization => &["target_languages", "translated_count", "glossary_hits"],
        AgentKey::Rights => &["licenses_checked", "expiring_soon", "blocked_territories"],
        AgentKey::Trending => &["trends", "breaking_news", "velocity_score", "top_topic"],
        AgentKey::Deepfake => &["confidence", "flagged", "analysis_method"],
        AgentKey::FactCheck => &["claims_checked", "disputed_count", "sources"],
        AgentKey::Audience => &["segment", "sentiment_score", "reach_estimate"],
        AgentKey::ProductionDirector => &["decision", "affected_agents", "urgency"],
        AgentKey::BrandSafety => &["risk_level", "flagged_terms", "advertiser_safe"],
        AgentKey::Carbon => &["estimated_kwh", "co2_kg", "offset_recommendation"],
        AgentKey::IngestTranscode => &["profiles", "duration_seconds", "bitrate_kbps"],
        AgentKey::SignalQuality => &["snr_db", "dropped_frames", "alert_level"],
        AgentKey::Playout => &["channel", "next_event", "schedule_drift_seconds"],
        AgentKey::Ott => &["platform", "stream_health", "concurrent_viewers"],
        AgentKey::Newsroom => &["story_count", "assignment_desk", "priority_story"],
        AgentKey::Other(_) => &["summary"],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ExecutionMode, Priority, TaskInput};
    use serde_json::json;

    fn sample_task() -> Task {
        Task::new(AgentKey::Compliance, TaskInput::Text("clip.mp4".into()), Priority::Normal)
    }

    #[test]
    fn save_and_load_round_trips_a_single_entry() {
        let dir = tempfile::tempdir().expect("tempdir");
        let journal = AgentMemoryJournal::new(dir.path(), AgentKey::Compliance, 50, 40);
        let task = sample_task();
        let envelope = Envelope::success(
            "compliance",
            ExecutionMode::Demo,
            json!({"issues": 2, "violations": 0, "score": 0.9, "critical_count": 0}),
        );
        journal.save_task(&task, &envelope).expect("save must succeed");

        let loaded = journal.load().expect("load must succeed");
        assert!(loaded.contains("Agent Memory: compliance"));
        assert!(loaded.contains(&task.id));
        assert!(loaded.contains("- score: 0.9"));
        assert!(loaded.contains("Total entries: 1"));
    }

    #[test]
    fn stays_untrimmed_below_the_max_entries_watermark() {
        let dir = tempfile::tempdir().expect("tempdir");
        let journal = AgentMemoryJournal::new(dir.path(), AgentKey::Compliance, 3, 2);
        for _ in 0..3 {
            let task = sample_task();
            let envelope = Envelope::success("compliance", ExecutionMode::Demo, json!({"score": 1}));
            journal.save_task(&task, &envelope).expect("save must succeed");
        }
        let loaded = journal.load().expect("load must succeed");
        assert!(loaded.contains("Total entries: 3"));
    }

    #[test]
    fn trims_down_to_trim_to_only_once_max_entries_is_exceeded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let journal = AgentMemoryJournal::new(dir.path(), AgentKey::Compliance, 3, 2);
        for _ in 0..4 {
            let task = sample_task();
            let envelope = Envelope::success("compliance", ExecutionMode::Demo, json!({"score": 1}));
            journal.save_task(&task, &envelope).expect("save must succeed");
        }
        let loaded = journal.load().expect("load must succeed");
        assert!(loaded.contains("Total entries: 2"));
        assert_eq!(loaded.matches(ENTRY_MARK).count(), 2);
    }

    #[test]
    fn recent_entries_returns_only_the_newest_n() {
        let dir = tempfile::tempdir().expect("tempdir");
        let journal = AgentMemoryJournal::new(dir.path(), AgentKey::Compliance, 50, 40);
        for _ in 0..4 {
            let task = sample_task();
            let envelope = Envelope::success("compliance", ExecutionMode::Demo, json!({"score": 1}));
            journal.save_task(&task, &envelope).expect("save must succeed");
        }
        let recent = journal.recent_entries(2).expect("recent_entries must succeed");
        assert_eq!(recent.len(), 2);
    }
}
