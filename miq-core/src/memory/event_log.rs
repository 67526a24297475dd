use crate::error::MemoryError;
use crate::types::Event;
use chrono::Utc;
use std::path::PathBuf;

/// Shared append-only markdown log of inter-agent events, written to
/// `<root>/agents/inter_agent_comms.md`.
///
/// Grounded on `AgentMemoryLayer.log_inter_agent_event` in
/// `original_source/memory/agent_memory.py`.
pub struct InterAgentEventLog {
    path: PathBuf,
}

impl InterAgentEventLog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            path: root.into().join("agents").join("inter_agent_comms.md"),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn append(&self, event: &Event, derived_task_ids: &[String]) -> Result<(), MemoryError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| MemoryError::WriteFailed {
                path: self.path.display().to_string(),
                message: e.to_string(),
            })?;
        }

        let mut line = format!(
            "- [{}] **{}** from `{}` -> {} data={}\n",
            Utc::now().to_rfc3339(),
            event.kind,
            event.source_agent,
            if derived_task_ids.is_empty() {
                "no subscribers".to_string()
            } else {
                format!("tasks {}", derived_task_ids.join(", "))
            },
            event.data,
        );
        if !self.path.exists() {
            line = format!("# Inter-Agent Event Log\n\n{line}");
        }

        use std::io::Write;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| MemoryError::WriteFailed {
                path: self.path.display().to_string(),
                message: e.to_string(),
            })?;
        file.write_all(line.as_bytes()).map_err(|e| MemoryError::WriteFailed {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })
    }

    pub fn load(&self) -> Result<String, MemoryError> {
        if !self.path.exists() {
            return Ok(String::new());
        }
        std::fs::read_to_string(&self.path).map_err(|e| MemoryError::ReadFailed {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EventKind;
    use serde_json::json;

    #[test]
    fn append_creates_header_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = InterAgentEventLog::new(dir.path());
        let event = Event::new(EventKind::BreakingNews, "trending", json!({"headline": "x"}));
        log.append(&event, &["t1".to_string(), "t2".to_string()]).expect("append");
        log.append(&event, &[]).expect("append");

        let content = log.load().expect("load");
        assert_eq!(content.matches("# Inter-Agent Event Log").count(), 1);
        assert!(content.contains("tasks t1, t2"));
        assert!(content.contains("no subscribers"));
    }
}
