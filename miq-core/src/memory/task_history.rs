use crate::error::MemoryError;
use crate::types::{Envelope, Task};
use std::path::PathBuf;

const HEADER: &str = "| task_id | agent | priority | status | mode | triggered_by | created_at |\n\
                      |---|---|---|---|---|---|---|\n";

/// Global compact audit table at `<root>/agents/task_history.md`, one row
/// per completed task, matching `_TASK_HISTORY_HEADER` in
/// `original_source/memory/agent_memory.py`.
pub struct TaskHistoryLog {
    path: PathBuf,
}

impl TaskHistoryLog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            path: root.into().join("agents").join("task_history.md"),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn append(&self, task: &Task, envelope: &Envelope) -> Result<(), MemoryError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| MemoryError::WriteFailed {
                path: self.path.display().to_string(),
                message: e.to_string(),
            })?;
        }

        let needs_header = !self.path.exists();
        let row = format!(
            "| {} | {} | {:?} | {:?} | {} | {} | {} |\n",
            task.id,
            task.agent_key,
            task.priority,
            task.status,
            envelope.mode,
            task.triggered_by.as_ref().map(|t| t.to_string()).unwrap_or_else(|| "-".to_string()),
            task.created_at.to_rfc3339(),
        );

        use std::io::Write;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| MemoryError::WriteFailed {
                path: self.path.display().to_string(),
                message: e.to_string(),
            })?;
        if needs_header {
            file.write_all(HEADER.as_bytes()).map_err(|e| MemoryError::WriteFailed {
                path: self.path.display().to_string(),
                message: e.to_string(),
            })?;
        }
        file.write_all(row.as_bytes()).map_err(|e| MemoryError::WriteFailed {
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
    use crate::types::{AgentKey, ExecutionMode, Priority, TaskInput};
    use serde_json::json;

    #[test]
    fn append_writes_header_once_then_rows() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = TaskHistoryLog::new(dir.path());
        let task = Task::new(AgentKey::Caption, TaskInput::Text("x".into()), Priority::Normal);
        let envelope = Envelope::success("caption", ExecutionMode::Demo, json!({}));
        log.append(&task, &envelope).expect("append");
        log.append(&task, &envelope).expect("append");

        let content = log.load().expect("load");
        assert_eq!(content.matches("task_id").count(), 1);
        assert_eq!(content.matches(&task.id).count(), 2);
    }
}
