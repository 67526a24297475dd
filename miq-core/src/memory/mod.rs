//! Persisted memory: per-agent append-only markdown journals, a shared
//! inter-agent event log, and a global task-history audit table.
//!
//! Grounded on `original_source/memory/agent_memory.py`'s `AgentMemoryLayer`.

mod journal;
mod event_log;
mod task_history;

pub use event_log::InterAgentEventLog;
pub use journal::{output_summary_keys, AgentMemoryJournal};
pub use task_history::TaskHistoryLog;
