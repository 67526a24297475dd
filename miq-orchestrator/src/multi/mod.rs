mod completion;
mod orchestrator;

pub use completion::derive_events;
pub use orchestrator::{Orchestrator, OrchestratorHandle, OrchestratorStats};
