//! Priority task queue, recurring-job scheduler, typed event bus, and the
//! orchestrator core that ties them together.

pub mod event_bus;
pub mod multi;
pub mod queue;
pub mod scheduler;

pub use event_bus::EventBus;
pub use multi::{Orchestrator, OrchestratorHandle, OrchestratorStats};
pub use queue::PriorityTaskQueue;
pub use scheduler::Scheduler;
