//! Core types, configuration, error model, the dual-mode agent contract, and
//! the persisted memory journal shared by the rest of the MIQ workspace.

pub mod agent;
pub mod config;
pub mod error;
pub mod memory;
pub mod types;

pub use agent::{Agent, AgentRuntime};
pub use config::Settings;
pub use error::{ConfigError, ConnectorError, GatewayError, MemoryError, MiqError, OrchestratorError};
pub use types::{
    AgentKey, ConnectorCategory, Envelope, Event, EventKind, ExecutionMode, Priority, RoutedIntent,
    ScheduledJob, Task, TaskInput, TaskStatus, ToolDefinition, TriggeredBy,
};
