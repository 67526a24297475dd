//! Error types for the MIQ orchestration core.
//!
//! Uses `thiserror` for structured error variants covering the orchestrator,
//! connector, gateway, memory, and configuration domains, aggregated into a
//! single top-level error for library callers.

/// Top-level error type for the MIQ core library.
#[derive(Debug, thiserror::Error)]
pub enum MiqError {
    #[error("orchestrator error: {0}")]
    Orchestrator(#[from] OrchestratorError),

    #[error("connector error: {0}")]
    Connector(#[from] ConnectorError),

    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("memory error: {0}")]
    Memory(#[from] MemoryError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised by the task queue, scheduler, and event bus.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("no agent registered for key: {key}")]
    UnknownAgent { key: String },

    #[error("task not found: {id}")]
    TaskNotFound { id: String },

    #[error("task {id} is not pending and cannot be cancelled")]
    NotCancellable { id: String },

    #[error("schedule not found: {id}")]
    ScheduleNotFound { id: String },

    #[error("workflow not found: {id}")]
    WorkflowNotFound { id: String },

    #[error("workflow {id} has an empty agent sequence")]
    EmptyWorkflow { id: String },

    #[error("event chain exceeded the maximum hop count ({max}) for triggered_by chain starting at {root}")]
    HopLimitExceeded { root: String, max: u8 },
}

/// Errors raised by the connector registry and individual connectors.
#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    #[error("connector not found: {id}")]
    NotFound { id: String },

    #[error("tool not found: {name}")]
    ToolNotFound { name: String },

    #[error("connector {id} authentication failed: {message}")]
    AuthFailed { id: String, message: String },

    #[error("connector {id} is not connected")]
    NotConnected { id: String },

    #[error("connector {id} operation failed: {message}")]
    OperationFailed { id: String, message: String },
}

/// Errors raised by the gateway router, conversation manager, and webhook handler.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("signature verification failed: {message}")]
    SignatureInvalid { message: String },

    #[error("request replay window exceeded: {age_secs}s old (max {max_secs}s)")]
    ReplayWindowExceeded { age_secs: i64, max_secs: i64 },

    #[error("malformed payload: {message}")]
    MalformedPayload { message: String },

    #[error("unsupported platform: {platform}")]
    UnsupportedPlatform { platform: String },
}

/// Errors raised by the memory journal.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    #[error("failed to read journal file {path}: {message}")]
    ReadFailed { path: String, message: String },

    #[error("failed to write journal file {path}: {message}")]
    WriteFailed { path: String, message: String },

    #[error("journal header for {agent} is malformed")]
    MalformedHeader { agent: String },
}

/// Errors raised by configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {message}")]
    Invalid { message: String },

    #[error("missing required field: {field}")]
    MissingField { field: String },
}
