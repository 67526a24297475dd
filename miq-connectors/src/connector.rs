//! The `Connector` trait: a uniform surface for external systems (storage,
//! chat channels, MAM/CDN/newsroom/broadcast-control integrations) that the
//! registry aggregates into one callable-tool namespace.
//!
//! Grounded on `BaseConnector`/`ConnectorCategory` in
//! `original_source/connectors/base_connector.py` and the `Tool` trait shape
//! in `rustant-tools/src/registry.rs`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use miq_core::error::ConnectorError;
use miq_core::types::{ConnectorCategory, ToolDefinition};
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct HealthCheckResult {
    pub healthy: bool,
    pub message: String,
    pub checked_at: DateTime<Utc>,
}

impl HealthCheckResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self { healthy: true, message: message.into(), checked_at: Utc::now() }
    }

    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self { healthy: false, message: message.into(), checked_at: Utc::now() }
    }
}

#[async_trait]
pub trait Connector: Send + Sync {
    fn id(&self) -> &str;

    fn category(&self) -> ConnectorCategory;

    fn is_connected(&self) -> bool;

    async fn connect(&self) -> Result<(), ConnectorError>;

    async fn disconnect(&self) -> Result<(), ConnectorError>;

    async fn health_check(&self) -> HealthCheckResult;

    /// Tools this connector exposes, namespaced by the registry under
    /// `<connector_id>.<tool_name>`.
    fn tool_definitions(&self) -> Vec<ToolDefinition>;

    async fn call_tool(&self, tool_name: &str, params: Value) -> Result<Value, ConnectorError>;
}
